use serde::{Deserialize, Serialize};

/// A video to fetch, identified by its platform id, saved under `title`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn link(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

/// One caption track offered for a video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language_name: String,
    /// Produced by speech recognition rather than authored.
    pub generated: bool,
    pub translatable: bool,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackListing {
    pub tracks: Vec<TranscriptTrack>,
    /// Language codes the service can machine-translate into.
    pub translation_languages: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Seconds from the start of the video.
    pub start: f64,
    pub duration: f64,
    pub text: String,
}
