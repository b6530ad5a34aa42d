use std::fmt;

use crate::transcripts::model::{TrackListing, TranscriptTrack};

/// Preference order among the tracks a video offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Manual,
    Generated,
    Translated,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Manual => "manually created",
            Tier::Generated => "auto-generated",
            Tier::Translated => "translated",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<'a> {
    pub track: &'a TranscriptTrack,
    pub tier: Tier,
    /// Set when the track must be machine-translated into this language.
    pub translate_to: Option<String>,
}

/// Pick the best track for `lang`: authored, then generated, then anything translatable.
pub fn select_track<'a>(listing: &'a TrackListing, lang: &str) -> Option<Selection<'a>> {
    let in_lang = |generated: bool| {
        listing
            .tracks
            .iter()
            .find(|t| t.generated == generated && t.language_code == lang)
    };

    if let Some(track) = in_lang(false) {
        return Some(Selection {
            track,
            tier: Tier::Manual,
            translate_to: None,
        });
    }
    if let Some(track) = in_lang(true) {
        return Some(Selection {
            track,
            tier: Tier::Generated,
            translate_to: None,
        });
    }

    if !listing.translation_languages.iter().any(|l| l == lang) {
        return None;
    }
    let manual_first = listing
        .tracks
        .iter()
        .filter(|t| !t.generated)
        .chain(listing.tracks.iter().filter(|t| t.generated));
    for track in manual_first {
        if track.translatable {
            return Some(Selection {
                track,
                tier: Tier::Translated,
                translate_to: Some(lang.to_string()),
            });
        }
    }
    None
}
