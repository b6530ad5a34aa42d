use crate::{
    foundation::error::MediaResult,
    transcripts::model::{Segment, TrackListing, TranscriptTrack},
};

/// Where transcripts come from.
pub trait TranscriptSource {
    /// Caption tracks available for `video_id`.
    fn list(&self, video_id: &str) -> MediaResult<TrackListing>;

    /// Full segment list for `track`, machine-translated when `translate_to` is set.
    fn fetch(&self, track: &TranscriptTrack, translate_to: Option<&str>)
    -> MediaResult<Vec<Segment>>;
}
