use crate::transcripts::model::{Segment, Video};

const RULE_WIDTH: usize = 60;

/// Segment texts, one per line.
pub fn render_plain(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[MM:SS] text` per segment, with minutes and seconds truncated from the start offset.
pub fn render_timestamped(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("{} {}", timestamp_label(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn timestamp_label(start_secs: f64) -> String {
    let start = if start_secs.is_finite() {
        start_secs.max(0.0)
    } else {
        0.0
    };
    let mins = (start / 60.0).floor() as u64;
    let secs = (start % 60.0).floor() as u64;
    format!("[{mins:02}:{secs:02}]")
}

/// Banner placed before each video's text in the combined file.
pub fn combined_header(video: &Video) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "\n\n{rule}\n# {}\n# {}\n{rule}\n\n",
        video.title,
        video.link()
    )
}
