use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{MediaError, MediaResult},
    transcripts::{
        config::TranscriptConfig,
        model::Video,
        render::{combined_header, render_plain, render_timestamped},
        select::select_track,
        source::TranscriptSource,
    },
};

pub const COMBINED_FILE_NAME: &str = "ALL_TRANSCRIPTS_COMBINED.txt";

#[derive(Clone, Debug, Default)]
pub struct FetchReport {
    pub fetched: Vec<Video>,
    pub skipped: Vec<(Video, String)>,
    pub combined_path: Option<PathBuf>,
}

impl FetchReport {
    /// True when no video was skipped. The CLI exits 1 otherwise.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.fetched.len() + self.skipped.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} transcripts fetched.",
            self.fetched.len(),
            self.total()
        )
    }
}

/// Plain and timestamped renderings of one video's transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub plain: String,
    pub timestamped: String,
}

/// Fetch every configured video. A video that cannot be fetched is skipped, not fatal.
#[tracing::instrument(skip_all, fields(videos = cfg.videos.len(), out_dir = %cfg.output_dir.display()))]
pub fn fetch_all(source: &dyn TranscriptSource, cfg: &TranscriptConfig) -> MediaResult<FetchReport> {
    cfg.validate()?;

    let mut report = FetchReport::default();
    let mut combined = Vec::new();

    for video in &cfg.videos {
        tracing::info!(title = %video.title, link = %video.link(), "fetching transcript");
        match fetch_one(source, video, &cfg.language) {
            Ok(rendered) => {
                let (plain_path, ts_path) = save_transcript(&cfg.output_dir, video, &rendered)?;
                tracing::info!(path = %plain_path.display(), "saved");
                tracing::info!(path = %ts_path.display(), "saved");
                combined.push(format!("{}{}", combined_header(video), rendered.plain));
                report.fetched.push(video.clone());
            }
            Err(e) => {
                tracing::warn!(title = %video.title, error = %e, "no transcript available, skipping");
                report.skipped.push((video.clone(), e.to_string()));
            }
        }
    }

    if combined.is_empty() {
        tracing::warn!("no transcripts were fetched");
        tracing::warn!("hint: these videos may have transcripts disabled by the creator");
    } else {
        let path = cfg.output_dir.join(COMBINED_FILE_NAME);
        std::fs::write(&path, combined.join("\n"))
            .with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "combined transcript saved");
        report.combined_path = Some(path);
    }

    tracing::info!("{}", report.summary());
    Ok(report)
}

pub fn fetch_one(
    source: &dyn TranscriptSource,
    video: &Video,
    lang: &str,
) -> MediaResult<Rendered> {
    let listing = source.list(&video.id)?;
    let selection = select_track(&listing, lang).ok_or_else(|| {
        MediaError::transcript(format!("no usable transcript among {} tracks", listing.tracks.len()))
    })?;

    match &selection.translate_to {
        Some(to) => tracing::info!(
            from = %selection.track.language_code,
            to = %to,
            "found transcript, translating"
        ),
        None => tracing::info!(tier = %selection.tier, "transcript found"),
    }

    let segments = source.fetch(selection.track, selection.translate_to.as_deref())?;
    let plain = render_plain(&segments);
    if plain.is_empty() {
        return Err(MediaError::transcript("transcript is empty"));
    }

    Ok(Rendered {
        plain,
        timestamped: render_timestamped(&segments),
    })
}

fn save_transcript(
    out_dir: &Path,
    video: &Video,
    rendered: &Rendered,
) -> MediaResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let stem = file_stem_for(&video.title);
    let plain_path = out_dir.join(format!("{stem}_plain.txt"));
    let ts_path = out_dir.join(format!("{stem}_timestamped.txt"));

    std::fs::write(&plain_path, &rendered.plain)
        .with_context(|| format!("write '{}'", plain_path.display()))?;
    std::fs::write(&ts_path, &rendered.timestamped)
        .with_context(|| format!("write '{}'", ts_path.display()))?;

    Ok((plain_path, ts_path))
}

/// Make a title safe to use as a file name on any platform.
pub fn file_stem_for(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "untitled".to_string()
    } else {
        cleaned
    }
}
