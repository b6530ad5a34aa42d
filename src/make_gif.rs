//! Assemble a captured `frame_NNN.png` sequence into a looping GIF.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::decode::decode_rgba,
    composite::{downscale_half, flatten_onto},
    encode::{
        gif_sink::GifSink,
        sink::{FrameSink, SinkConfig},
    },
    foundation::{
        core::{BgColor, file_size_kb, has_extension, list_files},
        error::{MediaError, MediaResult},
    },
    quantize::{QuantizeOpts, quantize},
};

/// Per-frame display time when none is given.
pub const DEFAULT_FRAME_MS: u32 = 135;

#[derive(Clone, Debug)]
pub struct MakeGifOpts {
    pub frames_dir: PathBuf,
    pub output: PathBuf,
    pub duration_ms: u32,
    pub bg: BgColor,
    /// Leave the source frames (and their directory) on disk.
    pub keep_frames: bool,
}

impl MakeGifOpts {
    pub fn new(frames_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            output: output.into(),
            duration_ms: DEFAULT_FRAME_MS,
            bg: BgColor::WHITE,
            keep_frames: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MakeGifReport {
    pub output: PathBuf,
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub size_kb: f64,
    pub frames_removed: bool,
}

pub fn is_frame_file(name: &str) -> bool {
    name.starts_with("frame_") && has_extension(name, "png")
}

/// Frame files in `dir`, in ascending file-name order.
pub fn find_frames(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    list_files(dir, is_frame_file)
}

#[tracing::instrument(skip(opts), fields(frames_dir = %opts.frames_dir.display(), output = %opts.output.display()))]
pub fn assemble_gif(opts: &MakeGifOpts) -> MediaResult<MakeGifReport> {
    let frame_paths = find_frames(&opts.frames_dir)?;
    if frame_paths.is_empty() {
        return Err(MediaError::validation(format!(
            "no frames in '{}'",
            opts.frames_dir.display()
        )));
    }

    tracing::info!(
        frames = frame_paths.len(),
        duration_ms = opts.duration_ms,
        "building gif"
    );

    let mut sink = GifSink::new(&opts.output);
    let mut dims = None;
    for path in &frame_paths {
        let frame = prepare_frame(path, opts.bg)
            .with_context(|| format!("frame '{}'", path.display()))?;

        if dims.is_none() {
            sink.begin(SinkConfig {
                width: frame.width,
                height: frame.height,
                looping: true,
            })?;
            dims = Some((frame.width, frame.height));
        }
        sink.push_frame(&frame, opts.duration_ms)
            .with_context(|| format!("frame '{}'", path.display()))?;
    }
    sink.end()?;

    let (width, height) = dims.unwrap_or_default();
    let size_kb = file_size_kb(&opts.output)?;
    tracing::info!(size_kb = size_kb.round(), "animated gif written");

    let frames_removed = if opts.keep_frames {
        false
    } else {
        remove_frames(&opts.frames_dir, &frame_paths)?;
        true
    };

    Ok(MakeGifReport {
        output: opts.output.clone(),
        frames: frame_paths.len(),
        width,
        height,
        size_kb,
        frames_removed,
    })
}

fn prepare_frame(path: &Path, bg: BgColor) -> MediaResult<crate::quantize::IndexedFrame> {
    let rgba = decode_rgba(path)?;
    // Flatten before resampling so transparent RGB never bleeds into visible edges.
    let flat = flatten_onto(&rgba, bg);
    let half = downscale_half(&flat)?;
    quantize(&half, QuantizeOpts::default())
}

/// Delete the consumed frames, then try to remove their directory.
fn remove_frames(dir: &Path, frames: &[PathBuf]) -> MediaResult<()> {
    for path in frames {
        std::fs::remove_file(path)
            .with_context(|| format!("remove frame '{}'", path.display()))?;
    }
    if let Err(e) = std::fs::remove_dir(dir) {
        tracing::debug!(dir = %dir.display(), error = %e, "frames directory left in place");
    }
    tracing::info!("temp frames cleaned up");
    Ok(())
}
