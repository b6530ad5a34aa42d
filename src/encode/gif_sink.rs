use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::ensure_parent_dir,
        error::{MediaError, MediaResult},
    },
    quantize::IndexedFrame,
};

/// Writes an animated GIF.
///
/// Frames go to `<out>.part` and the file is renamed into place by [`FrameSink::end`], so a run
/// that fails half-way never leaves a truncated GIF at the output path.
pub struct GifSink {
    out_path: PathBuf,
    part_path: PathBuf,
    cfg: Option<SinkConfig>,
    encoder: Option<gif::Encoder<BufWriter<File>>>,
    frames: usize,
}

impl GifSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        let out_path = out_path.into();
        let mut part = out_path.clone().into_os_string();
        part.push(".part");
        Self {
            out_path,
            part_path: PathBuf::from(part),
            cfg: None,
            encoder: None,
            frames: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()> {
        if self.cfg.is_some() {
            return Err(MediaError::validation("gif sink already started"));
        }
        let (w, h) = gif_dims(cfg.width, cfg.height)?;

        ensure_parent_dir(&self.out_path)?;
        let file = File::create(&self.part_path)
            .with_context(|| format!("create '{}'", self.part_path.display()))?;

        let mut encoder = gif::Encoder::new(BufWriter::new(file), w, h, &[])?;
        if cfg.looping {
            encoder.set_repeat(gif::Repeat::Infinite)?;
        }

        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &IndexedFrame, delay_ms: u32) -> MediaResult<()> {
        let (Some(cfg), Some(encoder)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(MediaError::validation(
                "gif sink is not started (or already finished)",
            ));
        };

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MediaError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.indices.len() != (frame.width * frame.height) as usize {
            return Err(MediaError::validation(
                "frame.indices size mismatch with width*height",
            ));
        }
        if frame.palette.is_empty() || frame.palette_len() > 256 {
            return Err(MediaError::validation(format!(
                "gif palette must have 1..=256 colors, got {}",
                frame.palette_len()
            )));
        }

        let (w, h) = gif_dims(frame.width, frame.height)?;
        let out = gif::Frame {
            width: w,
            height: h,
            delay: centiseconds(delay_ms),
            dispose: if frame.transparent.is_some() {
                gif::DisposalMethod::Background
            } else {
                gif::DisposalMethod::Keep
            },
            transparent: frame.transparent,
            palette: Some(frame.palette.clone()),
            buffer: Cow::Borrowed(frame.indices.as_slice()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&out)?;
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> MediaResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| MediaError::validation("gif sink is not started"))?;
        if self.frames == 0 {
            drop(encoder);
            let _ = std::fs::remove_file(&self.part_path);
            return Err(MediaError::validation("refusing to write a gif with no frames"));
        }

        let finished = finish_part(encoder, &self.part_path, &self.out_path);
        if finished.is_err() {
            let _ = std::fs::remove_file(&self.part_path);
        }
        finished
    }
}

/// Write the trailer, flush, and move the finished part file over `out_path`.
fn finish_part(
    encoder: gif::Encoder<BufWriter<File>>,
    part_path: &Path,
    out_path: &Path,
) -> MediaResult<()> {
    let mut writer = encoder
        .into_inner()
        .with_context(|| format!("finish '{}'", part_path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush '{}'", part_path.display()))?;
    drop(writer);

    std::fs::rename(part_path, out_path).with_context(|| {
        format!(
            "move '{}' into place at '{}'",
            part_path.display(),
            out_path.display()
        )
    })?;
    Ok(())
}

impl Drop for GifSink {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            drop(encoder);
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}

/// Write a single, non-looping GIF frame.
pub fn write_single_gif(path: &Path, frame: &IndexedFrame) -> MediaResult<()> {
    let mut sink = GifSink::new(path);
    sink.begin(SinkConfig {
        width: frame.width,
        height: frame.height,
        looping: false,
    })?;
    sink.push_frame(frame, 0)?;
    sink.end()
}

/// GIF delays are stored in hundredths of a second.
pub fn centiseconds(delay_ms: u32) -> u16 {
    ((delay_ms.saturating_add(5)) / 10).min(u32::from(u16::MAX)) as u16
}

fn gif_dims(width: u32, height: u32) -> MediaResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(MediaError::validation("gif width/height must be non-zero"));
    }
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(MediaError::validation(format!(
            "gif dimensions {width}x{height} exceed 65535"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> IndexedFrame {
        IndexedFrame {
            width: w,
            height: h,
            palette: rgb.to_vec(),
            indices: vec![0; (w * h) as usize],
            transparent: None,
        }
    }

    #[test]
    fn centiseconds_round_to_nearest() {
        assert_eq!(centiseconds(0), 0);
        assert_eq!(centiseconds(80), 8);
        assert_eq!(centiseconds(135), 14);
        assert_eq!(centiseconds(134), 13);
        assert_eq!(centiseconds(u32::MAX), u16::MAX);
    }

    #[test]
    fn writes_frames_and_renames_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.gif");

        let mut sink = GifSink::new(&out);
        sink.begin(SinkConfig {
            width: 4,
            height: 3,
            looping: true,
        })
        .unwrap();
        sink.push_frame(&solid(4, 3, [255, 0, 0]), 100).unwrap();
        sink.push_frame(&solid(4, 3, [0, 255, 0]), 100).unwrap();
        assert!(!out.exists());
        sink.end().unwrap();

        assert!(out.exists());
        assert!(!dir.path().join("nested").join("out.gif.part").exists());

        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::Indexed);
        let mut dec = opts.read_info(File::open(&out).unwrap()).unwrap();
        let mut n = 0;
        while let Some(frame) = dec.read_next_frame().unwrap() {
            assert_eq!(frame.delay, 10);
            n += 1;
        }
        assert_eq!(n, 2);
    }

    #[test]
    fn size_mismatch_is_rejected_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.gif");
        {
            let mut sink = GifSink::new(&out);
            sink.begin(SinkConfig {
                width: 4,
                height: 4,
                looping: true,
            })
            .unwrap();
            sink.push_frame(&solid(4, 4, [0, 0, 0]), 50).unwrap();
            assert!(sink.push_frame(&solid(2, 2, [0, 0, 0]), 50).is_err());
        }
        assert!(!out.exists());
        assert!(!dir.path().join("out.gif.part").exists());
    }

    #[test]
    fn end_without_frames_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.gif");
        let mut sink = GifSink::new(&out);
        sink.begin(SinkConfig {
            width: 1,
            height: 1,
            looping: false,
        })
        .unwrap();
        assert!(sink.end().is_err());
        assert!(!out.exists());
    }

    #[test]
    fn failed_rename_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("taken.gif");
        std::fs::create_dir_all(out.join("inner")).unwrap();

        let mut sink = GifSink::new(&out);
        sink.begin(SinkConfig {
            width: 2,
            height: 2,
            looping: true,
        })
        .unwrap();
        sink.push_frame(&solid(2, 2, [1, 2, 3]), 10).unwrap();
        assert!(sink.end().is_err());

        assert!(!dir.path().join("taken.gif.part").exists());
        assert!(out.is_dir());
    }

    #[test]
    fn push_before_begin_fails() {
        let mut sink = GifSink::new("unused.gif");
        assert!(sink.push_frame(&solid(1, 1, [0, 0, 0]), 10).is_err());
    }
}
