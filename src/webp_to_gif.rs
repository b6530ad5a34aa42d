//! Re-encode an animated (or still) image as a looping GIF, keeping per-frame timing.

use std::path::{Path, PathBuf};

use crate::{
    assets::decode::{AnimFrame, decode_animation},
    encode::{
        gif_sink::GifSink,
        sink::{FrameSink, SinkConfig},
    },
    foundation::{
        core::file_size_kb,
        error::{MediaError, MediaResult},
    },
    quantize::{QuantizeOpts, quantize},
};

/// Delay for frames that declare none.
pub const DEFAULT_DELAY_MS: u32 = 80;

#[derive(Clone, Debug)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub frames: usize,
    pub delays_ms: Vec<u32>,
    pub size_kb: f64,
}

#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn convert_animation(input: &Path, output: &Path) -> MediaResult<ConvertReport> {
    tracing::info!("loading source");
    let frames = decode_animation(input)?;
    let Some(first) = frames.first() else {
        return Err(MediaError::image(format!(
            "'{}' decoded to zero frames",
            input.display()
        )));
    };

    tracing::info!(frames = frames.len(), "saving as gif");
    let (width, height) = first.image.dimensions();
    let mut sink = GifSink::new(output);
    let delays_ms = encode_frames(&frames, width, height, &mut sink)?;

    Ok(ConvertReport {
        output: output.to_path_buf(),
        frames: frames.len(),
        delays_ms,
        size_kb: file_size_kb(output)?,
    })
}

/// Quantize and push every frame to a looping sink. Returns the delay used for each frame.
pub fn encode_frames(
    frames: &[AnimFrame],
    width: u32,
    height: u32,
    sink: &mut dyn FrameSink,
) -> MediaResult<Vec<u32>> {
    sink.begin(SinkConfig {
        width,
        height,
        looping: true,
    })?;

    let mut delays_ms = Vec::with_capacity(frames.len());
    for frame in frames {
        let delay = frame.delay_ms.unwrap_or(DEFAULT_DELAY_MS);
        let indexed = quantize(&frame.image, QuantizeOpts::default())?;
        sink.push_frame(&indexed, delay)?;
        delays_ms.push(delay);
    }
    sink.end()?;
    Ok(delays_ms)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::encode::sink::InMemorySink;

    fn frame(rgba: [u8; 4], delay_ms: Option<u32>) -> AnimFrame {
        AnimFrame {
            image: RgbaImage::from_pixel(3, 2, Rgba(rgba)),
            delay_ms,
        }
    }

    #[test]
    fn missing_delays_fall_back_to_default() {
        let frames = vec![
            frame([255, 0, 0, 255], Some(40)),
            frame([0, 255, 0, 255], None),
            frame([0, 0, 255, 255], Some(250)),
        ];
        let mut sink = InMemorySink::new();
        let delays = encode_frames(&frames, 3, 2, &mut sink).unwrap();

        assert_eq!(delays, vec![40, DEFAULT_DELAY_MS, 250]);
        assert!(sink.is_ended());
        assert!(sink.config().unwrap().looping);
        let pushed: Vec<_> = sink.frames().iter().map(|(_, d)| *d).collect();
        assert_eq!(pushed, delays);
        assert_eq!(sink.frames()[1].0.color_at(0, 0), Some([0, 255, 0]));
    }

    #[test]
    fn transparency_survives_as_transparent_index() {
        let frames = vec![frame([9, 9, 9, 0], None)];
        let mut sink = InMemorySink::new();
        encode_frames(&frames, 3, 2, &mut sink).unwrap();

        let (indexed, _) = &sink.frames()[0];
        let t = indexed.transparent.unwrap();
        assert!(indexed.indices.iter().all(|&i| i == t));
    }
}
