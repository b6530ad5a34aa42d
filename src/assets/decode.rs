use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use image::{
    AnimationDecoder, DynamicImage, ImageFormat, ImageReader, RgbaImage,
    codecs::{gif::GifDecoder, png::PngDecoder, webp::WebPDecoder},
};

use crate::foundation::error::MediaResult;

/// One decoded animation frame, composited to the full canvas.
#[derive(Clone, Debug)]
pub struct AnimFrame {
    pub image: RgbaImage,
    /// Declared display time; `None` when the source gives none (or zero).
    pub delay_ms: Option<u32>,
}

pub fn decode_rgba(path: &Path) -> MediaResult<RgbaImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format of '{}'", path.display()))?
        .decode()?;
    Ok(img.to_rgba8())
}

/// Decode every frame of `path` until the frames run out.
///
/// Animated WebP, GIF and APNG yield their frames in order. Anything else decodes as a single
/// frame with no declared delay.
pub fn decode_animation(path: &Path) -> MediaResult<Vec<AnimFrame>> {
    let format = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format of '{}'", path.display()))?
        .format();

    let open = || -> MediaResult<BufReader<File>> {
        let f = File::open(path).with_context(|| format!("open image '{}'", path.display()))?;
        Ok(BufReader::new(f))
    };

    match format {
        Some(ImageFormat::WebP) => {
            let decoder = WebPDecoder::new(open()?)?;
            if decoder.has_animation() {
                collect_frames(decoder)
            } else {
                single_frame(DynamicImage::from_decoder(decoder)?)
            }
        }
        Some(ImageFormat::Gif) => collect_frames(GifDecoder::new(open()?)?),
        Some(ImageFormat::Png) => {
            let decoder = PngDecoder::new(open()?)?;
            if decoder.is_apng()? {
                collect_frames(decoder.apng()?)
            } else {
                single_frame(DynamicImage::from_decoder(decoder)?)
            }
        }
        _ => single_frame(DynamicImage::ImageRgba8(decode_rgba(path)?)),
    }
}

fn collect_frames<'a>(decoder: impl AnimationDecoder<'a>) -> MediaResult<Vec<AnimFrame>> {
    let frames = decoder.into_frames().collect_frames()?;
    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let ms = if denom == 0 { 0 } else { numer / denom };
            AnimFrame {
                image: frame.into_buffer(),
                delay_ms: (ms > 0).then_some(ms),
            }
        })
        .collect())
}

fn single_frame(img: DynamicImage) -> MediaResult<Vec<AnimFrame>> {
    Ok(vec![AnimFrame {
        image: img.to_rgba8(),
        delay_ms: None,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Delay, Frame, Rgba, codecs::gif::GifEncoder};

    #[test]
    fn static_png_is_one_frame_without_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let frames = decode_animation(&path).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].delay_ms, None);
        assert_eq!(frames[0].image.dimensions(), (3, 2));
    }

    #[test]
    fn animated_gif_keeps_order_and_delays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        {
            let f = File::create(&path).unwrap();
            let mut enc = GifEncoder::new(f);
            for (shade, ms) in [(0u8, 50u32), (128, 120), (255, 200)] {
                let buf = RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255]));
                enc.encode_frame(Frame::from_parts(
                    buf,
                    0,
                    0,
                    Delay::from_numer_denom_ms(ms, 1),
                ))
                .unwrap();
            }
        }

        let frames = decode_animation(&path).unwrap();
        let delays: Vec<_> = frames.iter().map(|f| f.delay_ms).collect();
        assert_eq!(delays, vec![Some(50), Some(120), Some(200)]);
        assert!(frames[2].image.get_pixel(0, 0).0[0] >= 250);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_animation(Path::new("definitely/not/here.webp")).is_err());
    }
}
