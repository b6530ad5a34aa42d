use image::{RgbaImage, imageops::FilterType};

use crate::foundation::{
    core::BgColor,
    error::{MediaError, MediaResult},
};

/// Halve both dimensions (integer division) with a Lanczos3 filter.
///
/// Captures are taken at a device scale factor of 2, so this brings them back to the logical
/// viewport size. The filter works on straight RGBA, so flatten transparent frames first.
pub fn downscale_half(src: &RgbaImage) -> MediaResult<RgbaImage> {
    let (w, h) = src.dimensions();
    let (tw, th) = (w / 2, h / 2);
    if tw == 0 || th == 0 {
        return Err(MediaError::validation(format!(
            "cannot halve a {w}x{h} frame (both sides must be at least 2px)"
        )));
    }
    Ok(image::imageops::resize(src, tw, th, FilterType::Lanczos3))
}

/// Composite straight-alpha `src` over an opaque `bg`, using the source alpha as the mask.
///
/// Every output pixel has alpha 255.
pub fn flatten_onto(src: &RgbaImage, bg: BgColor) -> RgbaImage {
    let mut out = src.clone();
    flatten_rgba8_in_place(&mut out, bg);
    out
}

pub fn flatten_rgba8_in_place(img: &mut RgbaImage, bg: BgColor) {
    let bg_r = u16::from(bg.r);
    let bg_g = u16::from(bg.g);
    let bg_b = u16::from(bg.b);

    for px in img.pixels_mut() {
        let s = px.0;
        let a = u16::from(s[3]);
        if a == 255 {
            continue;
        }

        let inv = 255u16 - a;
        px.0 = [
            (mul_div255(u16::from(s[0]), a) + mul_div255(bg_r, inv)).min(255) as u8,
            (mul_div255(u16::from(s[1]), a) + mul_div255(bg_g, inv)).min(255) as u8,
            (mul_div255(u16::from(s[2]), a) + mul_div255(bg_b, inv)).min(255) as u8,
            255,
        ];
    }
}

/// Force a fully opaque image by discarding alpha (colors are kept as stored, not composited).
pub fn drop_alpha(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        px.0[3] = 255;
    }
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
