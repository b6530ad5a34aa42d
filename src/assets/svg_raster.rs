use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::{
    core::BgColor,
    error::{MediaError, MediaResult},
};

/// Logical size used when an SVG has no usable width/height/viewBox.
pub const FALLBACK_SIZE: (f32, f32) = (900.0, 500.0);

const MAX_DIM: u32 = 16_384;

pub fn parse_svg(bytes: &[u8]) -> MediaResult<usvg::Tree> {
    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

pub fn logical_size(tree: &usvg::Tree) -> (f32, f32) {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 {
        (w, h)
    } else {
        FALLBACK_SIZE
    }
}

/// Rasterize `tree` at `scale` times its logical size and flatten it onto `bg`.
pub fn rasterize_over(tree: &usvg::Tree, scale: f32, bg: BgColor) -> MediaResult<RgbaImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MediaError::validation("svg scale must be a positive number"));
    }

    let (lw, lh) = logical_size(tree);
    let width = (lw * scale).ceil().max(1.0) as u32;
    let height = (lh * scale).ceil().max(1.0) as u32;
    if width > MAX_DIM || height > MAX_DIM {
        return Err(MediaError::validation(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MediaError::image("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let sx = width as f32 / size.width().max(f32::EPSILON);
    let sy = height as f32 / size.height().max(f32::EPSILON);
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut data = pixmap.take();
    flatten_premul_in_place(&mut data, bg);
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| MediaError::image("svg pixmap size mismatch (bug)"))
}

fn flatten_premul_in_place(rgba: &mut [u8], bg: BgColor) {
    let bg = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
    for px in rgba.chunks_exact_mut(4) {
        let inv = 255u16 - u16::from(px[3]);
        for c in 0..3 {
            let v = u16::from(px[c]) + ((u32::from(bg[c]) * u32::from(inv) + 127) / 255) as u16;
            px[c] = v.min(255) as u8;
        }
        px[3] = 255;
    }
}
