//! Adaptive palette quantization for GIF output.
//!
//! A frame that already fits in the palette keeps its exact colors. Anything richer gets a
//! NeuQuant palette learned from the frame itself, optionally with Floyd-Steinberg error diffusion.

use std::collections::HashMap;

use color_quant::NeuQuant;
use image::RgbaImage;

use crate::foundation::error::{MediaError, MediaResult};

pub const MAX_COLORS: usize = 256;

/// Pixels with alpha below this map to the transparent index.
pub const ALPHA_CUTOFF: u8 = 128;

#[derive(Clone, Copy, Debug)]
pub struct QuantizeOpts {
    /// Floyd-Steinberg error diffusion when a learned palette is needed.
    pub dither: bool,
    /// NeuQuant sampling factor: 1 is the slowest and best, 30 the fastest.
    pub sample_factor: i32,
}

impl Default for QuantizeOpts {
    fn default() -> Self {
        Self {
            dither: true,
            sample_factor: 10,
        }
    }
}

/// A palette-indexed frame, ready for a GIF encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedFrame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB triples, at most 256 entries.
    pub palette: Vec<u8>,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
    pub transparent: Option<u8>,
}

impl IndexedFrame {
    pub fn palette_len(&self) -> usize {
        self.palette.len() / 3
    }

    pub fn color_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = usize::from(self.indices[(y * self.width + x) as usize]);
        if Some(idx) == self.transparent.map(usize::from) {
            return None;
        }
        let c = self.palette.get(idx * 3..idx * 3 + 3)?;
        Some([c[0], c[1], c[2]])
    }
}

pub fn quantize(img: &RgbaImage, opts: QuantizeOpts) -> MediaResult<IndexedFrame> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::validation("cannot quantize an empty frame"));
    }
    if !(1..=30).contains(&opts.sample_factor) {
        return Err(MediaError::validation(
            "quantize sample_factor must be in 1..=30",
        ));
    }

    let has_transparency = img.pixels().any(|p| p.0[3] < ALPHA_CUTOFF);
    let max_colors = if has_transparency {
        MAX_COLORS - 1
    } else {
        MAX_COLORS
    };

    let mut frame = match exact_palette(img, max_colors) {
        Some(frame) => frame,
        None => learned_palette(img, max_colors, opts),
    };

    if has_transparency {
        let idx = frame.palette_len();
        frame.palette.extend_from_slice(&[0, 0, 0]);
        let t = idx as u8;
        for (i, px) in img.pixels().enumerate() {
            if px.0[3] < ALPHA_CUTOFF {
                frame.indices[i] = t;
            }
        }
        frame.transparent = Some(t);
    }

    Ok(frame)
}

fn exact_palette(img: &RgbaImage, max_colors: usize) -> Option<IndexedFrame> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity((img.width() * img.height()) as usize);

    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        if a < ALPHA_CUTOFF {
            // Patched to the transparent index by the caller.
            indices.push(0);
            continue;
        }
        let idx = match lookup.get(&[r, g, b]) {
            Some(&idx) => idx,
            None => {
                if lookup.len() == max_colors {
                    return None;
                }
                let idx = lookup.len() as u8;
                lookup.insert([r, g, b], idx);
                palette.extend_from_slice(&[r, g, b]);
                idx
            }
        };
        indices.push(idx);
    }

    Some(IndexedFrame {
        width: img.width(),
        height: img.height(),
        palette,
        indices,
        transparent: None,
    })
}

fn learned_palette(img: &RgbaImage, max_colors: usize, opts: QuantizeOpts) -> IndexedFrame {
    let mut samples = Vec::with_capacity(img.as_raw().len());
    for px in img.pixels().filter(|p| p.0[3] >= ALPHA_CUTOFF) {
        samples.extend_from_slice(&[px.0[0], px.0[1], px.0[2], 255]);
    }

    let nq = NeuQuant::new(opts.sample_factor, max_colors, &samples);
    let palette = nq.color_map_rgb();

    let indices = if opts.dither {
        floyd_steinberg(img, &nq, &palette)
    } else {
        img.pixels()
            .map(|p| nq.index_of(&[p.0[0], p.0[1], p.0[2], 255]) as u8)
            .collect()
    };

    IndexedFrame {
        width: img.width(),
        height: img.height(),
        palette,
        indices,
        transparent: None,
    }
}

fn floyd_steinberg(img: &RgbaImage, nq: &NeuQuant, palette: &[u8]) -> Vec<u8> {
    let w = img.width() as usize;
    let mut indices = Vec::with_capacity(w * img.height() as usize);

    // Error rows padded by one pixel on each side; pixel x lives at x + 1.
    let mut cur = vec![[0f32; 3]; w + 2];
    let mut next = vec![[0f32; 3]; w + 2];

    for row in img.rows() {
        for (x, px) in row.enumerate() {
            let [r, g, b, a] = px.0;
            if a < ALPHA_CUTOFF {
                indices.push(0);
                continue;
            }

            let e = cur[x + 1];
            let want = [
                (f32::from(r) + e[0]).clamp(0.0, 255.0),
                (f32::from(g) + e[1]).clamp(0.0, 255.0),
                (f32::from(b) + e[2]).clamp(0.0, 255.0),
            ];
            let idx = nq.index_of(&[
                want[0].round() as u8,
                want[1].round() as u8,
                want[2].round() as u8,
                255,
            ]);
            indices.push(idx as u8);

            let got = &palette[idx * 3..idx * 3 + 3];
            for c in 0..3 {
                let err = want[c] - f32::from(got[c]);
                cur[x + 2][c] += err * 7.0 / 16.0;
                next[x][c] += err * 3.0 / 16.0;
                next[x + 1][c] += err * 5.0 / 16.0;
                next[x + 2][c] += err / 16.0;
            }
        }

        std::mem::swap(&mut cur, &mut next);
        next.fill([0.0; 3]);
    }

    indices
}
