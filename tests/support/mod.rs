#![allow(dead_code)]

use std::{fs::File, path::Path};

use image::{Rgba, RgbaImage};

pub struct DecodedGif {
    pub width: u16,
    pub height: u16,
    pub delays_cs: Vec<u16>,
    pub frame_sizes: Vec<(u16, u16)>,
    pub transparent: Vec<Option<u8>>,
    /// First RGB of frame 0, resolved through its palette.
    pub first_pixel: [u8; 3],
}

pub fn decode_gif(path: &Path) -> DecodedGif {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(File::open(path).unwrap()).unwrap();
    let (width, height) = (dec.width(), dec.height());
    let global = dec.global_palette().map(|p| p.to_vec());

    let mut out = DecodedGif {
        width,
        height,
        delays_cs: Vec::new(),
        frame_sizes: Vec::new(),
        transparent: Vec::new(),
        first_pixel: [0; 3],
    };
    while let Some(frame) = dec.read_next_frame().unwrap() {
        if out.delays_cs.is_empty() {
            let palette = frame.palette.clone().or_else(|| global.clone()).unwrap();
            let idx = usize::from(frame.buffer[0]) * 3;
            out.first_pixel = [palette[idx], palette[idx + 1], palette[idx + 2]];
        }
        out.delays_cs.push(frame.delay);
        out.frame_sizes.push((frame.width, frame.height));
        out.transparent.push(frame.transparent);
    }
    out
}

/// NETSCAPE2.0 application extension with a loop count of 0.
pub fn loops_forever(path: &Path) -> bool {
    let bytes = std::fs::read(path).unwrap();
    let marker = b"NETSCAPE2.0";
    bytes
        .windows(marker.len() + 4)
        .any(|w| &w[..marker.len()] == marker && w[marker.len()..] == [3, 1, 0, 0])
}

/// A half-transparent gradient, like a 2x browser capture of a diagram on a clear page.
pub fn write_capture_frame(path: &Path, w: u32, h: u32, phase: u32) {
    RgbaImage::from_fn(w, h, |x, y| {
        let a = if (x + phase) % 4 == 0 { 0 } else { 255 };
        Rgba([
            ((x * 7 + phase * 13) % 256) as u8,
            ((y * 5) % 256) as u8,
            ((x + y) % 256) as u8,
            a,
        ])
    })
    .save(path)
    .unwrap();
}
