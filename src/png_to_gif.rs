//! Batch conversion of still PNGs into single-frame, high-fidelity GIFs.

use std::path::{Path, PathBuf};

use crate::{
    assets::decode::decode_rgba,
    composite::drop_alpha,
    encode::gif_sink::write_single_gif,
    foundation::{
        core::{BatchReport, file_size_kb, has_extension, list_files},
        error::MediaResult,
    },
    quantize::{QuantizeOpts, quantize},
};

#[derive(Clone, Debug)]
pub struct PngToGifOpts {
    pub input_dir: PathBuf,
    /// Defaults to `input_dir`.
    pub out_dir: Option<PathBuf>,
    pub dither: bool,
}

/// Convert every `*.png` in `input_dir`. A failing file is recorded and the batch continues.
#[tracing::instrument(skip(opts), fields(input_dir = %opts.input_dir.display()))]
pub fn convert_png_dir(opts: &PngToGifOpts) -> MediaResult<BatchReport> {
    let inputs = list_files(&opts.input_dir, |name| has_extension(name, "png"))?;
    let out_dir = opts.out_dir.as_deref().unwrap_or(&opts.input_dir);
    let quant = QuantizeOpts {
        dither: opts.dither,
        ..QuantizeOpts::default()
    };

    let mut report = BatchReport::default();
    for input in inputs {
        let output = out_dir.join(gif_name(&input));
        match convert_one(&input, &output, quant) {
            Ok(size_kb) => {
                tracing::info!(
                    file = %output.file_name().unwrap_or_default().to_string_lossy(),
                    size_kb = %format!("{size_kb:.1}"),
                    "high quality gif created"
                );
                report.succeeded.push(output);
            }
            Err(e) => {
                tracing::warn!(file = %input.display(), error = %e, "conversion failed");
                report.failed.push((input, e.to_string()));
            }
        }
    }
    Ok(report)
}

pub fn convert_one(input: &Path, output: &Path, quant: QuantizeOpts) -> MediaResult<f64> {
    let mut rgba = decode_rgba(input)?;
    drop_alpha(&mut rgba);
    let frame = quantize(&rgba, quant)?;
    write_single_gif(output, &frame)?;
    file_size_kb(output)
}

fn gif_name(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".gif");
    PathBuf::from(name)
}
