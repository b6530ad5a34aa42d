//! High-resolution SVG rasterisation for diagram assets.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::svg_raster::{parse_svg, rasterize_over},
    foundation::{
        core::{BatchReport, BgColor, ensure_parent_dir, has_extension, list_files},
        error::MediaResult,
    },
};

pub const DEFAULT_SCALE: f32 = 3.0;

#[derive(Clone, Debug)]
pub struct SvgToPngOpts {
    /// SVG files, or directories whose `*.svg` files are converted.
    pub inputs: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub scale: f32,
    pub bg: BgColor,
}

impl SvgToPngOpts {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            out_dir: None,
            scale: DEFAULT_SCALE,
            bg: BgColor::WHITE,
        }
    }
}

pub fn expand_inputs(inputs: &[PathBuf]) -> MediaResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            out.extend(list_files(input, |name| has_extension(name, "svg"))?);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

#[tracing::instrument(skip(opts), fields(scale = opts.scale))]
pub fn rasterize_svgs(opts: &SvgToPngOpts) -> MediaResult<BatchReport> {
    let mut report = BatchReport::default();
    for input in expand_inputs(&opts.inputs)? {
        let output = png_path_for(&input, opts.out_dir.as_deref());
        match rasterize_one(&input, &output, opts) {
            Ok((w, h)) => {
                tracing::info!(file = %output.display(), width = w, height = h, "png created");
                report.succeeded.push(output);
            }
            Err(e) => {
                tracing::warn!(file = %input.display(), error = %e, "svg rasterisation failed");
                report.failed.push((input, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn rasterize_one(input: &Path, output: &Path, opts: &SvgToPngOpts) -> MediaResult<(u32, u32)> {
    let bytes = std::fs::read(input).with_context(|| format!("read '{}'", input.display()))?;
    let tree = parse_svg(&bytes)?;
    let img = rasterize_over(&tree, opts.scale, opts.bg)?;
    ensure_parent_dir(output)?;
    img.save_with_format(output, image::ImageFormat::Png)?;
    Ok(img.dimensions())
}

fn png_path_for(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let png = input.with_extension("png");
    match (out_dir, png.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_path_defaults_next_to_source() {
        assert_eq!(
            png_path_for(Path::new("img/cdn.svg"), None),
            PathBuf::from("img/cdn.png")
        );
        assert_eq!(
            png_path_for(Path::new("img/cdn.svg"), Some(Path::new("out"))),
            PathBuf::from("out/cdn.png")
        );
    }

    #[test]
    fn batch_isolates_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a_good.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="5"/>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("b_bad.svg"), "<svg").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = rasterize_svgs(&SvgToPngOpts::new(vec![dir.path().to_path_buf()])).unwrap();
        assert_eq!(report.succeeded, vec![dir.path().join("a_good.png")]);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_clean());

        let png = image::open(dir.path().join("a_good.png")).unwrap();
        assert_eq!((png.width(), png.height()), (30, 15));
    }
}
