use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use mediakit::{
    BatchReport, BgColor, ChromeSession, FramePlan, MakeGifOpts, PngToGifOpts, SvgToPngOpts,
    TranscriptConfig, ViewportOpts, YoutubeSource,
};

#[derive(Parser, Debug)]
#[command(name = "mediakit", version, about = "Lesson media helpers")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble frame_*.png captures into a looping GIF, then delete the frames.
    MakeGif(MakeGifArgs),
    /// Convert every PNG in a directory into a single-frame GIF.
    PngToGif(PngToGifArgs),
    /// Capture evenly spaced animation frames of a local HTML page.
    CaptureFrames(CaptureFramesArgs),
    /// Capture one high-resolution screenshot of a local HTML page.
    CaptureStatic(CaptureStaticArgs),
    /// Re-encode an animated WebP (or GIF/APNG) as a looping GIF.
    WebpToGif(WebpToGifArgs),
    /// Rasterize SVG diagrams to high-resolution PNGs.
    SvgToPng(SvgToPngArgs),
    /// Fetch video transcripts as plain and timestamped text.
    Transcripts(TranscriptsArgs),
}

#[derive(Parser, Debug)]
struct MakeGifArgs {
    /// Directory holding frame_NNN.png files.
    frames_dir: PathBuf,
    /// Output GIF path.
    output_gif: PathBuf,
    /// Display time of every frame, in milliseconds.
    duration_ms: u32,
    /// Background for transparent pixels, as r,g,b or r,g,b,a.
    bg: BgColor,
    /// Keep the source frames after encoding.
    #[arg(long)]
    keep_frames: bool,
}

#[derive(Parser, Debug)]
struct PngToGifArgs {
    /// Directory of PNG files.
    input_dir: PathBuf,
    /// Where to write the GIFs (defaults to the input directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Apply Floyd-Steinberg dithering when the palette has to be reduced.
    #[arg(long)]
    dither: bool,
}

#[derive(Parser, Debug)]
struct ViewportArgs {
    /// Device scale factor applied to screenshots.
    #[arg(long, default_value_t = 2.0)]
    scale: f64,
    /// Navigation timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    nav_timeout_ms: u64,
    /// Launch Chrome without its sandbox (needed when running as root in containers).
    #[arg(long)]
    no_sandbox: bool,
}

#[derive(Parser, Debug)]
struct CaptureFramesArgs {
    html_file: PathBuf,
    frames_dir: PathBuf,
    width: u32,
    height: u32,
    /// Length of one animation loop, in milliseconds.
    loop_ms: u32,
    /// Number of frames sampled across the loop.
    #[arg(long, default_value_t = mediakit::capture::plan::DEFAULT_FRAME_COUNT)]
    frames: u32,
    /// Timeline offset of the first sample, in milliseconds.
    #[arg(long, default_value_t = mediakit::capture::plan::DEFAULT_LEAD_IN_MS)]
    lead_in_ms: f64,
    /// Wait after load for fonts and layout, in milliseconds.
    #[arg(long, default_value_t = 800)]
    settle_ms: u64,
    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Parser, Debug)]
struct CaptureStaticArgs {
    html_file: PathBuf,
    output_png: PathBuf,
    width: u32,
    height: u32,
    /// Wait after load for fonts and layout, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Parser, Debug)]
struct WebpToGifArgs {
    input: PathBuf,
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct SvgToPngArgs {
    /// SVG files or directories of SVG files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Raster scale relative to the SVG's own size.
    #[arg(long, default_value_t = mediakit::svg_to_png::DEFAULT_SCALE)]
    scale: f32,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Background color, as r,g,b or r,g,b,a.
    #[arg(long, default_value = "255,255,255")]
    bg: BgColor,
}

#[derive(Parser, Debug)]
struct TranscriptsArgs {
    /// JSON file with {"videos": [{"id", "title"}], "output_dir"?, "language"?}.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Overrides the configured transcript language.
    #[arg(long)]
    language: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    mediakit::logging::init_tracing(&cli.log_level);

    match cli.cmd {
        Command::MakeGif(args) => cmd_make_gif(args),
        Command::PngToGif(args) => cmd_png_to_gif(args),
        Command::CaptureFrames(args) => cmd_capture_frames(args),
        Command::CaptureStatic(args) => cmd_capture_static(args),
        Command::WebpToGif(args) => cmd_webp_to_gif(args),
        Command::SvgToPng(args) => cmd_svg_to_png(args),
        Command::Transcripts(args) => cmd_transcripts(args),
    }
}

fn cmd_make_gif(args: MakeGifArgs) -> anyhow::Result<ExitCode> {
    let opts = MakeGifOpts {
        frames_dir: args.frames_dir,
        output: args.output_gif,
        duration_ms: args.duration_ms,
        bg: args.bg,
        keep_frames: args.keep_frames,
    };
    let report = mediakit::assemble_gif(&opts)?;

    eprintln!(
        "wrote {} ({} frames, {}x{}, {:.0} KB)",
        report.output.display(),
        report.frames,
        report.width,
        report.height,
        report.size_kb
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_png_to_gif(args: PngToGifArgs) -> anyhow::Result<ExitCode> {
    let report = mediakit::convert_png_dir(&PngToGifOpts {
        input_dir: args.input_dir,
        out_dir: args.out_dir,
        dither: args.dither,
    })?;
    Ok(batch_exit(&report))
}

fn viewport(width: u32, height: u32, settle_ms: u64, args: &ViewportArgs) -> ViewportOpts {
    ViewportOpts {
        scale: args.scale,
        settle_ms,
        nav_timeout_ms: args.nav_timeout_ms,
        sandbox: !args.no_sandbox,
        ..ViewportOpts::new(width, height)
    }
}

fn cmd_capture_frames(args: CaptureFramesArgs) -> anyhow::Result<ExitCode> {
    let plan = FramePlan {
        count: args.frames,
        loop_ms: f64::from(args.loop_ms),
        lead_in_ms: args.lead_in_ms,
    };
    plan.validate()?;

    let vp = viewport(args.width, args.height, args.settle_ms, &args.viewport);
    let mut session = ChromeSession::open(&args.html_file, &vp)?;
    let frames = mediakit::capture_frames(&mut session, &args.frames_dir, &plan)?;

    eprintln!(
        "wrote {} frames to {}",
        frames.len(),
        args.frames_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_capture_static(args: CaptureStaticArgs) -> anyhow::Result<ExitCode> {
    let vp = viewport(args.width, args.height, args.settle_ms, &args.viewport);
    let mut session = ChromeSession::open(&args.html_file, &vp)?;
    mediakit::capture_static(&mut session, &args.output_png)?;

    eprintln!("wrote {}", args.output_png.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_webp_to_gif(args: WebpToGifArgs) -> anyhow::Result<ExitCode> {
    match mediakit::convert_animation(&args.input, &args.output) {
        Ok(report) => {
            eprintln!(
                "wrote {} ({} frames, {:.0} KB)",
                report.output.display(),
                report.frames,
                report.size_kb
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(input = %args.input.display(), error = %e, "conversion failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_svg_to_png(args: SvgToPngArgs) -> anyhow::Result<ExitCode> {
    let report = mediakit::rasterize_svgs(&SvgToPngOpts {
        inputs: args.inputs,
        out_dir: args.out_dir,
        scale: args.scale,
        bg: args.bg,
    })?;
    Ok(batch_exit(&report))
}

fn cmd_transcripts(args: TranscriptsArgs) -> anyhow::Result<ExitCode> {
    let mut cfg = match &args.config {
        Some(path) => TranscriptConfig::load(path)?,
        None => TranscriptConfig::default(),
    };
    if let Some(dir) = args.out_dir {
        cfg.output_dir = dir;
    }
    if let Some(lang) = args.language {
        cfg.language = lang;
    }

    let source = YoutubeSource::new()?;
    let report = mediakit::fetch_all(&source, &cfg)?;

    eprintln!("{}", report.summary());
    if let Some(path) = &report.combined_path {
        eprintln!("wrote {}", path.display());
    }
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn batch_exit(report: &BatchReport) -> ExitCode {
    eprintln!(
        "{} of {} files converted",
        report.succeeded.len(),
        report.total()
    );
    for (path, err) in &report.failed {
        eprintln!("  failed: {}: {err}", path.display());
    }
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
