//! Media production helpers for diagram-heavy lessons.
//!
//! Each pipeline is a one-shot, synchronous run:
//!
//! - [`assemble_gif`]: captured `frame_NNN.png` sequence to a looping GIF
//! - [`convert_png_dir`]: still PNGs to single-frame GIFs
//! - [`capture_frames`] / [`capture_static`]: screenshots of a local HTML page in headless Chrome
//! - [`convert_animation`]: animated WebP (or GIF/APNG) to GIF with per-frame timing
//! - [`rasterize_svgs`]: SVG diagrams to high-resolution PNGs
//! - [`fetch_all`]: video transcripts to plain and timestamped text files
#![forbid(unsafe_code)]

pub mod assets;
pub mod capture;
pub mod composite;
pub mod encode;
pub mod foundation;
pub mod logging;
pub mod make_gif;
pub mod png_to_gif;
pub mod quantize;
pub mod svg_to_png;
pub mod transcripts;
pub mod webp_to_gif;

pub use capture::{
    chrome::{ChromeSession, ViewportOpts},
    plan::{FramePlan, frame_file_name},
    session::{PageSession, capture_frames, capture_static},
};
pub use encode::{
    gif_sink::GifSink,
    sink::{FrameSink, InMemorySink, SinkConfig},
};
pub use foundation::core::{BatchReport, BgColor};
pub use foundation::error::{MediaError, MediaResult};
pub use make_gif::{MakeGifOpts, MakeGifReport, assemble_gif};
pub use png_to_gif::{PngToGifOpts, convert_png_dir};
pub use quantize::{IndexedFrame, QuantizeOpts, quantize};
pub use svg_to_png::{SvgToPngOpts, rasterize_svgs};
pub use transcripts::{
    config::TranscriptConfig,
    fetcher::{FetchReport, fetch_all},
    model::{Segment, TrackListing, TranscriptTrack, Video},
    source::TranscriptSource,
    youtube::YoutubeSource,
};
pub use webp_to_gif::{ConvertReport, convert_animation};
