use crate::{foundation::error::MediaResult, quantize::IndexedFrame};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Repeat forever (GIF NETSCAPE loop extension with count 0).
    pub looping: bool,
}

/// Sink contract for consuming indexed frames in display order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()>;
    /// Push one frame, shown for `delay_ms`.
    fn push_frame(&mut self, frame: &IndexedFrame, delay_ms: u32) -> MediaResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MediaResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pub(crate) frames: Vec<(IndexedFrame, u32)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Frames with their delays, in push order.
    pub fn frames(&self) -> &[(IndexedFrame, u32)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MediaResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &IndexedFrame, delay_ms: u32) -> MediaResult<()> {
        self.frames.push((frame.clone(), delay_ms));
        Ok(())
    }

    fn end(&mut self) -> MediaResult<()> {
        self.ended = true;
        Ok(())
    }
}
