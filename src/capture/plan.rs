use crate::foundation::error::{MediaError, MediaResult};

pub const DEFAULT_FRAME_COUNT: u32 = 60;

/// Sampling starts this far into the timeline so one-shot intro animations have settled.
pub const DEFAULT_LEAD_IN_MS: f64 = 10_000.0;

/// Evenly spaced sample points across one animation loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    pub count: u32,
    pub loop_ms: f64,
    pub lead_in_ms: f64,
}

impl FramePlan {
    pub fn new(loop_ms: f64) -> Self {
        Self {
            count: DEFAULT_FRAME_COUNT,
            loop_ms,
            lead_in_ms: DEFAULT_LEAD_IN_MS,
        }
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.count == 0 {
            return Err(MediaError::validation("frame count must be non-zero"));
        }
        if !self.loop_ms.is_finite() || self.loop_ms <= 0.0 {
            return Err(MediaError::validation("loop duration must be positive"));
        }
        if !self.lead_in_ms.is_finite() || self.lead_in_ms < 0.0 {
            return Err(MediaError::validation("lead-in must be non-negative"));
        }
        Ok(())
    }

    pub fn step_ms(&self) -> f64 {
        self.loop_ms / f64::from(self.count)
    }

    /// `lead_in + i * loop / count` for `i` in `0..count`.
    pub fn timestamps(&self) -> Vec<f64> {
        let step = self.step_ms();
        (0..self.count)
            .map(|i| self.lead_in_ms + f64::from(i) * step)
            .collect()
    }
}

/// `frame_NNN.png` for frame `index` of `count`.
///
/// Indices are zero-padded to at least three digits and to the width of the last index, so
/// file-name order is capture order for any frame count.
pub fn frame_file_name(index: u32, count: u32) -> String {
    let width = count.saturating_sub(1).to_string().len().max(3);
    format!("frame_{index:0width$}.png")
}
