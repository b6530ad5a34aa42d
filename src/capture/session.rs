use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    capture::plan::{FramePlan, frame_file_name},
    foundation::{
        core::{ensure_parent_dir, has_extension, list_files},
        error::MediaResult,
    },
};

/// A loaded page that can be frozen at a point on its animation timeline and photographed.
pub trait PageSession {
    /// Seek every document animation that has an effect to `t_ms` and pause it.
    ///
    /// Returns how many animations were touched.
    fn seek_animations(&mut self, t_ms: f64) -> MediaResult<usize>;

    /// PNG bytes of the current viewport, at the session's device scale factor.
    fn screenshot_png(&mut self) -> MediaResult<Vec<u8>>;
}

/// Script run in the page to freeze the Web Animations timeline at `t_ms`.
pub fn seek_script(t_ms: f64) -> String {
    format!(
        "(() => {{ let n = 0; document.getAnimations().forEach(a => {{ \
         if (a.effect) {{ a.currentTime = {t_ms}; a.pause(); n += 1; }} }}); return n; }})()"
    )
}

/// Create `dir` and delete any PNGs left from an earlier capture.
pub fn prepare_frames_dir(dir: &Path) -> MediaResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create frames dir '{}'", dir.display()))?;
    for stale in list_files(dir, |name| has_extension(name, "png"))? {
        std::fs::remove_file(&stale)
            .with_context(|| format!("remove stale frame '{}'", stale.display()))?;
    }
    Ok(())
}

/// Capture one screenshot per planned timestamp into `frames_dir` as `frame_NNN.png`.
#[tracing::instrument(skip(session, plan), fields(frames_dir = %frames_dir.display(), count = plan.count))]
pub fn capture_frames(
    session: &mut dyn PageSession,
    frames_dir: &Path,
    plan: &FramePlan,
) -> MediaResult<Vec<PathBuf>> {
    plan.validate()?;
    prepare_frames_dir(frames_dir)?;

    tracing::info!(step_ms = plan.step_ms(), "capturing frames");
    let mut written = Vec::with_capacity(plan.count as usize);
    for (i, t) in plan.timestamps().into_iter().enumerate() {
        let touched = session.seek_animations(t)?;
        let png = session.screenshot_png()?;

        let path = frames_dir.join(frame_file_name(i as u32, plan.count));
        std::fs::write(&path, &png).with_context(|| format!("write '{}'", path.display()))?;
        written.push(path);

        if i % 10 == 0 {
            tracing::info!(
                frame = i + 1,
                total = plan.count,
                t_ms = t,
                animations = touched,
                "frame captured"
            );
        }
    }

    tracing::info!(frames = written.len(), "frames saved");
    Ok(written)
}

/// Take a single screenshot of the settled page.
#[tracing::instrument(skip(session), fields(output = %output.display()))]
pub fn capture_static(session: &mut dyn PageSession, output: &Path) -> MediaResult<()> {
    ensure_parent_dir(output)?;
    let png = session.screenshot_png()?;
    std::fs::write(output, &png).with_context(|| format!("write '{}'", output.display()))?;
    tracing::info!("static png saved");
    Ok(())
}
