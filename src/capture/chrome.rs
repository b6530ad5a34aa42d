use std::{ffi::OsStr, path::Path, sync::Arc, time::Duration};

use anyhow::Context as _;
use headless_chrome::{
    Browser, LaunchOptions, Tab,
    protocol::cdp::{Page::CaptureScreenshotFormatOption, types::Method},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::{
    capture::session::{PageSession, seek_script},
    foundation::error::{MediaError, MediaResult},
};

/// Logical viewport plus the device scale factor applied to screenshots.
#[derive(Clone, Debug)]
pub struct ViewportOpts {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    /// Extra wait after load for fonts and layout to settle.
    pub settle_ms: u64,
    pub nav_timeout_ms: u64,
    pub sandbox: bool,
}

impl ViewportOpts {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 2.0,
            settle_ms: 1000,
            nav_timeout_ms: 30_000,
            sandbox: true,
        }
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MediaError::validation("viewport width/height must be non-zero"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MediaError::validation("device scale factor must be positive"));
        }
        Ok(())
    }
}

/// One isolated headless Chrome instance with a single tab on a local HTML file.
pub struct ChromeSession {
    // Dropping the browser kills the process, so it must outlive the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    #[tracing::instrument(skip(viewport), fields(html = %html.display(), width = viewport.width, height = viewport.height))]
    pub fn open(html: &Path, viewport: &ViewportOpts) -> MediaResult<Self> {
        viewport.validate()?;
        let html = html
            .canonicalize()
            .with_context(|| format!("resolve html file '{}'", html.display()))?;
        let url = file_url(&html);

        let launch = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(viewport.sandbox)
            .window_size(Some((viewport.width, viewport.height)))
            .idle_browser_timeout(Duration::from_secs(600))
            .args(vec![OsStr::new("--hide-scrollbars")])
            .build()
            .map_err(|e| MediaError::capture(format!("invalid browser launch options: {e}")))?;

        tracing::info!("launching headless chrome");
        let browser = Browser::new(launch)
            .map_err(|e| MediaError::capture(format!("failed to launch headless chrome: {e:#}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| MediaError::capture(format!("failed to open tab: {e:#}")))?;
        tab.set_default_timeout(Duration::from_millis(viewport.nav_timeout_ms));
        tab.call_method(DeviceMetrics::from(viewport))
            .map_err(|e| MediaError::capture(format!("failed to set viewport: {e:#}")))?;

        tab.navigate_to(&url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| MediaError::capture(format!("failed to load '{url}': {e:#}")))?;
        tab.evaluate("document.fonts.ready.then(() => true)", true)
            .map_err(|e| MediaError::capture(format!("waiting for fonts failed: {e:#}")))?;

        std::thread::sleep(Duration::from_millis(viewport.settle_ms));
        tracing::debug!(%url, "page settled");

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl PageSession for ChromeSession {
    fn seek_animations(&mut self, t_ms: f64) -> MediaResult<usize> {
        let obj = self
            .tab
            .evaluate(&seek_script(t_ms), false)
            .map_err(|e| MediaError::capture(format!("seek to {t_ms}ms failed: {e:#}")))?;
        Ok(obj.value.and_then(|v| v.as_u64()).unwrap_or(0) as usize)
    }

    fn screenshot_png(&mut self) -> MediaResult<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| MediaError::capture(format!("screenshot failed: {e:#}")))
    }
}

/// Bytes escaped in a `file://` path. `/` and the drive colon stay literal.
const FILE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `file://` URL for an absolute path, percent-encoding the bytes a URL would misread.
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let raw = raw.strip_prefix("//?/").unwrap_or(&raw);
    let encoded = utf8_percent_encode(raw, FILE_PATH).to_string();

    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

/// Page-level viewport and device scale, sent as `Emulation.setDeviceMetricsOverride`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct DeviceMetrics {
    width: u32,
    height: u32,
    device_scale_factor: f64,
    mobile: bool,
}

impl From<&ViewportOpts> for DeviceMetrics {
    fn from(v: &ViewportOpts) -> Self {
        Self {
            width: v.width,
            height: v.height,
            device_scale_factor: v.scale,
            mobile: false,
        }
    }
}

impl Method for DeviceMetrics {
    const NAME: &'static str = "Emulation.setDeviceMetricsOverride";
    type ReturnObject = serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_paths_get_escaped() {
        assert_eq!(
            file_url(Path::new("/home/me/CAP Theorem & Replication/cap#1.html")),
            "file:///home/me/CAP%20Theorem%20&%20Replication/cap%231.html"
        );
    }

    #[test]
    fn windows_style_paths() {
        assert_eq!(
            file_url(Path::new(r"\\?\C:\Users\me\anim.html")),
            "file:///C:/Users/me/anim.html"
        );
    }

    #[test]
    fn reserved_and_non_ascii_bytes_are_escaped() {
        assert_eq!(
            file_url(Path::new("/tmp/a [b] {c}/ré%sumé?.html")),
            "file:///tmp/a%20%5Bb%5D%20%7Bc%7D/r%C3%A9%25sum%C3%A9%3F.html"
        );
    }

    #[test]
    fn device_metrics_follow_viewport() {
        let mut v = ViewportOpts::new(1400, 800);
        v.scale = 2.0;
        let params = serde_json::to_value(DeviceMetrics::from(&v)).unwrap();
        assert_eq!(
            params,
            serde_json::json!({
                "width": 1400,
                "height": 800,
                "deviceScaleFactor": 2.0,
                "mobile": false
            })
        );
        assert_eq!(DeviceMetrics::NAME, "Emulation.setDeviceMetricsOverride");
    }

    #[test]
    fn viewport_validation() {
        assert!(ViewportOpts::new(0, 10).validate().is_err());
        let mut v = ViewportOpts::new(10, 10);
        v.scale = 0.0;
        assert!(v.validate().is_err());
        ViewportOpts::new(1400, 800).validate().unwrap();
    }
}
