use glimpse_types::{CaptureRegion, PixelBuffer};
use tracing::debug;
use xcap::Monitor;

/// Screen grabber interface. Implementations block; callers are expected
/// to run them off the async runtime.
pub trait ScreenGrabber: Send + Sync {
    /// Grab `region`, or the full primary display when `None`.
    fn grab(&self, region: Option<CaptureRegion>) -> Result<PixelBuffer, CaptureError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture region has zero width or height")]
    EmptyRegion,

    #[error("no monitor available")]
    NoMonitor,

    #[error("screen backend error: {0}")]
    Backend(String),

    #[error("PNG encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// `xcap`-backed grabber.
pub struct XcapGrabber;

impl ScreenGrabber for XcapGrabber {
    fn grab(&self, region: Option<CaptureRegion>) -> Result<PixelBuffer, CaptureError> {
        match region {
            Some(region) if region.is_empty() => Err(CaptureError::EmptyRegion),
            Some(region) => grab_region(region),
            None => grab_primary(),
        }
    }
}

fn grab_primary() -> Result<PixelBuffer, CaptureError> {
    let monitors = Monitor::all().map_err(backend)?;
    let monitor = monitors.first().ok_or(CaptureError::NoMonitor)?;
    let image = monitor.capture_image().map_err(backend)?;
    debug!(
        width = image.width(),
        height = image.height(),
        "captured primary display"
    );
    encode_png(&image)
}

fn grab_region(region: CaptureRegion) -> Result<PixelBuffer, CaptureError> {
    let monitors = Monitor::all().map_err(backend)?;
    let monitor = find_monitor(&monitors, region)?;
    let monitor_x = monitor.x().map_err(backend)?;
    let monitor_y = monitor.y().map_err(backend)?;

    let image = monitor.capture_image().map_err(backend)?;

    // crop_imm clamps to the image bounds, so a region hanging off the
    // monitor edge shrinks instead of failing.
    let cropped = image::imageops::crop_imm(
        &image,
        (region.x - monitor_x).max(0) as u32,
        (region.y - monitor_y).max(0) as u32,
        region.width,
        region.height,
    )
    .to_image();

    debug!(
        width = cropped.width(),
        height = cropped.height(),
        "captured region"
    );
    encode_png(&cropped)
}

/// Monitor containing the region, falling back to the first one.
fn find_monitor(monitors: &[Monitor], region: CaptureRegion) -> Result<&Monitor, CaptureError> {
    for monitor in monitors {
        if contains(monitor, region).unwrap_or(false) {
            return Ok(monitor);
        }
    }
    monitors.first().ok_or(CaptureError::NoMonitor)
}

fn contains(monitor: &Monitor, region: CaptureRegion) -> xcap::XCapResult<bool> {
    let x = monitor.x()?;
    let y = monitor.y()?;
    let width = monitor.width()? as i32;
    let height = monitor.height()? as i32;
    Ok(region.x >= x
        && region.y >= y
        && region.x + region.width as i32 <= x + width
        && region.y + region.height as i32 <= y + height)
}

fn backend(err: xcap::XCapError) -> CaptureError {
    CaptureError::Backend(err.to_string())
}

fn encode_png(image: &image::RgbaImage) -> Result<PixelBuffer, CaptureError> {
    use image::ImageEncoder;
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(PixelBuffer {
        width: image.width(),
        height: image.height(),
        png: buffer,
    })
}
