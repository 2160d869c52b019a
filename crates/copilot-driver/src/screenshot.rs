//! Screen capture and PNG/base64 encoding

use crate::errors::DriverError;
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Rgba};
use std::io::Cursor;
use tracing::debug;

/// Largest side sent to the vision model
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Holds the screenshot data
#[derive(Debug, Clone)]
pub struct ScreenshotResult {
    /// Raw RGBA8 pixels
    pub image_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ScreenshotResult {
    /// Encode as PNG without resizing
    pub fn to_png(&self) -> Result<Vec<u8>, DriverError> {
        self.to_png_resized(None)
    }

    /// Encode as PNG, shrinking so neither side exceeds `max_dimension`.
    pub fn to_png_resized(&self, max_dimension: Option<u32>) -> Result<Vec<u8>, DriverError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.image_data.len() != expected {
            return Err(DriverError::Capture(format!(
                "pixel buffer is {} bytes, expected {} for {}x{}",
                self.image_data.len(),
                expected,
                self.width,
                self.height
            )));
        }

        let (new_width, new_height) = self.scaled_size(max_dimension);
        let (width, height, pixels) = if (new_width, new_height) != (self.width, self.height) {
            let img = ImageBuffer::<Rgba<u8>, _>::from_raw(
                self.width,
                self.height,
                self.image_data.as_slice(),
            )
            .ok_or_else(|| DriverError::Capture("failed to create image buffer".to_string()))?;
            let resized =
                image::imageops::resize(&img, new_width, new_height, FilterType::Lanczos3);
            debug!(
                "[screenshot] Resized {}x{} to {}x{}",
                self.width, self.height, new_width, new_height
            );
            (new_width, new_height, resized.into_raw())
        } else {
            (self.width, self.height, self.image_data.clone())
        };

        let mut png_data = Vec::new();
        PngEncoder::new(Cursor::new(&mut png_data)).write_image(
            &pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        )?;
        Ok(png_data)
    }

    /// Size after applying `max_dimension`, keeping the aspect ratio
    pub fn scaled_size(&self, max_dimension: Option<u32>) -> (u32, u32) {
        let max = max_dimension.unwrap_or(u32::MAX);
        if self.width <= max && self.height <= max {
            return (self.width, self.height);
        }
        let scale = max as f32 / self.width.max(self.height) as f32;
        (
            ((self.width as f32 * scale).round() as u32).max(1),
            ((self.height as f32 * scale).round() as u32).max(1),
        )
    }

    pub fn to_base64_png(&self, max_dimension: Option<u32>) -> Result<String, DriverError> {
        Ok(general_purpose::STANDARD.encode(self.to_png_resized(max_dimension)?))
    }
}

/// One encoded capture, numbered for logging
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u32,
    pub base64_png: String,
    /// Size of the encoded (possibly downscaled) image
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// Encode a capture. The PNG bytes are returned too so they can be dumped.
    pub fn encode(
        index: u32,
        shot: &ScreenshotResult,
        max_dimension: Option<u32>,
    ) -> Result<(Self, Vec<u8>), DriverError> {
        let png = shot.to_png_resized(max_dimension)?;
        let (width, height) = shot.scaled_size(max_dimension);
        let frame = Self {
            index,
            base64_png: general_purpose::STANDARD.encode(&png),
            width,
            height,
        };
        Ok((frame, png))
    }
}

/// Anything that can grab the current screen
pub trait ScreenCapturer {
    fn capture(&self) -> Result<ScreenshotResult, DriverError>;
}

/// Captures the monitor containing the origin (the primary monitor on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryMonitorCapturer;

impl ScreenCapturer for PrimaryMonitorCapturer {
    fn capture(&self) -> Result<ScreenshotResult, DriverError> {
        let monitor = match xcap::Monitor::from_point(0, 0) {
            Ok(monitor) => monitor,
            Err(_) => xcap::Monitor::all()
                .map_err(|e| DriverError::Capture(format!("failed to list monitors: {e}")))?
                .into_iter()
                .next()
                .ok_or_else(|| DriverError::Capture("no monitor found".to_string()))?,
        };

        let image = monitor
            .capture_image()
            .map_err(|e| DriverError::Capture(format!("failed to capture monitor: {e}")))?;

        let width = image.width();
        let height = image.height();
        Ok(ScreenshotResult {
            image_data: image.into_raw(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> ScreenshotResult {
        ScreenshotResult {
            image_data: vec![200; (width * height * 4) as usize],
            width,
            height,
        }
    }

    fn png_size(png: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(png).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_to_png_keeps_size() {
        let png = solid(4, 3).to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(png_size(&png), (4, 3));
    }

    #[test]
    fn test_to_png_resized_limits_longest_side() {
        let png = solid(40, 20).to_png_resized(Some(10)).unwrap();
        assert_eq!(png_size(&png), (10, 5));
    }

    #[test]
    fn test_to_png_rejects_short_buffer() {
        let bad = ScreenshotResult {
            image_data: vec![0; 10],
            width: 4,
            height: 4,
        };
        assert!(matches!(bad.to_png(), Err(DriverError::Capture(_))));
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(solid(1920, 1080).scaled_size(Some(1920)), (1920, 1080));
        assert_eq!(solid(3840, 2160).scaled_size(Some(1920)), (1920, 1080));
        assert_eq!(solid(10, 10).scaled_size(None), (10, 10));
    }

    #[test]
    fn test_frame_encode() {
        let (frame, png) = Frame::encode(7, &solid(40, 20), Some(10)).unwrap();
        assert_eq!(frame.index, 7);
        assert_eq!((frame.width, frame.height), (10, 5));
        assert_eq!(
            general_purpose::STANDARD.decode(&frame.base64_png).unwrap(),
            png
        );
    }
}
