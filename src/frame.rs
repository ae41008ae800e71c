use std::path::Path;

use crate::error::{ChartcastError, ChartcastResult};

/// One decoded/rendered video instant: a tightly-packed, row-major BGR8 buffer.
///
/// Channel order is blue, green, red to match what the encoder sink consumes
/// (`rawvideo` with `-pix_fmt bgr24`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap a raw BGR8 buffer, checking `data.len() == width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> ChartcastResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChartcastError::validation(
                "frame width/height must be non-zero",
            ));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(ChartcastError::dimension_mismatch(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height} bgr24",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid-color frame, `bgr` in channel order.
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an image file into a frame.
    pub fn open(path: &Path) -> ChartcastResult<Self> {
        let dyn_img = image::open(path).map_err(|e| {
            ChartcastError::decode(format!("failed to decode image '{}': {e}", path.display()))
        })?;
        let rgb = dyn_img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut data = rgb.into_raw();
        swap_red_blue(&mut data);
        Frame::new(width, height, data)
    }

    /// Build a frame from a tightly-packed RGBA8 buffer: alpha is dropped and
    /// channels reordered to BGR.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> ChartcastResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ChartcastError::dimension_mismatch(format!(
                "rgba buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for px in rgba.chunks_exact(4) {
            data.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        Frame::new(width, height, data)
    }

    /// Linear (bilinear) resize to exactly `width` x `height`; aspect ratio is
    /// not preserved.
    pub fn resize(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        // Per-channel resampling is order-agnostic, so the BGR buffer can ride
        // through the RGB image type unchanged.
        let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("frame buffer length matches dimensions");
        let resized =
            image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Frame {
            width,
            height,
            data: resized.into_raw(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sample one pixel as `[b, g, r]`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let off = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[off], self.data[off + 1], self.data[off + 2]]
    }
}

fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
