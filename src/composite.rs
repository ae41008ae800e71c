use crate::error::{ChartcastError, ChartcastResult};
use crate::frame::Frame;

/// Default overlay opacity for timed insertion.
pub const OVERLAY_ALPHA: f32 = 0.7;

/// Fixed-weight alpha blend of two same-sized frames.
///
/// Per channel, per pixel: `alpha * overlay + (1 - alpha) * base`, computed in
/// 8-bit fixed point with round-half-up. The weights sum to 255 exactly, so
/// blending a frame with itself returns it bit-for-bit.
///
/// The caller is responsible for resizing the overlay first; differing
/// dimensions are a `DimensionMismatch` error.
pub fn blend(base: &Frame, overlay: &Frame, alpha: f32) -> ChartcastResult<Frame> {
    if base.dimensions() != overlay.dimensions() {
        return Err(ChartcastError::dimension_mismatch(format!(
            "blend requires equal dimensions: base {}x{}, overlay {}x{}",
            base.width, base.height, overlay.width, overlay.height
        )));
    }

    let weight = ((alpha.clamp(0.0, 1.0) * 255.0).round() as u32).min(255);
    let inv = 255 - weight;

    let mut data = Vec::with_capacity(base.data.len());
    for (b, o) in base.data.iter().zip(overlay.data.iter()) {
        let v = (u32::from(*o) * weight + u32::from(*b) * inv + 127) / 255;
        data.push(v as u8);
    }

    Frame::new(base.width, base.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blending_identical_frames_is_exact() {
        let frame = Frame::solid(4, 4, [13, 200, 97]);
        let out = blend(&frame, &frame, OVERLAY_ALPHA).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn alpha_endpoints_select_one_input() {
        let base = Frame::solid(2, 2, [0, 0, 0]);
        let overlay = Frame::solid(2, 2, [255, 100, 10]);
        assert_eq!(blend(&base, &overlay, 0.0).unwrap(), base);
        assert_eq!(blend(&base, &overlay, 1.0).unwrap(), overlay);
    }

    #[test]
    fn default_alpha_weights_the_overlay() {
        let base = Frame::solid(1, 1, [0, 0, 0]);
        let overlay = Frame::solid(1, 1, [255, 255, 255]);
        let out = blend(&base, &overlay, OVERLAY_ALPHA).unwrap();
        // round(0.7 * 255) = 179; (255*179 + 127) / 255 = 179.
        assert_eq!(out.pixel(0, 0), [179, 179, 179]);
    }

    #[test]
    fn out_of_range_alpha_is_clamped() {
        let base = Frame::solid(1, 1, [10, 10, 10]);
        let overlay = Frame::solid(1, 1, [20, 20, 20]);
        assert_eq!(blend(&base, &overlay, 2.0).unwrap(), overlay);
        assert_eq!(blend(&base, &overlay, -1.0).unwrap(), base);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let base = Frame::solid(2, 2, [0, 0, 0]);
        let overlay = Frame::solid(2, 3, [0, 0, 0]);
        assert!(matches!(
            blend(&base, &overlay, OVERLAY_ALPHA),
            Err(ChartcastError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn resized_overlay_always_blends() {
        let base = Frame::solid(8, 6, [1, 2, 3]);
        let overlay = Frame::solid(100, 30, [4, 5, 6]).resize(8, 6);
        assert!(blend(&base, &overlay, OVERLAY_ALPHA).is_ok());
    }
}
