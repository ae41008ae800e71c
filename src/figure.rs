use crate::error::ChartcastResult;

/// An explicit handle to a renderable plot figure.
///
/// This replaces any notion of a process-global "current figure": whoever owns
/// the figure passes it into a [`crate::FigureSource`]. Dimensions always come
/// from the figure's own canvas, never from the caller.
///
/// `render_rgba` may be called once per output frame, so figures that mutate
/// between calls produce animated output; a static figure simply renders the
/// same buffer every time.
pub trait Figure {
    /// Canvas size in pixels, fixed for the figure's lifetime.
    fn canvas_size(&self) -> (u32, u32);

    /// Render the current state of the figure as a tightly-packed, row-major
    /// RGBA8 buffer of exactly `width * height * 4` bytes.
    fn render_rgba(&mut self) -> ChartcastResult<Vec<u8>>;
}
