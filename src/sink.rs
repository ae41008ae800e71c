use crate::error::{ChartcastError, ChartcastResult};
use crate::frame::Frame;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second (positive integer).
    pub fps: u32,
}

/// Output sink for an ordered frame sequence.
///
/// Contract: `begin` exactly once, then `write_frame` in strict arrival order,
/// then `finish` exactly once — on every exit path, or the underlying file is
/// unusable. A frame whose dimensions differ from the config is a fatal
/// `DimensionMismatch`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ChartcastResult<()>;
    fn write_frame(&mut self, frame: &Frame) -> ChartcastResult<()>;
    fn finish(&mut self) -> ChartcastResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct MemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ChartcastResult<()> {
        if self.cfg.is_some() {
            return Err(ChartcastError::validation("sink already begun"));
        }
        if cfg.width == 0 || cfg.height == 0 || cfg.fps == 0 {
            return Err(ChartcastError::validation(
                "sink width/height/fps must be non-zero",
            ));
        }
        self.cfg = Some(cfg);
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> ChartcastResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(ChartcastError::validation("sink used before begin"));
        };
        if self.finished {
            return Err(ChartcastError::validation("sink already finished"));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ChartcastError::dimension_mismatch(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> ChartcastResult<()> {
        if self.cfg.is_none() {
            return Err(ChartcastError::validation("sink finished before begin"));
        }
        if self.finished {
            return Err(ChartcastError::validation("sink already finished"));
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_enforces_begin_write_finish_discipline() {
        let mut sink = MemorySink::new();
        assert!(sink.write_frame(&Frame::solid(2, 2, [0, 0, 0])).is_err());

        sink.begin(SinkConfig {
            width: 2,
            height: 2,
            fps: 30,
        })
        .unwrap();
        assert!(
            sink.begin(SinkConfig {
                width: 2,
                height: 2,
                fps: 30,
            })
            .is_err()
        );

        sink.write_frame(&Frame::solid(2, 2, [1, 2, 3])).unwrap();
        sink.finish().unwrap();
        assert!(sink.finish().is_err());
        assert_eq!(sink.frames().len(), 1);
        assert!(sink.is_finished());
    }

    #[test]
    fn mismatched_frame_dimensions_are_fatal() {
        let mut sink = MemorySink::new();
        sink.begin(SinkConfig {
            width: 4,
            height: 4,
            fps: 30,
        })
        .unwrap();
        let err = sink
            .write_frame(&Frame::solid(4, 5, [0, 0, 0]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::ChartcastError::DimensionMismatch(_)
        ));
    }
}
