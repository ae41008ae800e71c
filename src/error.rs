pub type ChartcastResult<T> = Result<T, ChartcastError>;

#[derive(thiserror::Error, Debug)]
pub enum ChartcastError {
    /// Unreadable or corrupt image/video payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// A source or sink could not be initialized (unsupported codec, missing
    /// tool, unopenable container).
    #[error("open error: {0}")]
    Open(String),

    /// Frames in one sequence disagree on width/height.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The external audio/video muxer exited with a nonzero status.
    #[error("mux error: {0}")]
    Mux(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChartcastError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
