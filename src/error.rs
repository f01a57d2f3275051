use thiserror::Error;

/// Invalid input to the segmentation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SegmentError {
    #[error("image must be at least 1x1, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("channel sizes differ: {0:?}")]
    ChannelMismatch([(u32, u32); 3]),

    #[error("sample ({x}, {y}) of channel {channel} is not finite")]
    NonFiniteSample { channel: usize, x: u32, y: u32 },

    #[error("sigma must be within 0..={max}, got {0}", max = crate::filter::MAX_SIGMA)]
    InvalidSigma(f32),

    #[error("threshold constant must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),

    #[error("minimum component size must be at least 1")]
    InvalidMinSize,
}
