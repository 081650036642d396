//! Error types.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Invalid parameters passed to a constructor, setter or processing call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The sample rate must be greater than 0.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// The block size must be greater than 0.
    #[error("invalid block size: {0} samples")]
    InvalidBlockSize(usize),

    /// A nearest value search was attempted over an empty candidate set.
    #[error("cannot find the nearest value to {0} in an empty set")]
    EmptyCandidateSet(u8),

    /// Pitch set entries are chroma values and must be in the range [0, 11].
    #[error("invalid pitch class {0}, expected a value in [0, 11]")]
    InvalidPitchClass(u8),

    /// The lower end of a pitch range must not exceed the upper end.
    #[error("invalid pitch range [{low}, {high}]")]
    InvalidPitchRange {
        /// Lower pitch.
        low: u8,
        /// Upper pitch.
        high: u8,
    },

    /// A sample block passed to `convert` must contain exactly `block_size` samples.
    #[error("got a block of {actual} samples, expected {expected}")]
    BlockLengthMismatch {
        /// The configured block size.
        expected: usize,
        /// The length of the block that was passed.
        actual: usize,
    },

    /// The number of channels pushed does not match the configured channel count.
    #[error("got {actual} channels, expected {expected}")]
    ChannelCountMismatch {
        /// The configured channel count.
        expected: usize,
        /// The number of channel slices that were passed.
        actual: usize,
    },

    /// A channel slice holds fewer samples than requested.
    #[error("channel {channel} holds {len} samples, {requested} requested")]
    ChannelTooShort {
        /// The index of the offending channel.
        channel: usize,
        /// The length of the channel slice.
        len: usize,
        /// The requested sample count.
        requested: usize,
    },
}

/// Failure to set up the spectral working buffers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// A working buffer of the given number of elements could not be allocated.
    #[error("failed to allocate a buffer of {0} elements")]
    AllocationFailed(usize),
}

/// Any error reported by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid parameters.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// Failure to set up working buffers.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
}
