/// Construction parameters for a [`Converter`](super::Converter).
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOptions {
    /// The sample rate in Hz of the audio passed to `convert`. Must be greater than 0.
    pub samplerate: u32,
    /// The number of samples processed per call to `convert`.
    pub block_size: usize,
    /// The normalized velocity threshold in [0, 1]. Notes at or below it are dropped.
    pub activation_level: f32,
    /// Chroma values in [0, 11] to which detected notes are snapped. Empty means no snapping.
    pub pitch_set: Vec<u8>,
    /// The inclusive range of transposed note numbers to report.
    pub pitch_range: [u8; 2],
    /// The maximum number of notes to report per block. 0 means no limit.
    pub note_count: usize,
    /// The number of semitones to transpose detected notes by, in [-127, 127].
    pub transpose: i32,
    /// Amplitude normalization divisor in [0, 1].
    pub ceiling: f32,
}

impl ConverterOptions {
    pub fn new(samplerate: u32, block_size: usize) -> Self {
        ConverterOptions {
            samplerate,
            block_size,
            activation_level: 0.,
            pitch_set: Vec::new(),
            pitch_range: [0, 127],
            note_count: 0,
            transpose: 0,
            ceiling: 1.,
        }
    }
}

/// Returns the velocity a note must exceed to be reported.
pub fn velocity_limit(activation_level: f32) -> u8 {
    if activation_level == 0. {
        1
    } else {
        u8::max(1, (127. * activation_level).round() as u8)
    }
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    // NaN is treated as 0
    if value.is_nan() {
        0.
    } else {
        value.max(0.).min(1.)
    }
}

pub(crate) fn clamp_transpose(transpose: i32) -> i32 {
    transpose.max(-127).min(127)
}
