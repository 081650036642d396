/// A sample representation that can be converted to the `f32` samples used for processing.
///
/// Integer samples are normalized to [-1, 1).
pub trait Sample: Copy {
    fn to_f32(self) -> f32;
}

impl Sample for f32 {
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Sample for i16 {
    fn to_f32(self) -> f32 {
        self as f32 / 32768.
    }
}

impl Sample for i32 {
    fn to_f32(self) -> f32 {
        (self as f64 / 2147483648.) as f32
    }
}

/// Unsigned 8 bit samples, centered at 128.
impl Sample for u8 {
    fn to_f32(self) -> f32 {
        (self as f32 - 128.) / 128.
    }
}
