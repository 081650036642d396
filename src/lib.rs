//! Real time conversion of audio into [MIDI](https://en.wikipedia.org/wiki/MIDI)-like
//! note events.
//!
//! Blocks of samples are analyzed using a real FFT and the resulting spectrum is mapped
//! onto the 128 notes of the 12 tone equal temperament scale. For each block, the notes
//! currently sounding are reported with a pitch and a velocity. Unlike monophonic pitch
//! detectors, any number of simultaneous notes can be reported.
//!
//! Features
//! * Per note magnitude averaging, pitch class snapping, transposition, pitch range and
//! velocity threshold filtering, and ranking of the loudest notes.
//! * Parameters can be changed while audio is being processed from another thread.
//! * Buffers are allocated up front and only reallocated when the sample rate or block size changes.
//! * A ring buffer adapting multi channel audio in chunks of arbitrary size and sample
//! format to fixed size blocks.
//!
//! See the [a2m] and [stream] modules for examples.

pub mod a2m;
pub mod common;
pub mod error;
pub mod stream;

pub use error::{ConfigurationError, Error, ResourceError, Result};
