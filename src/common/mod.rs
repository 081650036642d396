//! Common algorithms and utilities.

mod fft;
mod note_table;

pub use fft::{is_supported_fft_size, real_fft, try_allocate, RealFft, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use note_table::{NoteRange, NoteTable, NOTE_COUNT};
