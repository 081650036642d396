//! Conversion of audio sample blocks into notes.
//!
//! Each block is transformed into a magnitude spectrum using a real FFT. The frequency
//! of every bin within the usable range is mapped to a note number of the 12 tone
//! equal temperament scale, optionally snapped to a set of allowed pitch classes.
//! Magnitudes are averaged per note and scaled to a velocity, and notes that are
//! too quiet or outside the requested pitch range are discarded.
//!
//! Every block is converted independently. No note on/off state is tracked
//! between blocks.
//!
//! # Examples
//!
//! ```
//! use micro_a2m::a2m::{Converter, ConverterOptions};
//!
//! // A pure tone at 440 Hz
//! let sample_rate = 44100;
//! let block_size = 1024;
//! let samples: Vec<f32> = (0..block_size)
//!     .map(|i| (2.0 * core::f32::consts::PI * 440.0 * (i as f32) / sample_rate as f32).sin())
//!     .collect();
//!
//! // Report only the loudest note
//! let options = ConverterOptions {
//!     note_count: 1,
//!     ..ConverterOptions::new(sample_rate, block_size)
//! };
//! let converter = Converter::from_options(options).unwrap();
//! let notes = converter.convert(&samples).unwrap();
//! assert_eq!(notes.len(), 1);
//! assert_eq!(notes[0].pitch, 69); // A4
//!
//! // Parameters can be changed at any time, also from another thread.
//! converter.set_transpose(-12);
//! assert_eq!(converter.convert(&samples).unwrap()[0].pitch, 57);
//! ```

mod aggregator;
mod classifier;
mod converter;
mod note;
mod options;
mod spectrum;

pub use aggregator::{amplitude_to_velocity, AccumulatedPitch, AggregationParams, NoteAggregator};
pub use classifier::{nearest_value, snap_to_key, PitchClassifier, FALLBACK_PITCH};
pub use converter::Converter;
pub use note::Note;
pub use options::{velocity_limit, ConverterOptions};
pub use spectrum::{SpectralAnalyzer, SpectralBin};
