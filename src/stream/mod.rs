//! Adapting audio delivered in chunks of arbitrary size to the fixed
//! block size expected by a [`Converter`](crate::a2m::Converter).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use micro_a2m::a2m::Converter;
//! use micro_a2m::stream::StreamRingBuffer;
//!
//! let converter = Arc::new(Converter::new(44100, 512).unwrap());
//! let block_converter = Arc::clone(&converter);
//! let mut buffer = StreamRingBuffer::new(
//!     move |channel, block, _| {
//!         for note in block_converter.convert(block).unwrap() {
//!             println!("channel {}: note {} velocity {}", channel, note.pitch, note.velocity);
//!         }
//!     },
//!     2,
//!     512,
//! );
//!
//! // Interleaved 16 bit audio from a device callback, split into channels
//! let left = vec![0_i16; 300];
//! let right = vec![0_i16; 300];
//! buffer.push(&[&left[..], &right[..]], 300).unwrap();
//! assert_eq!(buffer.fill_index(), 300);
//! ```

mod ring_buffer;
mod sample;

pub use ring_buffer::{BlockProcessor, StreamRingBuffer};
pub use sample::Sample;
