use crate::error::{ConfigurationError, Result};
use crate::stream::sample::Sample;

/// Called with the channel index, the completed block and the offset into
/// the pushed chunk at which the block started. The offset is negative if
/// the block started in a previously pushed chunk.
pub type BlockProcessor = Box<dyn FnMut(usize, &[f32], isize) + Send>;

/// Collects chunks of arbitrary size from multiple channels into fixed size
/// blocks, converting samples to `f32`, and passes each completed block to
/// a processor.
///
/// All channels are filled in lockstep. There is no internal locking; a
/// buffer is meant to be fed from a single audio callback.
pub struct StreamRingBuffer {
    processor: BlockProcessor,
    nchannels: usize,
    block_size: usize,
    // The number of samples written to the current block of each channel
    fill_index: usize,
    buffers: Vec<Box<[f32]>>,
}

impl StreamRingBuffer {
    pub fn new<F>(processor: F, nchannels: usize, block_size: usize) -> Self
    where
        F: FnMut(usize, &[f32], isize) + Send + 'static,
    {
        StreamRingBuffer {
            processor: Box::new(processor),
            nchannels,
            block_size,
            fill_index: 0,
            buffers: allocate_buffers(nchannels, block_size),
        }
    }

    /// Sets the channel count and block size, discarding any partially filled block.
    pub fn configure(&mut self, nchannels: usize, block_size: usize) {
        if nchannels != self.nchannels || block_size != self.block_size {
            self.nchannels = nchannels;
            self.block_size = block_size;
            self.buffers = allocate_buffers(nchannels, block_size);
        }
        self.fill_index = 0;
    }

    /// Sets the channel count. A partially filled block is discarded if the count changes.
    pub fn set_nchannels(&mut self, nchannels: usize) {
        if nchannels != self.nchannels {
            self.configure(nchannels, self.block_size);
        }
    }

    /// Sets the block size. A partially filled block is discarded if the size changes.
    pub fn set_block_size(&mut self, block_size: usize) {
        if block_size != self.block_size {
            self.configure(self.nchannels, block_size);
        }
    }

    pub fn set_processor<F>(&mut self, processor: F)
    where
        F: FnMut(usize, &[f32], isize) + Send + 'static,
    {
        self.processor = Box::new(processor);
    }

    pub fn nchannels(&self) -> usize {
        self.nchannels
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The number of samples per channel in the current, incomplete block.
    pub fn fill_index(&self) -> usize {
        self.fill_index
    }

    /// Discards the partially filled block.
    pub fn clear(&mut self) {
        self.fill_index = 0;
    }

    /// Appends the first `sample_count` samples of each channel, invoking the
    /// processor once per channel for every block that gets completed.
    /// Returns the number of completed blocks.
    pub fn push<S: Sample>(&mut self, channels: &[&[S]], sample_count: usize) -> Result<usize> {
        if self.block_size == 0 {
            return Err(ConfigurationError::InvalidBlockSize(self.block_size).into());
        }
        if channels.len() != self.nchannels {
            return Err(ConfigurationError::ChannelCountMismatch {
                expected: self.nchannels,
                actual: channels.len(),
            }
            .into());
        }
        if let Some((channel, samples)) = channels
            .iter()
            .enumerate()
            .find(|(_, samples)| samples.len() < sample_count)
        {
            return Err(ConfigurationError::ChannelTooShort {
                channel,
                len: samples.len(),
                requested: sample_count,
            }
            .into());
        }

        let mut offset = 0;
        let mut block_count = 0;
        while offset < sample_count {
            let to_process = usize::min(sample_count - offset, self.block_size - self.fill_index);
            let write_range = self.fill_index..self.fill_index + to_process;
            for (buffer, samples) in self.buffers.iter_mut().zip(channels) {
                for (dest, src) in buffer[write_range.clone()]
                    .iter_mut()
                    .zip(&samples[offset..offset + to_process])
                {
                    *dest = src.to_f32();
                }
            }
            self.fill_index += to_process;
            offset += to_process;

            if self.fill_index == self.block_size {
                let block_start = offset as isize - self.block_size as isize;
                for (channel, buffer) in self.buffers.iter().enumerate() {
                    (self.processor)(channel, &buffer[..], block_start);
                }
                self.fill_index = 0;
                block_count += 1;
            }
        }

        Ok(block_count)
    }
}

fn allocate_buffers(nchannels: usize, block_size: usize) -> Vec<Box<[f32]>> {
    (0..nchannels)
        .map(|_| vec![0.; block_size].into_boxed_slice())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2m::Converter;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(usize, Vec<f32>, isize)>>>;

    fn recording_buffer(nchannels: usize, block_size: usize) -> (StreamRingBuffer, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let buffer = StreamRingBuffer::new(
            move |channel, block, block_start| {
                sink.lock()
                    .unwrap()
                    .push((channel, block.to_vec(), block_start))
            },
            nchannels,
            block_size,
        );
        (buffer, calls)
    }

    #[test]
    fn test_single_push_completes_two_blocks() {
        let (mut buffer, calls) = recording_buffer(0, 0);
        buffer.configure(1, 4);
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(buffer.push(&[&samples[..]], 10).unwrap(), 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (0, vec![0., 1., 2., 3.], 0));
        assert_eq!(calls[1], (0, vec![4., 5., 6., 7.], 4));
        assert_eq!(buffer.fill_index(), 2);
    }

    #[test]
    fn test_block_spanning_pushes() {
        let (mut buffer, calls) = recording_buffer(1, 4);
        let samples: Vec<f32> = (0..6).map(|i| i as f32).collect();
        assert_eq!(buffer.push(&[&samples[..3]], 3).unwrap(), 0);
        assert_eq!(buffer.fill_index(), 3);
        assert_eq!(buffer.push(&[&samples[3..]], 3).unwrap(), 1);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        // The block started 3 samples before the second chunk
        assert_eq!(calls[0], (0, vec![0., 1., 2., 3.], -3));
        assert_eq!(buffer.fill_index(), 2);
    }

    #[test]
    fn test_multiple_channels() {
        let (mut buffer, calls) = recording_buffer(2, 2);
        let left = [1_i16, 2, 3];
        let right = [-16384_i16, 16384, 0];
        assert_eq!(buffer.push(&[&left[..], &right[..]], 3).unwrap(), 1);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, 0);
        assert_eq!(calls[0].1, vec![1. / 32768., 2. / 32768.]);
        assert_eq!(calls[1].0, 1);
        assert_eq!(calls[1].1, vec![-0.5, 0.5]);
        assert_eq!(buffer.fill_index(), 1);
    }

    #[test]
    fn test_sample_count_limits_consumption() {
        let (mut buffer, calls) = recording_buffer(1, 4);
        let samples = [0.5_f64; 8];
        assert_eq!(buffer.push(&[&samples[..]], 3).unwrap(), 0);
        assert_eq!(buffer.fill_index(), 3);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reconfiguration_drops_partial_block() {
        let (mut buffer, calls) = recording_buffer(1, 4);
        let samples = [1.0_f32; 3];
        buffer.push(&[&samples[..]], 3).unwrap();

        buffer.set_block_size(4);
        assert_eq!(buffer.fill_index(), 3);
        buffer.set_block_size(8);
        assert_eq!(buffer.fill_index(), 0);
        assert_eq!(buffer.block_size(), 8);

        buffer.push(&[&samples[..]], 3).unwrap();
        buffer.set_nchannels(2);
        assert_eq!(buffer.fill_index(), 0);
        assert_eq!(buffer.nchannels(), 2);

        buffer.push(&[&samples[..], &samples[..]], 3).unwrap();
        buffer.clear();
        assert_eq!(buffer.fill_index(), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_processor() {
        let (mut buffer, calls) = recording_buffer(1, 2);
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        buffer.set_processor(move |_, _, _| *counter.lock().unwrap() += 1);
        buffer.push(&[&[0.0_f32; 4][..]], 4).unwrap();
        assert_eq!(*count.lock().unwrap(), 2);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pushes() {
        let (mut buffer, _) = recording_buffer(2, 4);
        let samples = [0.0_f32; 4];
        assert_eq!(
            buffer.push(&[&samples[..]], 4),
            Err(Error::Configuration(ConfigurationError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            }))
        );
        assert_eq!(
            buffer.push(&[&samples[..], &samples[..2]], 4),
            Err(Error::Configuration(ConfigurationError::ChannelTooShort {
                channel: 1,
                len: 2,
                requested: 4
            }))
        );

        let (mut empty, _) = recording_buffer(1, 0);
        assert!(empty.push(&[&samples[..]], 4).is_err());
    }

    #[test]
    fn test_feeding_a_converter() {
        let sample_rate = 45056;
        let block_size = 512;
        let converter = Arc::new(Converter::new(sample_rate, block_size).unwrap());
        let pitches = Arc::new(Mutex::new(Vec::new()));

        let processor_converter = Arc::clone(&converter);
        let processor_pitches = Arc::clone(&pitches);
        let mut buffer = StreamRingBuffer::new(
            move |_, block, _| {
                let notes = processor_converter.convert(block).unwrap();
                let mut pitches = processor_pitches.lock().unwrap();
                pitches.extend(notes.iter().map(|note| note.pitch));
            },
            1,
            block_size,
        );

        // A 440 Hz tone, delivered in chunks unrelated to the block size
        let signal: Vec<f32> = (0..3 * block_size)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * core::f64::consts::PI * 440.0 * t).sin() as f32
            })
            .collect();
        for chunk in signal.chunks(100) {
            buffer.push(&[chunk], chunk.len()).unwrap();
        }

        assert_eq!(*pitches.lock().unwrap(), vec![69, 69, 69]);
        assert_eq!(buffer.fill_index(), 0);
    }
}
