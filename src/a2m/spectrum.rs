use crate::common::{try_allocate, NoteTable, RealFft};
use crate::error::{ConfigurationError, Result};

/// A frequency in Hz and the magnitude of the spectrum at that frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralBin {
    pub frequency: f32,
    pub magnitude: f32,
}

/// Computes magnitude spectra of fixed size sample blocks, restricted to
/// the frequencies that can be mapped to notes.
///
/// Any block size greater than 0 is accepted. All buffers are allocated on
/// construction. A change of sample rate or block size is handled by
/// constructing a new analyzer and replacing the old one.
///
/// The analyzed bins are the half-open range `[min_bin, max_bin)`, where
/// `max_bin` is the first bin at or above `max_freq`. Every bin below
/// `max_freq` is analyzed, so the range holds one bin more than a closed
/// range ending at `max_bin - 1` with an exclusive loop bound would.
pub struct SpectralAnalyzer {
    samplerate: u32,
    block_size: usize,
    min_freq: f32,
    max_freq: f32,
    /// Index of the first analyzed bin.
    min_bin: usize,
    /// Index one past the last analyzed bin.
    max_bin: usize,
    /// The center frequency of each of the `block_size / 2` FFT bins.
    bin_freqs: Box<[f32]>,
    fft: RealFft,
    /// The magnitude of each of the `block_size / 2` FFT bins.
    magnitudes: Box<[f32]>,
    spectrum: Box<[SpectralBin]>,
}

impl SpectralAnalyzer {
    pub fn new(samplerate: u32, block_size: usize, note_table: &NoteTable) -> Result<Self> {
        if samplerate == 0 {
            return Err(ConfigurationError::InvalidSampleRate(samplerate).into());
        }
        if block_size == 0 {
            return Err(ConfigurationError::InvalidBlockSize(block_size).into());
        }
        let fft = RealFft::new(block_size)?;
        let magnitudes = try_allocate(fft.bin_count(), 0.)?;

        // A block lasting T ms cannot resolve periods longer than T.
        let time_window_ms = block_size as f32 / (samplerate as f32 / 1000.);
        let min_freq = f32::max(note_table.lowest().low, 1000. / time_window_ms);
        let max_freq = f32::min(note_table.highest().high, samplerate as f32 / 2.);

        let bin_count = fft.bin_count();
        let bin_freqs: Box<[f32]> = (0..bin_count)
            .map(|i| (i as f64 * samplerate as f64 / block_size as f64) as f32)
            .collect();

        let min_bin = bin_freqs
            .iter()
            .position(|freq| *freq >= min_freq)
            .unwrap_or(bin_count);
        let max_bin = bin_freqs
            .iter()
            .position(|freq| *freq >= max_freq)
            .unwrap_or(bin_count)
            .max(min_bin);

        let spectrum = bin_freqs[min_bin..max_bin]
            .iter()
            .map(|frequency| SpectralBin {
                frequency: *frequency,
                magnitude: 0.,
            })
            .collect();

        Ok(SpectralAnalyzer {
            samplerate,
            block_size,
            min_freq,
            max_freq,
            min_bin,
            max_bin,
            bin_freqs,
            fft,
            magnitudes,
            spectrum,
        })
    }

    /// Computes the magnitude spectrum of `samples`, which must contain
    /// exactly `block_size` samples, and returns the bins in the analyzed range.
    pub fn analyze(&mut self, samples: &[f32]) -> Result<&[SpectralBin]> {
        if samples.len() != self.block_size {
            return Err(ConfigurationError::BlockLengthMismatch {
                expected: self.block_size,
                actual: samples.len(),
            }
            .into());
        }

        self.fft.magnitudes(samples, &mut self.magnitudes);
        for (bin, magnitude) in self
            .spectrum
            .iter_mut()
            .zip(self.magnitudes[self.min_bin..self.max_bin].iter())
        {
            bin.magnitude = *magnitude;
        }

        Ok(&self.spectrum)
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The total number of bins produced by one FFT, i.e `block_size / 2`.
    pub fn bin_count(&self) -> usize {
        self.bin_freqs.len()
    }

    pub fn min_freq(&self) -> f32 {
        self.min_freq
    }

    pub fn max_freq(&self) -> f32 {
        self.max_freq
    }

    pub fn min_bin(&self) -> usize {
        self.min_bin
    }

    pub fn max_bin(&self) -> usize {
        self.max_bin
    }

    pub fn bin_freqs(&self) -> &[f32] {
        &self.bin_freqs
    }
}
