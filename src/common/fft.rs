use core::convert::TryInto;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{ResourceError, Result};

/// The smallest FFT size supported by microfft.
pub const MIN_FFT_SIZE: usize = 8;
/// The largest FFT size supported by microfft.
pub const MAX_FFT_SIZE: usize = 4096;

/// Returns true if `real_fft` can transform a buffer of length `fft_size`.
pub fn is_supported_fft_size(fft_size: usize) -> bool {
    fft_size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size)
}

macro_rules! rfft {
    ($func:path, $buffer:expr) => {
        $buffer
            .try_into()
            .ok()
            .map(|input| $func(input) as &mut [microfft::Complex32])
    };
}

/// Performs an in-place real FFT of a given buffer, returning the
/// `buffer.len() / 2` lowest frequency coefficients. The real valued
/// coefficient at the Nyquist frequency is packed into the imaginary
/// part of the DC bin.
///
/// Returns `None` if the buffer length is not a supported FFT size.
pub fn real_fft(buffer: &mut [f32]) -> Option<&mut [microfft::Complex32]> {
    match buffer.len() {
        8 => rfft!(microfft::real::rfft_8, buffer),
        16 => rfft!(microfft::real::rfft_16, buffer),
        32 => rfft!(microfft::real::rfft_32, buffer),
        64 => rfft!(microfft::real::rfft_64, buffer),
        128 => rfft!(microfft::real::rfft_128, buffer),
        256 => rfft!(microfft::real::rfft_256, buffer),
        512 => rfft!(microfft::real::rfft_512, buffer),
        1024 => rfft!(microfft::real::rfft_1024, buffer),
        2048 => rfft!(microfft::real::rfft_2048, buffer),
        4096 => rfft!(microfft::real::rfft_4096, buffer),
        _ => None,
    }
}

/// Allocates a buffer of `len` copies of `value`, returning an error instead
/// of aborting if the allocation fails.
pub fn try_allocate<T: Clone>(len: usize, value: T) -> Result<Box<[T]>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ResourceError::AllocationFailed(len))?;
    buffer.resize(len, value);
    Ok(buffer.into_boxed_slice())
}

enum Transform {
    /// In-place transform using microfft. Only used for sizes accepted by `is_supported_fft_size`.
    Fixed { buffer: Box<[f32]> },
    /// Complex transform of any size, planned by rustfft.
    Planned {
        fft: Arc<dyn Fft<f32>>,
        buffer: Box<[Complex<f32>]>,
        scratch: Box<[Complex<f32>]>,
    },
}

/// Computes magnitude spectra of real valued blocks of a fixed size.
///
/// Power of two sizes from `MIN_FFT_SIZE` to `MAX_FFT_SIZE` use `real_fft`,
/// other sizes use a planned rustfft transform. All buffers are allocated
/// on construction.
pub struct RealFft {
    size: usize,
    transform: Transform,
}

impl RealFft {
    pub fn new(size: usize) -> Result<Self> {
        let transform = if is_supported_fft_size(size) {
            Transform::Fixed {
                buffer: try_allocate(size, 0.)?,
            }
        } else {
            // Allocate before planning, the planner aborts on allocation failure.
            let buffer = try_allocate(size, Complex::new(0., 0.))?;
            let fft = FftPlanner::<f32>::new().plan_fft_forward(size);
            let scratch = try_allocate(fft.get_inplace_scratch_len(), Complex::new(0., 0.))?;
            Transform::Planned {
                fft,
                buffer,
                scratch,
            }
        };
        Ok(RealFft { size, transform })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of magnitudes produced per block, i.e `size / 2`.
    pub fn bin_count(&self) -> usize {
        self.size / 2
    }

    /// Writes the magnitudes of the `size / 2` lowest frequency bins of
    /// `samples` to `magnitudes`. `samples` is expected to hold `size` values.
    pub fn magnitudes(&mut self, samples: &[f32], magnitudes: &mut [f32]) {
        match &mut self.transform {
            Transform::Fixed { buffer } => {
                for (dest, sample) in buffer.iter_mut().zip(samples) {
                    *dest = *sample;
                }
                if let Some(fft) = real_fft(buffer) {
                    // Clear real-valued coefficient at the Nyquist frequency, which is packed
                    // into the imaginary part of the DC bin.
                    fft[0].im = 0.;
                    for (magnitude, z) in magnitudes.iter_mut().zip(fft.iter()) {
                        *magnitude = z.norm_sqr().sqrt();
                    }
                }
            }
            Transform::Planned {
                fft,
                buffer,
                scratch,
            } => {
                for (dest, sample) in buffer.iter_mut().zip(samples) {
                    *dest = Complex::new(*sample, 0.);
                }
                fft.process_with_scratch(&mut buffer[..], &mut scratch[..]);
                for (magnitude, z) in magnitudes.iter_mut().zip(buffer.iter()) {
                    *magnitude = z.norm_sqr().sqrt();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn bin_centered_sine(size: usize, bin: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                (2.0 * core::f64::consts::PI * bin as f64 * i as f64 / size as f64).sin() as f32
            })
            .collect()
    }

    #[test]
    fn test_supported_sizes() {
        assert!(is_supported_fft_size(8));
        assert!(is_supported_fft_size(512));
        assert!(is_supported_fft_size(4096));
        assert!(!is_supported_fft_size(0));
        assert!(!is_supported_fft_size(4));
        assert!(!is_supported_fft_size(500));
        assert!(!is_supported_fft_size(8192));
    }

    #[test]
    fn test_unsupported_size_is_rejected() {
        let mut buffer = vec![0.0_f32; 100];
        assert!(real_fft(&mut buffer).is_none());
    }

    #[test]
    fn test_bin_centered_sine() {
        // A sine completing exactly 4 periods in the buffer should put all its
        // energy into bin 4, with magnitude N / 2.
        let size = 64;
        let mut buffer = bin_centered_sine(size, 4);
        let fft = real_fft(&mut buffer).unwrap();
        assert_eq!(fft.len(), size / 2);
        for (index, z) in fft.iter().enumerate().skip(1) {
            let magnitude = z.norm_sqr().sqrt();
            if index == 4 {
                assert!((magnitude - (size as f32) / 2.0).abs() < 1e-3);
            } else {
                assert!(magnitude < 1e-3);
            }
        }
    }

    #[test]
    fn test_magnitudes_of_any_size() {
        for size in [64, 100, 441, 8192].iter().copied() {
            let mut fft = RealFft::new(size).unwrap();
            assert_eq!(fft.size(), size);
            assert_eq!(fft.bin_count(), size / 2);

            let samples = bin_centered_sine(size, 5);
            let mut magnitudes = vec![-1.0_f32; fft.bin_count()];
            fft.magnitudes(&samples, &mut magnitudes);
            for (index, magnitude) in magnitudes.iter().enumerate() {
                if index == 5 {
                    assert!((magnitude - size as f32 / 2.0).abs() < 1e-2 * size as f32);
                } else {
                    assert!(*magnitude < 1e-2, "size {} bin {}: {}", size, index, magnitude);
                }
            }
        }
    }

    #[test]
    fn test_planned_silence() {
        let mut fft = RealFft::new(441).unwrap();
        let mut magnitudes = vec![1.0_f32; fft.bin_count()];
        fft.magnitudes(&vec![0.0; 441], &mut magnitudes);
        assert!(magnitudes.iter().all(|magnitude| *magnitude == 0.));
    }

    #[test]
    fn test_allocation_failure() {
        assert_eq!(
            try_allocate(usize::MAX / 2, 0.0_f32).err(),
            Some(Error::Resource(ResourceError::AllocationFailed(usize::MAX / 2)))
        );
        assert!(RealFft::new(usize::MAX / 2).is_err());
    }
}
