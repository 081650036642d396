use crate::a2m::classifier::PitchClassifier;
use crate::a2m::note::Note;
use crate::a2m::spectrum::SpectralBin;
use crate::common::{NoteTable, NOTE_COUNT};
use crate::error::Result;

/// Running magnitude statistics for a single note number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccumulatedPitch {
    pub sum: f32,
    pub count: usize,
}

impl AccumulatedPitch {
    /// The mean magnitude, or `None` if no bins were accumulated.
    pub fn mean(&self) -> Option<f32> {
        if self.count > 0 {
            Some(self.sum / self.count as f32)
        } else {
            None
        }
    }
}

/// Filtering and scaling parameters used when turning accumulated
/// magnitudes into notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationParams {
    pub transpose: i32,
    pub pitch_range: [u8; 2],
    pub velocity_limit: u8,
    pub ceiling: f32,
    /// The maximum number of notes to return. 0 means no limit.
    pub note_count: usize,
    /// The total number of bins of the analyzed spectrum, used for normalization.
    pub bin_count: usize,
}

/// Maps a mean bin magnitude to a velocity in [0, 127].
pub fn amplitude_to_velocity(amplitude: f32, bin_count: usize, ceiling: f32) -> u8 {
    let velocity = 127. * amplitude / (bin_count as f32 * ceiling);
    if velocity.is_nan() {
        0
    } else {
        velocity.max(0.).min(127.) as u8
    }
}

/// Accumulates spectral bins per note number and produces a ranked list of notes.
///
/// Magnitudes are averaged rather than summed per note, so that high notes,
/// which span more bins, are not reported louder than low notes.
pub struct NoteAggregator {
    accumulator: [AccumulatedPitch; NOTE_COUNT],
}

impl Default for NoteAggregator {
    fn default() -> Self {
        NoteAggregator::new()
    }
}

impl NoteAggregator {
    pub fn new() -> Self {
        NoteAggregator {
            accumulator: [AccumulatedPitch::default(); NOTE_COUNT],
        }
    }

    pub fn reset(&mut self) {
        for pitch in self.accumulator.iter_mut() {
            *pitch = AccumulatedPitch::default();
        }
    }

    /// The statistics accumulated for a given note number.
    pub fn accumulated(&self, pitch: u8) -> &AccumulatedPitch {
        &self.accumulator[pitch as usize]
    }

    /// Adds the magnitude of each bin with a positive magnitude to the
    /// statistics of the note its frequency maps to.
    pub fn accumulate(
        &mut self,
        spectrum: &[SpectralBin],
        classifier: &mut PitchClassifier,
        note_table: &NoteTable,
    ) -> Result<()> {
        for bin in spectrum.iter().filter(|bin| bin.magnitude > 0.) {
            let pitch = classifier.classify(note_table, bin.frequency)?;
            let accumulated = &mut self.accumulator[pitch as usize];
            accumulated.sum += bin.magnitude;
            accumulated.count += 1;
        }
        Ok(())
    }

    /// Builds notes from the accumulated statistics. Notes are returned in
    /// pitch order, or loudest first and truncated if `note_count` is non-zero.
    pub fn collect(&self, params: &AggregationParams) -> Vec<Note> {
        let [low, high] = params.pitch_range;
        let mut notes: Vec<Note> = Vec::new();

        for (raw_pitch, accumulated) in self.accumulator.iter().enumerate() {
            let mean_amplitude = match accumulated.mean() {
                Some(mean) => mean,
                None => continue,
            };
            let pitch = raw_pitch as i32 + params.transpose;
            if pitch < low as i32 || pitch > high as i32 {
                continue;
            }
            let velocity =
                amplitude_to_velocity(mean_amplitude, params.bin_count, params.ceiling);
            if velocity > params.velocity_limit {
                notes.push(Note::new(
                    pitch as u8,
                    raw_pitch as u8,
                    velocity,
                    accumulated.count,
                ));
            }
        }

        if params.note_count > 0 {
            // Stable, so equally loud notes keep their pitch order
            notes.sort_by(Note::cmp_velocity_desc);
            notes.truncate(params.note_count);
        }
        notes
    }

    /// Resets the accumulated statistics, accumulates `spectrum` and returns the resulting notes.
    pub fn aggregate(
        &mut self,
        spectrum: &[SpectralBin],
        classifier: &mut PitchClassifier,
        note_table: &NoteTable,
        params: &AggregationParams,
    ) -> Result<Vec<Note>> {
        self.reset();
        self.accumulate(spectrum, classifier, note_table)?;
        Ok(self.collect(params))
    }
}
