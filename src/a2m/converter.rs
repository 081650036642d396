use std::sync::{Mutex, MutexGuard, PoisonError};

use log::Level;

use crate::a2m::aggregator::{AggregationParams, NoteAggregator};
use crate::a2m::classifier::{normalize_pitch_set, PitchClassifier};
use crate::a2m::note::Note;
use crate::a2m::options::{clamp_transpose, clamp_unit, velocity_limit, ConverterOptions};
use crate::a2m::spectrum::SpectralAnalyzer;
use crate::common::NoteTable;
use crate::error::{ConfigurationError, Result};

type Logger = Box<dyn Fn(&str) + Send>;

/// Everything guarded by the converter lock. Methods on this type never lock.
struct ConverterState {
    options: ConverterOptions,
    velocity_limit: u8,
    note_table: &'static NoteTable,
    analyzer: SpectralAnalyzer,
    classifier: PitchClassifier,
    aggregator: NoteAggregator,
    logger: Option<Logger>,
}

/// Converts blocks of audio samples into notes by mapping the magnitude
/// spectrum of each block onto the 12 tone equal temperament scale.
///
/// All methods take `&self` and serialize on an internal lock, so a converter
/// can be shared between an audio thread calling [`convert`](Converter::convert)
/// and a control thread changing parameters.
pub struct Converter {
    state: Mutex<ConverterState>,
}

impl Converter {
    /// Creates a converter with default parameters.
    pub fn new(samplerate: u32, block_size: usize) -> Result<Self> {
        Converter::from_options(ConverterOptions::new(samplerate, block_size))
    }

    pub fn from_options(options: ConverterOptions) -> Result<Self> {
        let note_table = NoteTable::shared();
        let pitch_range = validate_pitch_range(options.pitch_range)?;
        let analyzer = SpectralAnalyzer::new(options.samplerate, options.block_size, note_table)?;
        let classifier = PitchClassifier::new(&options.pitch_set)?;
        let activation_level = clamp_unit(options.activation_level);

        let state = ConverterState {
            options: ConverterOptions {
                activation_level,
                pitch_set: classifier.pitch_set().to_vec(),
                pitch_range,
                transpose: clamp_transpose(options.transpose),
                ceiling: clamp_unit(options.ceiling),
                ..options
            },
            velocity_limit: velocity_limit(activation_level),
            note_table,
            analyzer,
            classifier,
            aggregator: NoteAggregator::new(),
            logger: None,
        };
        state.log_ranges();

        Ok(Converter {
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ConverterState> {
        // State is only ever replaced wholesale, so it is consistent even
        // if another thread panicked while holding the lock.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Converts a block of exactly `block_size` samples into notes.
    ///
    /// Notes are returned in pitch order, or loudest first if a note count is set.
    pub fn convert(&self, samples: &[f32]) -> Result<Vec<Note>> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let params = state.aggregation_params();
        let spectrum = state.analyzer.analyze(samples)?;
        state
            .aggregator
            .aggregate(spectrum, &mut state.classifier, state.note_table, &params)
    }

    /// Sets a sink receiving diagnostic messages. Messages are also emitted
    /// through the `log` crate. The sink is called with the converter locked
    /// and must not call back into the converter.
    pub fn set_logger<F>(&self, logger: F)
    where
        F: Fn(&str) + Send + 'static,
    {
        self.lock().logger = Some(Box::new(logger));
    }

    /// Sets the sample rate in Hz. On error, the converter is left unchanged.
    pub fn set_samplerate(&self, samplerate: u32) -> Result<()> {
        let mut state = self.lock();
        if state.options.samplerate == samplerate {
            return Ok(());
        }
        let block_size = state.options.block_size;
        state.reconfigure(samplerate, block_size)
    }

    /// Sets the number of samples per block. On error, the converter is left unchanged.
    pub fn set_block_size(&self, block_size: usize) -> Result<()> {
        let mut state = self.lock();
        if state.options.block_size == block_size {
            return Ok(());
        }
        let samplerate = state.options.samplerate;
        state.reconfigure(samplerate, block_size)
    }

    /// Sets the activation level, clamped to [0, 1].
    pub fn set_activation_level(&self, activation_level: f32) {
        let mut state = self.lock();
        let clamped = clamp_unit(activation_level);
        if clamped != activation_level {
            state.log(
                Level::Warn,
                &format!(
                    "Activation level {} clamped to {}",
                    activation_level, clamped
                ),
            );
        }
        state.options.activation_level = clamped;
        state.velocity_limit = velocity_limit(clamped);
    }

    /// Sets the chroma values in [0, 11] that notes are snapped to. An empty set disables snapping.
    pub fn set_pitch_set(&self, pitch_set: &[u8]) -> Result<()> {
        let mut state = self.lock();
        let normalized = normalize_pitch_set(pitch_set)?;
        if normalized == state.options.pitch_set {
            return Ok(());
        }
        state.classifier.set_pitch_set(&normalized)?;
        state.options.pitch_set = normalized;
        state.log(Level::Debug, "Pitch set changed, cleared pitch cache");
        Ok(())
    }

    /// Sets the inclusive range of reported note numbers. Values above 127 are clamped.
    pub fn set_pitch_range(&self, pitch_range: [u8; 2]) -> Result<()> {
        let validated = validate_pitch_range(pitch_range)?;
        self.lock().options.pitch_range = validated;
        Ok(())
    }

    /// Sets the maximum number of notes per block. 0 means no limit.
    pub fn set_note_count(&self, note_count: usize) {
        self.lock().options.note_count = note_count;
    }

    /// Sets the transposition in semitones, clamped to [-127, 127].
    pub fn set_transpose(&self, transpose: i32) {
        let mut state = self.lock();
        let clamped = clamp_transpose(transpose);
        if clamped != transpose {
            state.log(
                Level::Warn,
                &format!("Transpose {} clamped to {}", transpose, clamped),
            );
        }
        state.options.transpose = clamped;
    }

    /// Sets the amplitude ceiling, clamped to [0, 1].
    pub fn set_ceiling(&self, ceiling: f32) {
        let mut state = self.lock();
        let clamped = clamp_unit(ceiling);
        if clamped != ceiling {
            state.log(
                Level::Warn,
                &format!("Ceiling {} clamped to {}", ceiling, clamped),
            );
        }
        state.options.ceiling = clamped;
    }

    /// Returns a snapshot of the current parameters.
    pub fn options(&self) -> ConverterOptions {
        self.lock().options.clone()
    }

    pub fn samplerate(&self) -> u32 {
        self.lock().options.samplerate
    }

    pub fn block_size(&self) -> usize {
        self.lock().options.block_size
    }

    pub fn activation_level(&self) -> f32 {
        self.lock().options.activation_level
    }

    /// The velocity a note must exceed to be reported, derived from the activation level.
    pub fn velocity_limit(&self) -> u8 {
        self.lock().velocity_limit
    }

    pub fn pitch_set(&self) -> Vec<u8> {
        self.lock().options.pitch_set.clone()
    }

    pub fn pitch_range(&self) -> [u8; 2] {
        self.lock().options.pitch_range
    }

    pub fn note_count(&self) -> usize {
        self.lock().options.note_count
    }

    pub fn transpose(&self) -> i32 {
        self.lock().options.transpose
    }

    pub fn ceiling(&self) -> f32 {
        self.lock().options.ceiling
    }

    /// The analyzed frequency range in Hz.
    pub fn frequency_range(&self) -> (f32, f32) {
        let state = self.lock();
        (state.analyzer.min_freq(), state.analyzer.max_freq())
    }
}

impl ConverterState {
    fn aggregation_params(&self) -> AggregationParams {
        AggregationParams {
            transpose: self.options.transpose,
            pitch_range: self.options.pitch_range,
            velocity_limit: self.velocity_limit,
            ceiling: self.options.ceiling,
            note_count: self.options.note_count,
            bin_count: self.analyzer.bin_count(),
        }
    }

    /// Replaces the analyzer and invalidates cached pitches. The new analyzer
    /// is fully built before anything is modified.
    fn reconfigure(&mut self, samplerate: u32, block_size: usize) -> Result<()> {
        let analyzer = match SpectralAnalyzer::new(samplerate, block_size, self.note_table) {
            Ok(analyzer) => analyzer,
            Err(err) => {
                self.log(
                    Level::Warn,
                    &format!(
                        "Rejected samplerate {} Hz, block size {}: {}",
                        samplerate, block_size, err
                    ),
                );
                return Err(err);
            }
        };
        self.analyzer = analyzer;
        self.options.samplerate = samplerate;
        self.options.block_size = block_size;
        self.classifier.invalidate();
        self.log_ranges();
        Ok(())
    }

    fn log_ranges(&self) {
        let analyzer = &self.analyzer;
        self.log(
            Level::Debug,
            &format!(
                "{} Hz, block size {}: analyzing {:.1}-{:.1} Hz (bins {}..{})",
                analyzer.samplerate(),
                analyzer.block_size(),
                analyzer.min_freq(),
                analyzer.max_freq(),
                analyzer.min_bin(),
                analyzer.max_bin()
            ),
        );
    }

    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
        if let Some(logger) = &self.logger {
            logger(message);
        }
    }
}

fn validate_pitch_range(pitch_range: [u8; 2]) -> Result<[u8; 2]> {
    let low = pitch_range[0].min(127);
    let high = pitch_range[1].min(127);
    if low > high {
        return Err(ConfigurationError::InvalidPitchRange { low, high }.into());
    }
    Ok([low, high])
}
