use std::collections::HashMap;

use crate::common::NoteTable;
use crate::error::{ConfigurationError, Result};

/// The note number used for frequencies not covered by any note range.
pub const FALLBACK_PITCH: u8 = 127;

/// Returns the candidate closest to `value`. On a tie, the smaller candidate wins.
pub fn nearest_value(value: u8, candidates: &[u8]) -> Result<u8> {
    let mut nearest: Option<u8> = None;
    for candidate in candidates {
        let distance = (*candidate as i16 - value as i16).abs();
        nearest = match nearest {
            Some(current) => {
                let current_distance = (current as i16 - value as i16).abs();
                if distance < current_distance
                    || (distance == current_distance && *candidate < current)
                {
                    Some(*candidate)
                } else {
                    Some(current)
                }
            }
            None => Some(*candidate),
        };
    }
    nearest.ok_or_else(|| ConfigurationError::EmptyCandidateSet(value).into())
}

/// Moves the chroma of `pitch` to the nearest chroma in `pitch_set`, keeping
/// the octave. The result is clamped to [0, 127].
pub fn snap_to_key(pitch: u8, pitch_set: &[u8]) -> Result<u8> {
    let octave = pitch / 12;
    let chroma = nearest_value(pitch % 12, pitch_set)?;
    Ok(u8::min(12 * octave + chroma, 127))
}

/// Validates a pitch set, returning its distinct entries in ascending order.
pub fn normalize_pitch_set(pitch_set: &[u8]) -> Result<Vec<u8>> {
    if let Some(invalid) = pitch_set.iter().find(|chroma| **chroma > 11) {
        return Err(ConfigurationError::InvalidPitchClass(*invalid).into());
    }
    let mut normalized = pitch_set.to_vec();
    normalized.sort_unstable();
    normalized.dedup();
    Ok(normalized)
}

/// Maps frequencies to note numbers, optionally snapped to a set of allowed
/// chroma values. Results are cached per exact frequency value.
///
/// The cache is only valid for a fixed pitch set and set of bin frequencies,
/// so it must be invalidated whenever the sample rate or block size changes.
pub struct PitchClassifier {
    pitch_set: Vec<u8>,
    cache: HashMap<u32, u8>,
}

impl PitchClassifier {
    pub fn new(pitch_set: &[u8]) -> Result<Self> {
        Ok(PitchClassifier {
            pitch_set: normalize_pitch_set(pitch_set)?,
            cache: HashMap::new(),
        })
    }

    pub fn pitch_set(&self) -> &[u8] {
        &self.pitch_set
    }

    /// Replaces the pitch set, clearing the cache. The classifier is left
    /// untouched if `pitch_set` is invalid.
    pub fn set_pitch_set(&mut self, pitch_set: &[u8]) -> Result<()> {
        self.pitch_set = normalize_pitch_set(pitch_set)?;
        self.invalidate();
        Ok(())
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// The number of cached frequencies.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn try_get(&self, freq: f32) -> Option<u8> {
        self.cache.get(&freq.to_bits()).copied()
    }

    /// Returns the note number of `freq`.
    pub fn classify(&mut self, note_table: &NoteTable, freq: f32) -> Result<u8> {
        if let Some(pitch) = self.try_get(freq) {
            return Ok(pitch);
        }

        let pitch = match note_table.find(freq) {
            Some(pitch) if !self.pitch_set.is_empty() => snap_to_key(pitch, &self.pitch_set)?,
            Some(pitch) => pitch,
            None => FALLBACK_PITCH,
        };
        self.cache.insert(freq.to_bits(), pitch);
        Ok(pitch)
    }
}
