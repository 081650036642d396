//! The 12 tone equal temperament note table used for classifying frequencies.

use lazy_static::lazy_static;

/// The number of entries in the note table, i.e the number of MIDI note numbers.
pub const NOTE_COUNT: usize = 128;

/// The frequency in Hz of note number 0, C at octave 0.
const C0_FREQUENCY: f64 = 8.1757989155;

/// The 12th root of 2, i.e the frequency ratio of one semitone.
const SEMITONE_RATIO: f64 = 1.0594630943592953;

/// The frequency range in Hz covered by a single note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRange {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl NoteRange {
    /// Returns true if `freq` lies within `[low, high]`.
    pub fn contains(&self, freq: f32) -> bool {
        self.low <= freq && freq <= self.high
    }
}

/// Note ranges for MIDI note numbers 0 to 127.
///
/// `mid` is the equal tempered frequency of the note. `low` is the mean of
/// `mid` and the `mid` of the note below. `high` is the mean of `mid` and
/// `mid` raised by one semitone, which is not exactly the `low` of the
/// next note. Neighbouring ranges may therefore overlap or leave small gaps.
#[derive(Debug, Clone)]
pub struct NoteTable {
    ranges: [NoteRange; NOTE_COUNT],
}

lazy_static! {
    static ref SHARED_NOTE_TABLE: NoteTable = NoteTable::generate();
}

impl NoteTable {
    /// Generates the note table.
    pub fn generate() -> Self {
        let mut ranges = [NoteRange {
            low: 0.,
            mid: 0.,
            high: 0.,
        }; NOTE_COUNT];

        // Accumulate in double precision to keep the error of the
        // repeated multiplication well below f32 resolution.
        let mut prev_mid = C0_FREQUENCY;
        // The low edge of note 0 has no note below it and is taken to be
        // the mean of C0 and C0 lowered by one semitone.
        let mut low = (C0_FREQUENCY + C0_FREQUENCY / SEMITONE_RATIO) / 2.0;
        for (index, range) in ranges.iter_mut().enumerate() {
            let mid = if index == 0 {
                C0_FREQUENCY
            } else {
                SEMITONE_RATIO * prev_mid
            };
            if index > 0 {
                low = (mid + prev_mid) / 2.0;
            }
            let high = (mid + SEMITONE_RATIO * mid) / 2.0;
            *range = NoteRange {
                low: low as f32,
                mid: mid as f32,
                high: high as f32,
            };
            prev_mid = mid;
        }

        NoteTable { ranges }
    }

    /// Returns a note table shared by all users. It is generated on first access.
    pub fn shared() -> &'static NoteTable {
        &SHARED_NOTE_TABLE
    }

    /// Returns the range of a given note number, if in [0, 127].
    pub fn get(&self, note_number: usize) -> Option<&NoteRange> {
        self.ranges.get(note_number)
    }

    /// The range of the lowest note.
    pub fn lowest(&self) -> &NoteRange {
        &self.ranges[0]
    }

    /// The range of the highest note.
    pub fn highest(&self) -> &NoteRange {
        &self.ranges[NOTE_COUNT - 1]
    }

    pub fn ranges(&self) -> &[NoteRange] {
        &self.ranges
    }

    /// Returns the lowest note number whose range contains `freq`.
    pub fn find(&self, freq: f32) -> Option<u8> {
        self.ranges
            .iter()
            .position(|range| range.contains(freq))
            .map(|index| index as u8)
    }
}
