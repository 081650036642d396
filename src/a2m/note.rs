use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

/// A detected note, analogous to a MIDI note on event.
///
/// Two notes are equal if they have the same pitch, regardless of velocity.
#[derive(Debug, Clone, Copy)]
pub struct Note {
    /// The MIDI note number in [0, 127], after transposition.
    pub pitch: u8,
    /// The note number before transposition.
    pub raw_pitch: u8,
    /// The intensity of the note in [0, 127].
    pub velocity: u8,
    /// The number of spectral bins that contributed to the note.
    pub count: usize,
}

impl Note {
    pub fn new(pitch: u8, raw_pitch: u8, velocity: u8, count: usize) -> Self {
        Note {
            pitch,
            raw_pitch,
            velocity,
            count,
        }
    }

    /// Orders louder notes first. Used for ranking.
    pub fn cmp_velocity_desc(&self, other: &Note) -> Ordering {
        other.velocity.cmp(&self.velocity)
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch == other.pitch
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pitch.hash(state);
    }
}
