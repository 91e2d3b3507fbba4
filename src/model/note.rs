//! Notes of a chart, stored in an arena.
//!
//! Long notes are a head and a tail referring to each other by [`NoteId`]. The reference only
//! lets a consumer walk from one end to the other, the arena owns both ends.

use super::LongNoteDef;

/// Sound index encoding of "no sound" at the model boundary.
pub const NO_SOUND_INDEX: i32 = -2;

/// Index of a note in a [`NoteArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteId(usize);

/// Variant of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteKind {
    /// A note hit once.
    Normal,
    /// Start of a long note.
    LongHead {
        /// The paired tail.
        tail: NoteId,
        /// How the long note is judged.
        ln_type: LongNoteDef,
    },
    /// End of a long note.
    LongTail {
        /// The paired head.
        head: NoteId,
        /// How the long note is judged.
        ln_type: LongNoteDef,
    },
}

/// A note placed on a timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    kind: NoteKind,
    wav: Option<usize>,
    /// Measure position of the timeline holding this note.
    pub section: f64,
    /// Time of the timeline holding this note, in microseconds.
    pub micro_time: i64,
}

impl Note {
    /// Creates a normal note with an optional sound, not placed yet.
    #[must_use]
    pub const fn normal(wav: Option<usize>) -> Self {
        Self {
            kind: NoteKind::Normal,
            wav,
            section: 0.0,
            micro_time: 0,
        }
    }

    /// Places the note at a measure position and a time in microseconds.
    #[must_use]
    pub const fn at(mut self, section: f64, micro_time: i64) -> Self {
        self.section = section;
        self.micro_time = micro_time;
        self
    }

    /// Variant of this note.
    #[must_use]
    pub const fn kind(&self) -> NoteKind {
        self.kind
    }

    /// Sound to play, `None` if the note has no sound of its own.
    #[must_use]
    pub const fn wav(&self) -> Option<usize> {
        self.wav
    }

    /// Sound index with [`NO_SOUND_INDEX`] for no sound, as BMS players expect it.
    #[must_use]
    pub fn wav_index(&self) -> i32 {
        self.wav
            .and_then(|wav| i32::try_from(wav).ok())
            .unwrap_or(NO_SOUND_INDEX)
    }

    /// Time in milliseconds.
    #[must_use]
    pub const fn milli_time(&self) -> i64 {
        self.micro_time / 1000
    }

    /// Whether this is either end of a long note.
    #[must_use]
    pub const fn is_long(&self) -> bool {
        !matches!(self.kind, NoteKind::Normal)
    }

    /// Whether this is the tail of a long note.
    #[must_use]
    pub const fn is_long_end(&self) -> bool {
        matches!(self.kind, NoteKind::LongTail { .. })
    }

    /// The other end of a long note.
    #[must_use]
    pub const fn pair(&self) -> Option<NoteId> {
        match self.kind {
            NoteKind::Normal => None,
            NoteKind::LongHead { tail, .. } => Some(tail),
            NoteKind::LongTail { head, .. } => Some(head),
        }
    }

    /// Long note type, `None` for a normal note.
    #[must_use]
    pub const fn ln_type(&self) -> Option<LongNoteDef> {
        match self.kind {
            NoteKind::Normal => None,
            NoteKind::LongHead { ln_type, .. } | NoteKind::LongTail { ln_type, .. } => {
                Some(ln_type)
            }
        }
    }
}

/// Owner of all notes of a chart.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteArena {
    notes: Vec<Note>,
}

impl NoteArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self { notes: Vec::new() }
    }

    /// Adds a note and returns its id.
    pub fn push(&mut self, note: Note) -> NoteId {
        let id = NoteId(self.notes.len());
        self.notes.push(note);
        id
    }

    /// Adds both ends of a long note, paired to each other, and returns `(head, tail)`.
    pub fn push_long_pair(
        &mut self,
        wav: Option<usize>,
        ln_type: LongNoteDef,
    ) -> (NoteId, NoteId) {
        let head = NoteId(self.notes.len());
        let tail = NoteId(head.0 + 1);
        let end = |kind: NoteKind| Note {
            kind,
            ..Note::normal(wav)
        };
        self.notes.push(end(NoteKind::LongHead { tail, ln_type }));
        self.notes.push(end(NoteKind::LongTail { head, ln_type }));
        (head, tail)
    }

    /// Gets a note.
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.0)
    }

    /// Gets a note mutably.
    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.get_mut(id.0)
    }

    /// The other end of a long note.
    #[must_use]
    pub fn pair_of(&self, id: NoteId) -> Option<NoteId> {
        self.get(id).and_then(Note::pair)
    }

    /// Iterates all notes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NoteId, &Note)> {
        self.notes
            .iter()
            .enumerate()
            .map(|(index, note)| (NoteId(index), note))
    }

    /// Number of notes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether there is no note.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pair_refers_both_ways() {
        let mut arena = NoteArena::new();
        arena.push(Note::normal(Some(0)));
        let (head, tail) = arena.push_long_pair(None, LongNoteDef::ChargeNote);

        assert_eq!(arena.pair_of(head), Some(tail));
        assert_eq!(arena.pair_of(tail), Some(head));
        let tail_note = arena.get(tail).expect("tail exists");
        assert!(tail_note.is_long_end());
        assert_eq!(tail_note.ln_type(), Some(LongNoteDef::ChargeNote));
        assert!(!arena.get(head).expect("head exists").is_long_end());
    }

    #[test]
    fn missing_sound_is_encoded_as_sentinel() {
        assert_eq!(Note::normal(None).wav_index(), NO_SOUND_INDEX);
        assert_eq!(Note::normal(Some(3)).wav_index(), 3);
    }
}
