//! A point of time in a chart.

use super::note::NoteId;

/// All events of a chart at one millisecond.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    micro_time: i64,
    /// Measure position.
    pub section: f64,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Scroll-speed multiplier.
    pub scroll: f64,
    /// Whether a measure line is drawn here.
    pub section_line: bool,
    /// Index into the chart's BGA files to show from here.
    pub bga: Option<usize>,
    bg_notes: Vec<NoteId>,
    notes: Vec<Option<NoteId>>,
}

impl Timeline {
    /// Creates a timeline with `lanes` empty lanes.
    #[must_use]
    pub fn new(micro_time: i64, section: f64, lanes: usize, bpm: f64, scroll: f64) -> Self {
        Self {
            micro_time,
            section,
            bpm,
            scroll,
            section_line: false,
            bga: None,
            bg_notes: Vec::new(),
            notes: vec![None; lanes],
        }
    }

    /// Time in microseconds.
    #[must_use]
    pub const fn micro_time(&self) -> i64 {
        self.micro_time
    }

    /// Time in milliseconds.
    #[must_use]
    pub const fn milli_time(&self) -> i64 {
        self.micro_time / 1000
    }

    /// Number of lanes.
    #[must_use]
    pub const fn lane_count(&self) -> usize {
        self.notes.len()
    }

    /// Note on a lane.
    #[must_use]
    pub fn note(&self, lane: usize) -> Option<NoteId> {
        self.notes.get(lane).copied().flatten()
    }

    /// Notes on lanes with their lane index.
    pub fn notes(&self) -> impl Iterator<Item = (usize, NoteId)> + '_ {
        self.notes
            .iter()
            .enumerate()
            .filter_map(|(lane, note)| note.map(|note| (lane, note)))
    }

    /// Whether any lane has a note.
    #[must_use]
    pub fn exist_note(&self) -> bool {
        self.notes.iter().any(Option::is_some)
    }

    /// Background notes in the order they were added.
    #[must_use]
    pub fn bg_notes(&self) -> &[NoteId] {
        &self.bg_notes
    }

    /// Puts a note on a lane, replacing the previous one. Returns `false` if there is no such lane.
    pub(crate) fn set_note(&mut self, lane: usize, note: NoteId) -> bool {
        self.notes
            .get_mut(lane)
            .map(|slot| *slot = Some(note))
            .is_some()
    }

    pub(crate) fn add_bg_note(&mut self, note: NoteId) {
        self.bg_notes.push(note);
    }
}
