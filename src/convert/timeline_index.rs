//! Millisecond-keyed timelines shared by all producers of a conversion.
//!
//! A timeline is created on the first reference to its millisecond, seeded with the measure
//! position, tempo and scroll speed looked up from the [`TimingSeries`]. Producers visiting the
//! same millisecond later overwrite those values, so the order producers run in decides what a
//! shared millisecond ends up with.

use std::collections::BTreeMap;

use crate::model::{LongNoteDef, Note, NoteArena, NoteId, Timeline};

use super::timing::TimingSeries;

/// Ordered timelines and the notes placed on them.
#[derive(Debug)]
pub struct TimelineIndex<'a> {
    timing: &'a TimingSeries,
    lanes: usize,
    timelines: BTreeMap<i64, Timeline>,
    notes: NoteArena,
}

impl<'a> TimelineIndex<'a> {
    /// Creates an empty index of timelines with `lanes` lanes.
    #[must_use]
    pub const fn new(timing: &'a TimingSeries, lanes: usize) -> Self {
        Self {
            timing,
            lanes,
            timelines: BTreeMap::new(),
            notes: NoteArena::new(),
        }
    }

    /// The timeline at `time` milliseconds, created if absent.
    pub fn entry_at(&mut self, time: i64) -> &mut Timeline {
        let timing = self.timing;
        let lanes = self.lanes;
        self.timelines.entry(time).or_insert_with(|| {
            Timeline::new(
                time * 1000,
                timing.measure_position(time),
                lanes,
                timing.bpm_at(time),
                timing.scroll_at(time),
            )
        })
    }

    /// The timeline at `time` milliseconds with its tempo and scroll speed looked up again.
    pub fn touch(&mut self, time: i64) -> &mut Timeline {
        let bpm = self.timing.bpm_at(time);
        let scroll = self.timing.scroll_at(time);
        let timeline = self.entry_at(time);
        timeline.bpm = bpm;
        timeline.scroll = scroll;
        timeline
    }

    /// The timeline at `time` milliseconds if it exists.
    #[must_use]
    pub fn get(&self, time: i64) -> Option<&Timeline> {
        self.timelines.get(&time)
    }

    /// Notes placed so far.
    #[must_use]
    pub const fn notes(&self) -> &NoteArena {
        &self.notes
    }

    /// Adds a background note playing `wav` at `time`.
    pub fn add_bg_note(&mut self, time: i64, wav: usize) -> NoteId {
        let timeline = self.entry_at(time);
        let note = Note::normal(Some(wav)).at(timeline.section, timeline.micro_time());
        let id = self.notes.push(note);
        self.entry_at(time).add_bg_note(id);
        id
    }

    /// Places a normal note without sound on `lane` at `time`, refreshing the timeline's tempo
    /// and scroll speed. `None` if the lane does not exist.
    pub fn place_note(&mut self, time: i64, lane: usize) -> Option<NoteId> {
        if lane >= self.lanes {
            return None;
        }
        let timeline = self.touch(time);
        let note = Note::normal(None).at(timeline.section, timeline.micro_time());
        let id = self.notes.push(note);
        self.entry_at(time).set_note(lane, id);
        Some(id)
    }

    /// Places a long note without sound on `lane` from `head_time` to `tail_time`, refreshing
    /// both timelines. Returns `(head, tail)`, `None` if the lane does not exist.
    pub fn place_long_note(
        &mut self,
        head_time: i64,
        tail_time: i64,
        lane: usize,
        ln_type: LongNoteDef,
    ) -> Option<(NoteId, NoteId)> {
        if lane >= self.lanes {
            return None;
        }
        let (head, tail) = self.notes.push_long_pair(None, ln_type);
        for (time, id) in [(head_time, head), (tail_time, tail)] {
            let timeline = self.touch(time);
            timeline.set_note(lane, id);
            let (section, micro_time) = (timeline.section, timeline.micro_time());
            if let Some(note) = self.notes.get_mut(id) {
                note.section = section;
                note.micro_time = micro_time;
            }
        }
        Some((head, tail))
    }

    /// Timelines in ascending time.
    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> + '_ {
        self.timelines.values()
    }

    /// Number of timelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// Whether there is no timeline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Gives up the timelines in ascending time and the notes.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Timeline>, NoteArena) {
        (self.timelines.into_values().collect(), self.notes)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::osu::RawTimingPoint;

    fn series() -> TimingSeries {
        let point = |time, beat_length, defines_tempo| RawTimingPoint {
            time,
            beat_length,
            meter: 4,
            sample_set: 0,
            sample_index: 0,
            volume: 100,
            defines_tempo,
            effects: 0,
        };
        TimingSeries::from_raw(
            &[
                point(0.0, 500.0, true),
                point(1000.0, -50.0, false),
                point(2000.0, 250.0, true),
            ],
            0,
            &mut vec![],
        )
        .expect("tempo")
    }

    #[test]
    fn entry_is_seeded_from_timing() {
        let timing = series();
        let mut index = TimelineIndex::new(&timing, 8);
        let timeline = index.entry_at(1500);
        assert_eq!(timeline.micro_time(), 1_500_000);
        assert_eq!(timeline.section, 0.75);
        assert_eq!(timeline.bpm, 120.0);
        assert_eq!(timeline.scroll, 2.0);
        assert_eq!(timeline.lane_count(), 8);
        assert!(!timeline.section_line);
    }

    #[test]
    fn later_writer_wins_on_shared_millisecond() {
        let timing = series();
        let mut index = TimelineIndex::new(&timing, 8);
        index.entry_at(2000).bpm = 999.0;
        index.entry_at(2000).scroll = 9.0;
        assert_eq!(index.get(2000).map(|timeline| timeline.bpm), Some(999.0));

        index.place_note(2000, 3);
        let timeline = index.get(2000).expect("timeline exists");
        assert_eq!(timeline.bpm, 240.0);
        assert_eq!(timeline.scroll, 1.0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn long_note_spans_two_timelines() {
        let timing = series();
        let mut index = TimelineIndex::new(&timing, 8);
        let (head, tail) = index
            .place_long_note(1000, 2000, 2, LongNoteDef::LongNote)
            .expect("lane exists");
        assert_eq!(index.get(1000).and_then(|timeline| timeline.note(2)), Some(head));
        assert_eq!(index.get(2000).and_then(|timeline| timeline.note(2)), Some(tail));
        assert_eq!(index.notes().pair_of(head), Some(tail));
        assert_eq!(
            index.notes().get(tail).map(|note| note.micro_time),
            Some(2_000_000)
        );
        assert_eq!(index.notes().get(tail).map(|note| note.section), Some(1.0));
    }

    #[test]
    fn missing_lane_is_rejected() {
        let timing = series();
        let mut index = TimelineIndex::new(&timing, 4);
        assert_eq!(index.place_long_note(0, 100, 4, LongNoteDef::LongNote), None);
        assert!(index.notes().is_empty());
        assert_eq!(index.place_note(0, 4), None);
    }

    #[test]
    fn parts_are_in_ascending_time() {
        let timing = series();
        let mut index = TimelineIndex::new(&timing, 1);
        for time in [300, -20, 1000, 0] {
            index.add_bg_note(time, 0);
        }
        let (timelines, notes) = index.into_parts();
        let times: Vec<i64> = timelines.iter().map(Timeline::milli_time).collect();
        assert_eq!(times, vec![-20, 0, 300, 1000]);
        assert_eq!(notes.len(), 4);
    }
}
