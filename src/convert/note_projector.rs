//! Projection of hit objects onto lanes and timelines.

use crate::{
    model::LongNoteDef,
    osu::{HitObject, parse::integer},
};

use super::{ConvertWarning, key_layout::KeyLayout, timeline_index::TimelineIndex};

/// Where a hit object lands, in aligned milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectedNote {
    /// The object is a placeholder with a negative time.
    Skipped,
    /// A note hit once, including a hold whose tail is not after its head.
    Normal {
        /// Lane of the note.
        lane: usize,
        /// Time of the note.
        time: i64,
    },
    /// A hold note.
    Long {
        /// Lane of both ends.
        lane: usize,
        /// Time of the head.
        head: i64,
        /// Time of the tail, after the head.
        tail: i64,
    },
}

/// Projects hit objects of one key count.
#[derive(Debug, Clone, Copy)]
pub struct NoteProjector {
    layout: KeyLayout,
    offset: i64,
}

impl NoteProjector {
    /// Creates a projector shifting times by `offset` milliseconds.
    #[must_use]
    pub const fn new(layout: KeyLayout, offset: i64) -> Self {
        Self { layout, offset }
    }

    /// Projects a hit object.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertWarning::InvalidHoldTail`] for a hold note whose tail time is missing or
    /// not a number. The object should be skipped.
    pub fn project(&self, object: &HitObject) -> Result<ProjectedNote, ConvertWarning> {
        if object.time < 0 {
            log::debug!("skipped hit object at negative time {} ms", object.time);
            return Ok(ProjectedNote::Skipped);
        }
        let time = object.time + self.offset;
        let Some(lane) = self.layout.lane_for_x(object.x) else {
            log::debug!("skipped hit object at x {} with no lane", object.x);
            return Ok(ProjectedNote::Skipped);
        };
        if !object.is_hold() {
            return Ok(ProjectedNote::Normal { lane, time });
        }
        let invalid_tail = |value: &str| ConvertWarning::InvalidHoldTail {
            time: object.time,
            value: value.to_string(),
        };
        let tail_text = object.hold_tail_time().ok_or_else(|| invalid_tail(""))?;
        let tail = integer("hold tail time", tail_text).map_err(|_| invalid_tail(tail_text))?
            + self.offset;
        if tail <= time {
            return Ok(ProjectedNote::Normal { lane, time });
        }
        Ok(ProjectedNote::Long {
            lane,
            head: time,
            tail,
        })
    }

    /// Places a projected note on the timelines. Long notes get `ln_type` on both ends.
    pub fn place(
        &self,
        projected: ProjectedNote,
        index: &mut TimelineIndex<'_>,
        ln_type: LongNoteDef,
    ) {
        let placed = match projected {
            ProjectedNote::Skipped => return,
            ProjectedNote::Normal { lane, time } => index.place_note(time, lane).is_some(),
            ProjectedNote::Long { lane, head, tail } => {
                index.place_long_note(head, tail, lane, ln_type).is_some()
            }
        };
        if !placed {
            log::debug!(
                "{:?} does not fit {} lanes of {} keys",
                projected,
                self.layout.mode().lane_count(),
                self.layout.key_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn object(x: i32, time: i64, tail: Option<&str>) -> HitObject {
        let mut params: Vec<String> = tail.into_iter().map(ToString::to_string).collect();
        params.push("0:0:0:0:".to_string());
        HitObject {
            x,
            y: 192,
            time,
            type_flags: if tail.is_some() { 0x80 } else { 1 },
            hit_sound: 0,
            object_params: params,
        }
    }

    fn projector(key_count: u32) -> NoteProjector {
        NoteProjector::new(KeyLayout::for_key_count(key_count).expect("supported"), 38)
    }

    #[test]
    fn hold_note_is_shifted() {
        assert_eq!(
            projector(7).project(&object(36, 1000, Some("2000"))),
            Ok(ProjectedNote::Long {
                lane: 0,
                head: 1038,
                tail: 2038,
            })
        );
    }

    #[test]
    fn degenerate_hold_becomes_normal() {
        for tail in ["1000", "999", "0"] {
            assert_eq!(
                projector(7).project(&object(36, 1000, Some(tail))),
                Ok(ProjectedNote::Normal {
                    lane: 0,
                    time: 1038,
                }),
                "tail {tail}"
            );
        }
    }

    #[test]
    fn negative_time_is_skipped() {
        assert_eq!(
            projector(4).project(&object(0, -1, None)),
            Ok(ProjectedNote::Skipped)
        );
        assert_eq!(
            projector(4).project(&object(0, 0, None)),
            Ok(ProjectedNote::Normal { lane: 0, time: 38 })
        );
    }

    #[test]
    fn unreadable_tail_is_reported() {
        assert_eq!(
            projector(8).project(&object(0, 500, Some("later"))),
            Err(ConvertWarning::InvalidHoldTail {
                time: 500,
                value: "later".to_string(),
            })
        );
    }

    #[test]
    fn columns_follow_remap_table() {
        let lanes: Vec<ProjectedNote> = [0, 100, 200, 300, 400, 511]
            .into_iter()
            .map(|x| projector(6).project(&object(x, 0, None)).expect("normal note"))
            .collect();
        let lanes: Vec<usize> = lanes
            .into_iter()
            .filter_map(|note| match note {
                ProjectedNote::Normal { lane, .. } => Some(lane),
                _ => None,
            })
            .collect();
        assert_eq!(lanes, vec![0, 1, 2, 4, 5, 6]);
    }
}
