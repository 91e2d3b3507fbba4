//! Measure lines of each tempo segment.

use itertools::Itertools;

use super::timing::{TempoPoint, TimingSeries};

/// Above this many measures in one tempo segment, only its boundaries get a measure line.
pub const MAX_SECTIONS_PER_SEGMENT: f64 = 10_000.0;

/// A measure line to mark on the timeline at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionLine {
    /// Aligned time in milliseconds.
    pub time: i64,
    /// Measure position.
    pub section: f64,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Scroll-speed multiplier.
    pub scroll: f64,
}

/// Generates measure lines for every tempo segment. The last segment ends at `end_time`.
///
/// Lines of a segment are spaced by its measure length, starting at the tempo point. A segment
/// of more than [`MAX_SECTIONS_PER_SEGMENT`] measures, which happens with a near-zero beat
/// length, gets two lines only: at its beginning and at its end, with the values looked up
/// from `timing`.
#[must_use]
pub fn section_lines(timing: &TimingSeries, end_time: i64) -> Vec<SectionLine> {
    let ends = timing
        .tempo_points()
        .skip(1)
        .map(|point| point.time)
        .chain(std::iter::once(end_time));
    timing
        .tempo_points()
        .zip(ends)
        .flat_map(|(point, end)| segment_lines(timing, point, end))
        .collect_vec()
}

fn segment_lines(timing: &TimingSeries, point: &TempoPoint, end: i64) -> Vec<SectionLine> {
    let begin = point.time;
    let measure_length = point.measure_length();
    let total_sections = (end - begin) as f64 / measure_length;
    if total_sections > MAX_SECTIONS_PER_SEGMENT {
        log::debug!(
            "tempo segment at {begin} ms spans {total_sections} measures, marking its bounds only"
        );
        return [begin, end]
            .into_iter()
            .map(|time| SectionLine {
                time,
                section: timing.measure_position(time),
                bpm: timing.bpm_at(time),
                scroll: timing.scroll_at(time),
            })
            .collect();
    }
    let begin_section = timing.measure_position(begin);
    let bpm = point.bpm();
    (0..=total_sections.trunc() as i64)
        .map(|section| {
            let time = begin + (section as f64 * measure_length) as i64;
            SectionLine {
                time,
                section: begin_section + section as f64,
                bpm,
                scroll: timing.scroll_at(time),
            }
        })
        .collect()
}
