//! Tempo and scroll-speed series rebuilt from raw timing points.
//!
//! The raw `[TimingPoints]` list mixes tempo definitions and scroll-speed overrides, and may hold
//! several points at one millisecond. [`TimingSeries`] splits it into two series keyed by
//! aligned millisecond, so that looking up the value active at some time is a range query, and
//! memoizes the measure position at each tempo point so that converting a time into a measure
//! position costs one lookup.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::osu::RawTimingPoint;

use super::{ConvertWarning, UnsupportedInput};

/// Scroll-speed multiplier active where no override applies.
pub const DEFAULT_SCROLL: f64 = 1.0;

/// Beats in a measure. The meter of timing points is not used for measure lines.
const BEATS_PER_MEASURE: f64 = 4.0;

/// A point on a time axis in aligned milliseconds.
pub trait TimedPoint {
    /// Time of the point.
    fn time(&self) -> i64;
}

/// A tempo change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoPoint {
    /// Aligned time in milliseconds.
    pub time: i64,
    /// Milliseconds per beat.
    pub beat_length: f64,
}

impl TempoPoint {
    /// Tempo in beats per minute.
    #[must_use]
    pub fn bpm(&self) -> f64 {
        60_000.0 / self.beat_length
    }

    /// Length of a measure in milliseconds.
    #[must_use]
    pub fn measure_length(&self) -> f64 {
        self.beat_length * BEATS_PER_MEASURE
    }

    /// Measures passed from this point to `time` at this tempo, negative if `time` is earlier.
    ///
    /// A non-positive beat length does not advance the measure position.
    #[must_use]
    pub fn measures_until(&self, time: i64) -> f64 {
        let measure_length = self.measure_length();
        if measure_length > 0.0 {
            (time - self.time) as f64 / measure_length
        } else {
            0.0
        }
    }
}

impl TimedPoint for TempoPoint {
    fn time(&self) -> i64 {
        self.time
    }
}

/// A scroll-speed change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollPoint {
    /// Aligned time in milliseconds.
    pub time: i64,
    /// Scroll-speed multiplier.
    pub multiplier: f64,
}

impl TimedPoint for ScrollPoint {
    fn time(&self) -> i64 {
        self.time
    }
}

/// Finds the point active at `time`: the one with the greatest time not exceeding `time`, or
/// the first one if `time` is before the whole series. `None` only for an empty series.
///
/// `series` must be sorted by time.
#[must_use]
pub fn active_point<P: TimedPoint>(series: &[P], time: i64) -> Option<&P> {
    let after = series.partition_point(|point| point.time() <= time);
    series.get(after.saturating_sub(1))
}

/// A tempo point with the measure position where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    point: TempoPoint,
    measure_start: f64,
}

/// Tempo and scroll-speed series of a chart, built once and read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSeries {
    tempo: BTreeMap<i64, TempoSegment>,
    scroll: BTreeMap<i64, ScrollPoint>,
}

impl TimingSeries {
    /// Builds the series from raw timing points, shifting every time by `offset` milliseconds.
    ///
    /// Each tempo point also starts a default scroll speed, unless the next raw point is at the
    /// same millisecond. A scroll override at the millisecond of the latest scroll point replaces
    /// it. Among tempo points at one millisecond the last one is kept. A scroll point without a
    /// finite multiplier is skipped and reported into `warnings`.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedInput::NoTempoPoints`] if no raw point defines a tempo.
    pub fn from_raw(
        points: &[RawTimingPoint],
        offset: i64,
        warnings: &mut Vec<ConvertWarning>,
    ) -> Result<Self, UnsupportedInput> {
        let aligned: Vec<(i64, &RawTimingPoint)> = points
            .iter()
            .map(|point| ((point.time + offset as f64) as i64, point))
            .sorted_by_key(|&(time, _)| time)
            .collect();

        let mut tempo_points: BTreeMap<i64, TempoPoint> = BTreeMap::new();
        let mut scroll: BTreeMap<i64, ScrollPoint> = BTreeMap::new();
        for (index, &(time, point)) in aligned.iter().enumerate() {
            if point.defines_tempo {
                tempo_points.insert(
                    time,
                    TempoPoint {
                        time,
                        beat_length: point.beat_length,
                    },
                );
                let overridden_next = aligned
                    .get(index + 1)
                    .is_some_and(|&(next_time, _)| next_time == time);
                if !overridden_next {
                    scroll.entry(time).or_insert(ScrollPoint {
                        time,
                        multiplier: DEFAULT_SCROLL,
                    });
                }
                continue;
            }
            let multiplier = 100.0 / -point.beat_length;
            if !multiplier.is_finite() {
                log::debug!("skipped scroll point at {time} ms");
                warnings.push(ConvertWarning::InvalidScrollPoint {
                    time: point.time as i64,
                });
                continue;
            }
            scroll.insert(time, ScrollPoint { time, multiplier });
        }

        let first = tempo_points
            .values()
            .next()
            .copied()
            .ok_or(UnsupportedInput::NoTempoPoints)?;
        let measure_starts = std::iter::once(0.0)
            .chain(
                tempo_points
                    .values()
                    .tuple_windows()
                    .scan(0.0, |measure, (current, next)| {
                        *measure += current.measures_until(next.time);
                        Some(*measure)
                    }),
            )
            .collect_vec();
        let tempo = tempo_points
            .into_values()
            .zip(measure_starts)
            .map(|(point, measure_start)| {
                (
                    point.time,
                    TempoSegment {
                        point,
                        measure_start,
                    },
                )
            })
            .collect();
        log::trace!(
            "timing series starts at {} ms with {} bpm",
            first.time,
            first.bpm()
        );
        Ok(Self { tempo, scroll })
    }

    fn active_segment(&self, time: i64) -> Option<&TempoSegment> {
        self.tempo
            .range(..=time)
            .next_back()
            .or_else(|| self.tempo.first_key_value())
            .map(|(_, segment)| segment)
    }

    /// Tempo point active at `time`.
    #[must_use]
    pub fn tempo_at(&self, time: i64) -> Option<&TempoPoint> {
        self.active_segment(time).map(|segment| &segment.point)
    }

    /// Tempo in beats per minute at `time`. The series is never empty.
    #[must_use]
    pub fn bpm_at(&self, time: i64) -> f64 {
        self.tempo_at(time).map_or(f64::NAN, TempoPoint::bpm)
    }

    /// Scroll-speed multiplier at `time`, [`DEFAULT_SCROLL`] if there is no scroll point.
    #[must_use]
    pub fn scroll_at(&self, time: i64) -> f64 {
        self.scroll
            .range(..=time)
            .next_back()
            .or_else(|| self.scroll.first_key_value())
            .map_or(DEFAULT_SCROLL, |(_, point)| point.multiplier)
    }

    /// Measure position of `time`, `0.0` at the first tempo point and negative before it.
    ///
    /// Every segment between tempo points advances the position by its length over the
    /// segment's measure length, so the position is continuous and piecewise linear.
    #[must_use]
    pub fn measure_position(&self, time: i64) -> f64 {
        self.active_segment(time).map_or(0.0, |segment| {
            segment.measure_start + segment.point.measures_until(time)
        })
    }

    /// Tempo points in ascending time.
    pub fn tempo_points(&self) -> impl Iterator<Item = &TempoPoint> + '_ {
        self.tempo.values().map(|segment| &segment.point)
    }

    /// Scroll points in ascending time.
    pub fn scroll_points(&self) -> impl Iterator<Item = &ScrollPoint> + '_ {
        self.scroll.values()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tempo(time: f64, beat_length: f64) -> RawTimingPoint {
        RawTimingPoint {
            time,
            beat_length,
            meter: 4,
            sample_set: 0,
            sample_index: 0,
            volume: 100,
            defines_tempo: true,
            effects: 0,
        }
    }

    fn scroll(time: f64, beat_length: f64) -> RawTimingPoint {
        RawTimingPoint {
            defines_tempo: false,
            ..tempo(time, beat_length)
        }
    }

    fn build(points: &[RawTimingPoint], offset: i64) -> Result<TimingSeries, UnsupportedInput> {
        TimingSeries::from_raw(points, offset, &mut vec![])
    }

    fn scroll_pairs(series: &TimingSeries) -> Vec<(i64, f64)> {
        series
            .scroll_points()
            .map(|point| (point.time, point.multiplier))
            .collect()
    }

    #[test]
    fn active_point_picks_last_applicable() {
        let series = [
            ScrollPoint {
                time: 100,
                multiplier: 1.0,
            },
            ScrollPoint {
                time: 200,
                multiplier: 2.0,
            },
            ScrollPoint {
                time: 300,
                multiplier: 3.0,
            },
        ];
        let at = |time| active_point(&series, time).map(|point| point.multiplier);
        assert_eq!(at(0), Some(1.0));
        assert_eq!(at(100), Some(1.0));
        assert_eq!(at(299), Some(2.0));
        assert_eq!(at(300), Some(3.0));
        assert_eq!(at(10_000), Some(3.0));
        assert_eq!(active_point::<ScrollPoint>(&[], 0), None);
    }

    #[test]
    fn default_scroll_follows_each_tempo_point() {
        let series = build(&[tempo(0.0, 500.0), tempo(1000.0, 250.0)], 38).expect("tempo");
        assert_eq!(scroll_pairs(&series), vec![(38, 1.0), (1038, 1.0)]);
        assert_eq!(series.bpm_at(38), 120.0);
        assert_eq!(series.bpm_at(1037), 120.0);
        assert_eq!(series.bpm_at(1038), 240.0);
    }

    #[test]
    fn scroll_override_at_tempo_time_replaces_default() {
        let series = build(
            &[tempo(0.0, 500.0), scroll(0.0, -50.0), scroll(500.0, -200.0)],
            0,
        )
        .expect("tempo");
        assert_eq!(scroll_pairs(&series), vec![(0, 2.0), (500, 0.5)]);
    }

    #[test]
    fn later_override_at_same_time_wins() {
        let series = build(
            &[tempo(0.0, 500.0), scroll(200.0, -50.0), scroll(200.0, -25.0)],
            0,
        )
        .expect("tempo");
        assert_eq!(series.scroll_at(200), 4.0);
        assert_eq!(series.scroll_at(199), 1.0);
        assert_eq!(scroll_pairs(&series).len(), 2);
    }

    #[test]
    fn explicit_override_survives_default_of_later_tempo_point() {
        let series = build(
            &[tempo(0.0, 500.0), scroll(1000.0, -50.0), tempo(1000.0, 400.0)],
            0,
        )
        .expect("tempo");
        assert_eq!(series.scroll_at(1000), 2.0);
        assert_eq!(series.bpm_at(1000), 150.0);
    }

    #[test]
    fn scroll_before_first_point_uses_first_point() {
        let series = build(&[tempo(500.0, 500.0), scroll(600.0, -50.0)], 0).expect("tempo");
        assert_eq!(series.scroll_at(0), 1.0);
        assert_eq!(series.bpm_at(0), 120.0);
    }

    #[test]
    fn measure_position_is_piecewise_linear() {
        let series = build(
            &[tempo(0.0, 500.0), tempo(4000.0, 250.0), tempo(5000.0, 500.0)],
            38,
        )
        .expect("tempo");
        assert_eq!(series.measure_position(38), 0.0);
        assert_eq!(series.measure_position(1038), 0.5);
        assert_eq!(series.measure_position(4038), 2.0);
        assert_eq!(series.measure_position(5038), 3.0);
        assert_eq!(series.measure_position(7038), 4.0);
        assert_eq!(series.measure_position(0), -0.019);

        let positions: Vec<f64> = (-1000..8000)
            .step_by(37)
            .map(|time| series.measure_position(time))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn zero_beat_length_freezes_measure_position() {
        let series = build(&[tempo(0.0, 500.0), tempo(2000.0, 0.0)], 0).expect("tempo");
        assert_eq!(series.measure_position(2000), 1.0);
        assert_eq!(series.measure_position(9000), 1.0);
    }

    #[test]
    fn later_tempo_point_at_same_time_wins() {
        let series = build(&[tempo(0.0, 500.0), tempo(0.0, 250.0)], 0).expect("tempo");
        assert_eq!(series.tempo_points().count(), 1);
        assert_eq!(series.bpm_at(0), 240.0);
        assert_eq!(scroll_pairs(&series), vec![(0, 1.0)]);
    }

    #[test]
    fn no_tempo_point_is_unsupported() {
        assert_eq!(
            build(&[scroll(0.0, -50.0)], 0),
            Err(UnsupportedInput::NoTempoPoints)
        );
    }

    #[test]
    fn scroll_point_without_multiplier_is_reported() {
        let mut warnings = vec![];
        let series = TimingSeries::from_raw(
            &[tempo(0.0, 500.0), scroll(1000.0, 0.0), scroll(2000.0, -50.0)],
            38,
            &mut warnings,
        )
        .expect("tempo");
        assert_eq!(scroll_pairs(&series), vec![(38, 1.0), (2038, 2.0)]);
        assert_eq!(warnings, vec![ConvertWarning::InvalidScrollPoint { time: 1000 }]);
    }
}
