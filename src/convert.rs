//! Conversion of osu!mania records into a [`BmsModel`].
//!
//! The conversion is a pure function of the [`Osu`] records:
//!
//! 1. the timing points are split into a [`TimingSeries`](timing::TimingSeries),
//! 2. producers visit a [`TimelineIndex`](timeline_index::TimelineIndex) in a fixed order: the
//!    music start, background videos, sound samples, tempo points, scroll points, measure lines
//!    and hit objects,
//! 3. the timelines are handed to [`BmsModel::new`].
//!
//! A producer visiting a millisecond already visited by an earlier producer overwrites its
//! tempo and scroll speed, so the order above is part of the output.
//!
//! Every time from the chart is shifted by [`ALIGNMENT_OFFSET_MS`] before use.

pub mod key_layout;
pub mod note_projector;
pub mod section_line;
pub mod timeline_index;
pub mod timing;

use thiserror::Error;

use crate::{
    decode::DecodeError,
    model::{BmsModel, ChartHeader, ChartIdentity, JudgeRankType, LongNoteDef, TotalType},
    osu::{EventKind, MANIA_MODE, Osu},
    util::StrExtension,
};

use self::{
    key_layout::KeyLayout, note_projector::NoteProjector, section_line::section_lines,
    timeline_index::TimelineIndex, timing::TimingSeries,
};

/// Milliseconds added to every time of an osu! chart to align it with BMS playback.
pub const ALIGNMENT_OFFSET_MS: i64 = 38;

const JUDGE_RANK: i32 = 3;

/// Options of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertConfig {
    /// Long note type given to hold notes.
    pub ln_type: LongNoteDef,
}

/// Why a chart cannot be converted at all.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnsupportedInput {
    /// The chart is for another game mode.
    #[error("game mode {mode} is not osu!mania")]
    NotMania {
        /// `[General] Mode` of the chart.
        mode: u8,
    },
    /// No lane layout exists for the key count.
    #[error("{key_count} keys are not supported")]
    UnsupportedKeyCount {
        /// Key count of the chart.
        key_count: u32,
    },
    /// `[TimingPoints]` is empty.
    #[error("no timing points")]
    NoTimingPoints,
    /// No timing point defines a tempo.
    #[error("no timing point defines a tempo")]
    NoTempoPoints,
    /// `[HitObjects]` is empty.
    #[error("no hit objects")]
    NoHitObjects,
}

/// A record skipped during conversion. The rest of the chart is still converted.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertWarning {
    /// An event lacks the parameter naming its file.
    #[error("{kind:?} event at {time} ms has no parameter #{index}")]
    MissingEventParameter {
        /// Kind of the event.
        kind: EventKind,
        /// Start time of the event, before the alignment offset.
        time: i64,
        /// Index of the missing parameter after the start time.
        index: usize,
    },
    /// A scroll-speed point whose beat length gives no finite multiplier, such as `0`.
    #[error("scroll-speed point at {time} ms has no finite multiplier")]
    InvalidScrollPoint {
        /// Time of the point, before the alignment offset.
        time: i64,
    },
    /// A hold note's tail time is missing or not a number.
    #[error("hold note at {time} ms has invalid tail time `{value}`")]
    InvalidHoldTail {
        /// Head time of the hold note, before the alignment offset.
        time: i64,
        /// The text found as the tail time.
        value: String,
    },
}

/// Failure of loading a chart.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The chart is not convertible.
    #[error("unsupported chart: {0}")]
    Unsupported(#[from] UnsupportedInput),
    /// The source could not be read.
    #[error("failed to read chart: {0}")]
    Decode(#[from] DecodeError),
}

/// Conversion results, includes the model and skipped records.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct OsuConvertOutput {
    /// The converted chart.
    pub model: BmsModel,
    /// Records skipped during conversion.
    pub warnings: Vec<ConvertWarning>,
}

/// Files referred by events, and where they start.
#[derive(Debug, Default)]
struct Resources {
    wav_files: Vec<String>,
    bga_files: Vec<String>,
    background: Option<String>,
    background_bga: Option<usize>,
    videos: Vec<i64>,
    samples: Vec<i64>,
}

impl Resources {
    fn collect(osu: &Osu, warnings: &mut Vec<ConvertWarning>) -> Self {
        let mut resources = Self {
            wav_files: vec![osu.general.audio_filename.unquote().to_string()],
            ..Self::default()
        };
        for event in &osu.events {
            let param_index = match event.kind {
                EventKind::Background | EventKind::Video => 0,
                EventKind::Sample => 1,
                EventKind::Other(_) => continue,
            };
            let Some(name) = event.params.get(param_index) else {
                log::debug!("skipped {:?} event at {} ms", event.kind, event.start_time);
                warnings.push(ConvertWarning::MissingEventParameter {
                    kind: event.kind.clone(),
                    time: event.start_time,
                    index: param_index,
                });
                continue;
            };
            let name = name.unquote().to_string();
            let time = event.start_time + ALIGNMENT_OFFSET_MS;
            match event.kind {
                EventKind::Background => resources.background = Some(name),
                EventKind::Video => {
                    resources.bga_files.push(name);
                    resources.videos.push(time);
                }
                EventKind::Sample => {
                    resources.wav_files.push(name);
                    resources.samples.push(time);
                }
                EventKind::Other(_) => {}
            }
        }
        if let Some(background) = &resources.background {
            resources.background_bga = Some(resources.bga_files.len());
            resources.bga_files.push(background.clone());
        }
        resources
    }
}

/// Converts osu!mania records into a chart.
///
/// Malformed events and hold notes are skipped and reported in
/// [`OsuConvertOutput::warnings`].
///
/// # Errors
///
/// Returns [`UnsupportedInput`] when the chart has no timing points or hit objects, is not for
/// osu!mania, has an unsupported key count, or has no tempo.
///
/// # Example
///
/// ```
/// use osu2bms::{
///     convert::{ConvertConfig, convert_osu},
///     model::{ChartIdentity, Mode},
///     osu::parse_osu,
/// };
///
/// let source = "\
/// [General]
/// Mode: 3
/// [Difficulty]
/// CircleSize:7
/// [TimingPoints]
/// 0,500,4,1,0,100,1,0
/// [HitObjects]
/// 36,192,1000,1,0,0:0:0:0:
/// ";
/// let osu = parse_osu(source).osu;
/// let identity = ChartIdentity {
///     md5: String::new(),
///     sha256: String::new(),
///     path: "chart.osu".into(),
/// };
/// let output = convert_osu(&osu, identity, ConvertConfig::default()).unwrap();
/// assert_eq!(output.model.mode(), Mode::Beat7K);
/// assert_eq!(output.model.total_notes(), 1);
/// ```
pub fn convert_osu(
    osu: &Osu,
    identity: ChartIdentity,
    config: ConvertConfig,
) -> Result<OsuConvertOutput, UnsupportedInput> {
    if osu.timing_points.is_empty() {
        return Err(UnsupportedInput::NoTimingPoints);
    }
    let Some(last_object) = osu.hit_objects.last() else {
        return Err(UnsupportedInput::NoHitObjects);
    };
    if osu.general.mode != MANIA_MODE {
        return Err(UnsupportedInput::NotMania {
            mode: osu.general.mode,
        });
    }
    let key_count = osu.difficulty.key_count();
    let layout = KeyLayout::for_key_count(key_count)
        .ok_or(UnsupportedInput::UnsupportedKeyCount { key_count })?;
    let mut warnings = vec![];
    let timing = TimingSeries::from_raw(&osu.timing_points, ALIGNMENT_OFFSET_MS, &mut warnings)?;
    let resources = Resources::collect(osu, &mut warnings);
    let mode = layout.mode();
    let mut index = TimelineIndex::new(&timing, mode.lane_count());

    log::trace!("placing music start and background events");
    index.add_bg_note(0, 0);
    index.touch(0).bga = resources.background_bga;
    for (bga, &time) in resources.videos.iter().enumerate() {
        index.touch(time).bga = Some(bga);
    }
    for (sample, &time) in resources.samples.iter().enumerate() {
        index.add_bg_note(time, sample + 1);
        index.touch(time);
    }

    log::trace!("placing tempo and scroll points");
    for point in timing.tempo_points() {
        let scroll = timing.scroll_at(point.time);
        let timeline = index.entry_at(point.time);
        timeline.bpm = point.bpm();
        timeline.scroll = scroll;
    }
    for point in timing.scroll_points() {
        let bpm = timing.bpm_at(point.time);
        let timeline = index.entry_at(point.time);
        timeline.scroll = point.multiplier;
        timeline.bpm = bpm;
    }

    log::trace!("placing measure lines");
    for line in section_lines(&timing, last_object.time + ALIGNMENT_OFFSET_MS) {
        let timeline = index.entry_at(line.time);
        timeline.section_line = true;
        timeline.section = line.section;
        timeline.bpm = line.bpm;
        timeline.scroll = line.scroll;
    }

    log::trace!("placing {} hit objects", osu.hit_objects.len());
    let projector = NoteProjector::new(layout, ALIGNMENT_OFFSET_MS);
    for object in &osu.hit_objects {
        match projector.project(object) {
            Ok(projected) => projector.place(projected, &mut index, config.ln_type),
            Err(warning) => {
                log::debug!("skipped hit object: {warning}");
                warnings.push(warning);
            }
        }
    }

    let Resources {
        wav_files,
        bga_files,
        background,
        ..
    } = resources;
    let background = background.unwrap_or_default();
    let header = ChartHeader {
        mode,
        title: osu.metadata.title.clone(),
        sub_title: format!("[{}]", osu.metadata.version),
        genre: format!("{key_count}K"),
        artist: osu.metadata.artist.clone(),
        sub_artist: osu.metadata.creator.clone(),
        banner: String::new(),
        stage_file: background.clone(),
        back_bmp: background,
        preview: osu.general.audio_filename.unquote().to_string(),
        bpm: timing.bpm_at(0),
        play_level: String::new(),
        judge_rank: JUDGE_RANK,
        judge_rank_type: JudgeRankType::BmsRank,
        total: 0.0,
        total_type: TotalType::Bms,
        ln_type: config.ln_type,
        wav_files,
        bga_files,
    };
    let (timelines, notes) = index.into_parts();
    log::debug!(
        "converted {} timelines and {} notes, {} records skipped",
        timelines.len(),
        notes.len(),
        warnings.len()
    );
    Ok(OsuConvertOutput {
        model: BmsModel::new(header, timelines, notes, identity).with_from_osu(),
        warnings,
    })
}
