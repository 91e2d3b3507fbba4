//! The unified chart model consumed by BMS players.
//!
//! A [`BmsModel`] is a list of [`Timeline`]s in ascending time, each holding its tempo, scroll
//! speed, measure position and the notes placed there. Notes live in a [`NoteArena`] owned by
//! the model and are referred by [`NoteId`].

pub mod note;
pub mod timeline;

use std::path::PathBuf;

pub use self::{
    note::{Note, NoteArena, NoteId, NoteKind},
    timeline::Timeline,
};

/// Play mode, which decides the lane layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// 5 keys and a scratch.
    Beat5K,
    /// 7 keys and a scratch.
    Beat7K,
    /// 5 keys and a scratch for each side.
    Beat10K,
    /// 7 keys and a scratch for each side.
    Beat14K,
    /// 9 buttons.
    Popn9K,
}

impl Mode {
    /// Number of lanes, including scratches.
    #[must_use]
    pub const fn lane_count(self) -> usize {
        match self {
            Self::Beat5K => 6,
            Self::Beat7K => 8,
            Self::Beat10K => 12,
            Self::Beat14K => 16,
            Self::Popn9K => 9,
        }
    }

    /// Lanes of scratches.
    #[must_use]
    pub const fn scratch_lanes(self) -> &'static [usize] {
        match self {
            Self::Beat5K => &[5],
            Self::Beat7K => &[7],
            Self::Beat10K => &[5, 11],
            Self::Beat14K => &[7, 15],
            Self::Popn9K => &[],
        }
    }

    /// Whether the lane is a scratch.
    #[must_use]
    pub fn is_scratch_lane(self, lane: usize) -> bool {
        self.scratch_lanes().contains(&lane)
    }
}

/// How the judge rank value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JudgeRankType {
    /// `#RANK`.
    BmsRank,
}

/// How the total value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TotalType {
    /// `#TOTAL`.
    Bms,
}

/// Long note type given to hold notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LongNoteDef {
    /// The chart does not define it.
    Undefined,
    /// Judged only at the head.
    #[default]
    LongNote,
    /// Judged at both ends.
    ChargeNote,
    /// Judged at both ends and while holding.
    HellChargeNote,
}

/// Where a chart came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartInformation {
    /// Path of the chart file.
    pub path: PathBuf,
    /// Long note type requested when loading.
    pub ln_type: LongNoteDef,
}

/// Identity of a chart source: its digests and path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartIdentity {
    /// Lowercase hex MD5 of the source bytes.
    pub md5: String,
    /// Lowercase hex SHA-256 of the source bytes.
    pub sha256: String,
    /// Path of the chart file.
    pub path: PathBuf,
}

/// Header values of a chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartHeader {
    /// Play mode.
    pub mode: Mode,
    /// Title.
    pub title: String,
    /// Subtitle.
    pub sub_title: String,
    /// Genre.
    pub genre: String,
    /// Artist.
    pub artist: String,
    /// Sub artist.
    pub sub_artist: String,
    /// Banner image file.
    pub banner: String,
    /// Image shown while loading.
    pub stage_file: String,
    /// Background image file.
    pub back_bmp: String,
    /// Preview music file.
    pub preview: String,
    /// Initial BPM.
    pub bpm: f64,
    /// Play level.
    pub play_level: String,
    /// Judge rank.
    pub judge_rank: i32,
    /// How `judge_rank` is interpreted.
    pub judge_rank_type: JudgeRankType,
    /// Gauge total.
    pub total: f64,
    /// How `total` is interpreted.
    pub total_type: TotalType,
    /// Long note type.
    pub ln_type: LongNoteDef,
    /// Sound files, referred by note sound indices.
    pub wav_files: Vec<String>,
    /// BGA files, referred by [`Timeline::bga`].
    pub bga_files: Vec<String>,
}

/// A chart ready to be played.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BmsModel {
    /// Header values.
    pub header: ChartHeader,
    /// Lowercase hex MD5 of the source.
    pub md5: String,
    /// Lowercase hex SHA-256 of the source.
    pub sha256: String,
    /// Where this chart came from.
    pub info: ChartInformation,
    /// Whether this chart was converted from osu!.
    pub from_osu: bool,
    timelines: Vec<Timeline>,
    notes: NoteArena,
}

impl BmsModel {
    /// Builds a model from timelines sorted by ascending time and the notes they refer.
    #[must_use]
    pub fn new(
        header: ChartHeader,
        timelines: Vec<Timeline>,
        notes: NoteArena,
        identity: ChartIdentity,
    ) -> Self {
        debug_assert!(
            timelines.is_sorted_by(|earlier, later| earlier.micro_time() < later.micro_time()),
            "timelines must be sorted by strictly ascending time"
        );
        let ChartIdentity { md5, sha256, path } = identity;
        let info = ChartInformation {
            path,
            ln_type: header.ln_type,
        };
        Self {
            header,
            md5,
            sha256,
            info,
            from_osu: false,
            timelines,
            notes,
        }
    }

    /// Marks the model as converted from osu!.
    #[must_use]
    pub const fn with_from_osu(mut self) -> Self {
        self.from_osu = true;
        self
    }

    /// Play mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.header.mode
    }

    /// Timelines in ascending time.
    #[must_use]
    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    /// All notes.
    #[must_use]
    pub const fn notes(&self) -> &NoteArena {
        &self.notes
    }

    /// Gets a note.
    #[must_use]
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// The other end of a long note.
    #[must_use]
    pub fn pair_of(&self, id: NoteId) -> Option<NoteId> {
        self.notes.pair_of(id)
    }

    /// Notes on a lane in ascending time.
    pub fn lane_notes(&self, lane: usize) -> impl Iterator<Item = &Note> + '_ {
        self.timelines
            .iter()
            .filter_map(move |timeline| timeline.note(lane))
            .filter_map(|id| self.notes.get(id))
    }

    /// Number of notes to hit, counting a long note once.
    #[must_use]
    pub fn total_notes(&self) -> usize {
        self.timelines
            .iter()
            .flat_map(Timeline::notes)
            .filter_map(|(_, id)| self.notes.get(id))
            .filter(|note| !note.is_long_end())
            .count()
    }

    /// Lowest BPM of the chart.
    #[must_use]
    pub fn min_bpm(&self) -> f64 {
        self.timelines
            .iter()
            .map(|timeline| timeline.bpm)
            .fold(self.header.bpm, f64::min)
    }

    /// Highest BPM of the chart.
    #[must_use]
    pub fn max_bpm(&self) -> f64 {
        self.timelines
            .iter()
            .map(|timeline| timeline.bpm)
            .fold(self.header.bpm, f64::max)
    }

    /// Time of the last timeline having something to play or show, in milliseconds.
    #[must_use]
    pub fn last_time(&self) -> i64 {
        self.timelines
            .iter()
            .rev()
            .find(|timeline| {
                timeline.exist_note() || !timeline.bg_notes().is_empty() || timeline.bga.is_some()
            })
            .map_or(0, Timeline::milli_time)
    }
}
