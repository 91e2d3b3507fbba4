//! The [osu! file format](https://osu.ppy.sh/wiki/en/Client/File_formats/osu_%28file_format%29) records used by the converter.
//!
//! Raw [`str`] == [`lex`] ==> [`Token`](lex::Token) stream == [`parse`] ==> [`Osu`] (in [`OsuParseOutput`]).
//!
//! Only the sections needed to build a mania chart are interpreted: `[General]`, `[Metadata]`,
//! `[Difficulty]`, `[Events]`, `[TimingPoints]` and `[HitObjects]`. Other known sections are
//! skipped silently. A malformed line never stops parsing, it is skipped and reported as an
//! [`OsuParseWarning`] holding the byte span of the line.

pub mod lex;
pub mod parse;

use thiserror::Error;

use crate::mixin::SourceRangeMixin;

/// The game mode number of osu!mania in `[General] Mode`.
pub const MANIA_MODE: u8 = 3;

/// Type flag bit of a mania hold note.
pub const HOLD_NOTE_FLAG: u32 = 0x80;

/// Top-level object of an `.osu` file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Osu {
    /// Version from the `osu file format vNN` header line, if present.
    pub format_version: Option<u32>,
    /// `[General]` section.
    pub general: General,
    /// `[Metadata]` section.
    pub metadata: Metadata,
    /// `[Difficulty]` section.
    pub difficulty: Difficulty,
    /// `[Events]` section, in file order.
    pub events: Vec<Event>,
    /// `[TimingPoints]` section, in file order.
    pub timing_points: Vec<RawTimingPoint>,
    /// `[HitObjects]` section, in file order.
    pub hit_objects: Vec<HitObject>,
}

/// `[General]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct General {
    /// Audio file name, relative to the chart folder.
    pub audio_filename: String,
    /// Game mode: 0 = osu!, 1 = taiko, 2 = catch, 3 = mania.
    pub mode: u8,
}

/// `[Metadata]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Romanised song title.
    pub title: String,
    /// Song title in its original script.
    pub title_unicode: Option<String>,
    /// Romanised artist.
    pub artist: String,
    /// Artist in its original script.
    pub artist_unicode: Option<String>,
    /// Beatmap creator.
    pub creator: String,
    /// Difficulty name.
    pub version: String,
}

/// `[Difficulty]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Difficulty {
    /// `CircleSize`, which is the key count in mania.
    pub circle_size: f64,
}

impl Difficulty {
    /// Key count of a mania chart, the integral part of `CircleSize`.
    #[must_use]
    pub fn key_count(&self) -> u32 {
        self.circle_size as u32
    }
}

/// Kind of an `[Events]` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// `0`: background image.
    Background,
    /// `1` or `Video`: background video.
    Video,
    /// `5` or `Sample`: storyboard sound sample.
    Sample,
    /// Any other event type such as breaks or storyboard sprites.
    Other(String),
}

impl EventKind {
    /// Reads the event type discriminant.
    #[must_use]
    pub fn from_discriminant(value: &str) -> Self {
        match value {
            "0" => Self::Background,
            "1" | "Video" => Self::Video,
            "5" | "Sample" => Self::Sample,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A line of the `[Events]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Event type.
    pub kind: EventKind,
    /// Start time in milliseconds, before the alignment offset.
    pub start_time: i64,
    /// Remaining comma separated parameters, unparsed.
    pub params: Vec<String>,
}

/// A line of the `[TimingPoints]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTimingPoint {
    /// Start time in milliseconds, before the alignment offset.
    pub time: f64,
    /// Milliseconds per beat for tempo points. For other points, a negative inverse
    /// scroll-speed multiplier as a percentage.
    pub beat_length: f64,
    /// Beats in a measure.
    pub meter: u32,
    /// Default sample set of hit objects.
    pub sample_set: u32,
    /// Custom sample index of hit objects.
    pub sample_index: u32,
    /// Volume percentage of hit objects.
    pub volume: u32,
    /// Whether this point defines tempo (an "uninherited" point).
    pub defines_tempo: bool,
    /// Bit flags of extra effects.
    pub effects: u32,
}

/// A line of the `[HitObjects]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitObject {
    /// Horizontal position in osu! pixels, `0..512`. Selects the column in mania.
    pub x: i32,
    /// Vertical position in osu! pixels. Unused in mania.
    pub y: i32,
    /// Time in milliseconds, before the alignment offset.
    pub time: i64,
    /// Bit flags of the object type.
    pub type_flags: u32,
    /// Bit flags of the hitsound.
    pub hit_sound: u32,
    /// Extra parameters. For hold notes the first one is the tail time, split off from the
    /// hit sample with `:`.
    pub object_params: Vec<String>,
}

impl HitObject {
    /// Whether this object is a mania hold note.
    #[must_use]
    pub const fn is_hold(&self) -> bool {
        self.type_flags & HOLD_NOTE_FLAG != 0
    }

    /// Unparsed tail time of a hold note.
    #[must_use]
    pub fn hold_tail_time(&self) -> Option<&str> {
        self.is_hold()
            .then(|| self.object_params.first())
            .flatten()
            .map(String::as_str)
    }
}

/// A problem found in a line of an `.osu` file. The line is skipped.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OsuParseWarning {
    /// A content line appeared before any section header.
    #[error("line is outside of any section")]
    OutsideSection,
    /// The section header was not recognized.
    #[error("unknown section `[{0}]`")]
    UnknownSection(String),
    /// A `key: value` line was expected.
    #[error("expected `key: value` pair")]
    ExpectedKeyValue,
    /// A record line had too few comma separated fields.
    #[error("expected at least {expected} fields, but found {found}")]
    MissingFields {
        /// Minimum number of fields.
        expected: usize,
        /// Number of fields actually found.
        found: usize,
    },
    /// A field could not be read as a finite number, or a time or position is outside `i32`.
    #[error("invalid number `{value}` for {field}")]
    InvalidNumber {
        /// Name of the field.
        field: String,
        /// The text found.
        value: String,
    },
}

/// An [`OsuParseWarning`] with the byte span of the skipped line.
pub type OsuParseWarningWithRange = SourceRangeMixin<OsuParseWarning>;

/// Parse results of an `.osu` file, includes the records and warnings.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct OsuParseOutput {
    /// The parsed records.
    pub osu: Osu,
    /// Warnings about skipped lines.
    pub warnings: Vec<OsuParseWarningWithRange>,
}

/// Parses the `.osu` format text into records.
///
/// # Example
///
/// ```
/// use osu2bms::osu::parse_osu;
///
/// let source = "osu file format v14\n\n[General]\nMode: 3\n";
/// let output = parse_osu(source);
/// assert_eq!(output.osu.general.mode, 3);
/// assert!(output.warnings.is_empty());
/// ```
pub fn parse_osu(source: &str) -> OsuParseOutput {
    let tokens = lex::tokenize(source);
    parse::parse_tokens(&tokens)
}
