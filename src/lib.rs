//! The osu!mania to BMS chart converter.
//!
//! This crate reads an [osu!mania](https://osu.ppy.sh/wiki/en/Game_mode/osu%21mania) beatmap and
//! builds the chart model used by BMS players: timelines holding tempo, scroll speed, measure
//! lines, background sounds and videos, and notes on the lanes of a play mode.
//!
//! # Flow
//!
//! - Bytes == [`decode`] ==> text and [`digest`]s.
//! - Text == [`osu::parse_osu`] ==> [`osu::Osu`] records and positioned warnings.
//! - Records == [`convert::convert_osu`] ==> [`model::BmsModel`] and skipped-record warnings.
//!
//! [`load_osu_file`] does all of them for a file, and [`convert_osu_source`] for text in memory.
//!
//! # Example
//!
//! ```
//! use osu2bms::{convert::ConvertConfig, convert_osu_source, model::ChartIdentity};
//!
//! let source = "\
//! osu file format v14
//!
//! [General]
//! AudioFilename: song.mp3
//! Mode: 3
//!
//! [Difficulty]
//! CircleSize:4
//!
//! [TimingPoints]
//! 0,500,4,1,0,100,1,0
//!
//! [HitObjects]
//! 64,192,1000,128,0,2000:0:0:0:0:
//! ";
//! let identity = ChartIdentity {
//!     md5: String::new(),
//!     sha256: String::new(),
//!     path: "song.osu".into(),
//! };
//! let output = convert_osu_source(source, identity, ConvertConfig::default()).unwrap();
//! let model = output.model;
//! assert_eq!(model.total_notes(), 1);
//! assert_eq!(model.header.bpm, 120.0);
//! assert!(output.warnings.is_empty());
//! ```
//!
//! # Features
//!
//! - `diagnostics` (default): renders positioned parse warnings with `ariadne`, see
//!   [`diagnostics`].
//! - `serde`: `Serialize` and `Deserialize` for records, models and warnings.

pub mod convert;
pub mod decode;
pub mod diagnostics;
pub mod digest;
pub mod mixin;
pub mod model;
pub mod osu;
pub mod prelude;
mod util;

use std::{fs::File, io::BufReader, path::Path};

use thiserror::Error;

use self::{
    convert::{ConvertConfig, ConvertError, ConvertWarning, UnsupportedInput, convert_osu},
    decode::{DecodeError, read_osu_source},
    model::{BmsModel, ChartIdentity},
    osu::{OsuParseWarningWithRange, parse_osu},
};

/// Warnings of loading a chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OsuWarning {
    /// A line skipped by the parser.
    #[error("Warn: parse: {0}")]
    Parse(#[from] OsuParseWarningWithRange),
    /// A record skipped by the converter.
    #[error("Warn: convert: {0}")]
    Convert(#[from] ConvertWarning),
}

/// Output of loading a chart.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct OsuLoadOutput {
    /// The converted chart.
    pub model: BmsModel,
    /// Warnings of parsing and conversion, parse warnings first.
    pub warnings: Vec<OsuWarning>,
}

/// Parses and converts an `.osu` source text.
///
/// # Errors
///
/// Returns [`UnsupportedInput`] if the chart cannot be converted.
pub fn convert_osu_source(
    source: &str,
    identity: ChartIdentity,
    config: ConvertConfig,
) -> Result<OsuLoadOutput, UnsupportedInput> {
    let parsed = parse_osu(source);
    let converted = convert_osu(&parsed.osu, identity, config)?;
    let warnings = parsed
        .warnings
        .into_iter()
        .map(OsuWarning::Parse)
        .chain(converted.warnings.into_iter().map(OsuWarning::Convert))
        .collect();
    Ok(OsuLoadOutput {
        model: converted.model,
        warnings,
    })
}

/// Loads an `.osu` file: reads and digests its bytes in one pass, decodes, parses and converts.
///
/// # Errors
///
/// Returns [`ConvertError::Decode`] if the file cannot be read, and
/// [`ConvertError::Unsupported`] if the chart cannot be converted.
pub fn load_osu_file(
    path: impl AsRef<Path>,
    config: ConvertConfig,
) -> Result<OsuLoadOutput, ConvertError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(DecodeError::from)?;
    let (source, digest) = read_osu_source(BufReader::new(file))?;
    log::debug!("loaded {} with md5 {}", path.display(), digest.md5);
    Ok(convert_osu_source(
        &source,
        digest.into_identity(path),
        config,
    )?)
}
