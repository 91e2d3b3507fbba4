//! Prelude module for the crate.
//!
//! You can use `use osu2bms::prelude::*;` to import the public types at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{ToAriadne, emit_osu_warnings};
pub use crate::{
    OsuLoadOutput, OsuWarning,
    convert::{
        ALIGNMENT_OFFSET_MS, ConvertConfig, ConvertError, ConvertWarning, OsuConvertOutput,
        UnsupportedInput, convert_osu,
    },
    convert_osu_source,
    decode::{DecodeError, decode_chart_text, read_osu_source},
    diagnostics::SimpleSource,
    digest::{ChartDigest, DigestReader},
    load_osu_file,
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    model::{
        BmsModel, ChartHeader, ChartIdentity, ChartInformation, JudgeRankType, LongNoteDef, Mode,
        Note, NoteArena, NoteId, NoteKind, Timeline, TotalType,
    },
    osu::{
        Event, EventKind, HitObject, Osu, OsuParseOutput, OsuParseWarning,
        OsuParseWarningWithRange, RawTimingPoint, parse_osu,
    },
};
