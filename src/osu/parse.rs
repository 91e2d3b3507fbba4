//! Parser of line tokens into [`Osu`] records.

use std::str::FromStr;

use crate::mixin::{SourceRangeMixin, SourceRangeMixinExt};

use super::{
    Event, EventKind, HitObject, Osu, OsuParseOutput, OsuParseWarning, RawTimingPoint, lex::Token,
};

type Result<T> = core::result::Result<T, OsuParseWarning>;

/// Sections of an `.osu` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    General,
    Editor,
    Metadata,
    Difficulty,
    Events,
    TimingPoints,
    Colours,
    HitObjects,
    /// Lines of unknown sections are skipped, the header was already warned.
    Unknown,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "General" => Self::General,
            "Editor" => Self::Editor,
            "Metadata" => Self::Metadata,
            "Difficulty" => Self::Difficulty,
            "Events" => Self::Events,
            "TimingPoints" => Self::TimingPoints,
            "Colours" => Self::Colours,
            "HitObjects" => Self::HitObjects,
            _ => return None,
        })
    }
}

/// Parses line tokens into records, collecting a warning for each skipped line.
pub fn parse_tokens(tokens: &[SourceRangeMixin<Token<'_>>]) -> OsuParseOutput {
    let mut osu = Osu::default();
    let mut warnings = vec![];
    let mut section = None;

    for token in tokens {
        let line = match *token.content() {
            Token::FormatVersion(version) => {
                osu.format_version = version;
                continue;
            }
            Token::Section(name) => {
                section = Some(Section::from_name(name).unwrap_or_else(|| {
                    warnings.push(
                        OsuParseWarning::UnknownSection(name.to_string())
                            .into_wrapper_range(token.as_range()),
                    );
                    Section::Unknown
                }));
                continue;
            }
            Token::Line(line) => line,
        };
        let Some(section) = section else {
            warnings.push(OsuParseWarning::OutsideSection.into_wrapper_range(token.as_range()));
            continue;
        };
        if let Err(warning) = parse_line(&mut osu, section, line) {
            warnings.push(warning.into_wrapper_range(token.as_range()));
        }
    }

    OsuParseOutput { osu, warnings }
}

fn parse_line(osu: &mut Osu, section: Section, line: &str) -> Result<()> {
    match section {
        Section::General => {
            let (key, value) = key_value(line)?;
            match key {
                "AudioFilename" => osu.general.audio_filename = value.to_string(),
                "Mode" => osu.general.mode = number("Mode", value)?,
                _ => {}
            }
        }
        Section::Metadata => {
            let (key, value) = key_value(line)?;
            let value = value.to_string();
            match key {
                "Title" => osu.metadata.title = value,
                "TitleUnicode" => osu.metadata.title_unicode = Some(value),
                "Artist" => osu.metadata.artist = value,
                "ArtistUnicode" => osu.metadata.artist_unicode = Some(value),
                "Creator" => osu.metadata.creator = value,
                "Version" => osu.metadata.version = value,
                _ => {}
            }
        }
        Section::Difficulty => {
            let (key, value) = key_value(line)?;
            if key == "CircleSize" {
                osu.difficulty.circle_size = number("CircleSize", value)?;
            }
        }
        Section::Events => {
            // Indented lines are storyboard commands of the previous sprite.
            if line.starts_with([' ', '_']) {
                return Ok(());
            }
            osu.events.extend(parse_event(line)?);
        }
        Section::TimingPoints => osu.timing_points.push(parse_timing_point(line)?),
        Section::HitObjects => osu.hit_objects.push(parse_hit_object(line)?),
        Section::Editor | Section::Colours | Section::Unknown => {}
    }
    Ok(())
}

fn key_value(line: &str) -> Result<(&str, &str)> {
    line.split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or(OsuParseWarning::ExpectedKeyValue)
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn invalid_number(field: &str, value: &str) -> OsuParseWarning {
    OsuParseWarning::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn number<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_number(field, value))
}

fn finite(field: &str, value: &str) -> Result<f64> {
    let parsed: f64 = number(field, value)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(invalid_number(field, value))
    }
}

/// Reads a time in milliseconds that fits in `i32`, fractions kept.
fn milliseconds(field: &str, value: &str) -> Result<f64> {
    let parsed = finite(field, value)?;
    if (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(invalid_number(field, value))
    }
}

/// Reads an integer that fits in `i32`, also accepting decimal notation written by some editors
/// (truncated).
pub(crate) fn integer(field: &str, value: &str) -> Result<i64> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .or_else(|_| finite(field, value).map(|float| float as i64))?;
    i32::try_from(parsed)
        .map(i64::from)
        .map_err(|_| invalid_number(field, value))
}

/// Reads an event line. Events of other kinds whose second field is not a time, such as
/// storyboard sprites, are ignored.
fn parse_event(line: &str) -> Result<Option<Event>> {
    let fields = fields(line);
    let [kind, start_time, params @ ..] = fields.as_slice() else {
        return Err(OsuParseWarning::MissingFields {
            expected: 2,
            found: fields.len(),
        });
    };
    let kind = EventKind::from_discriminant(kind);
    let start_time = match integer("event start time", start_time) {
        Ok(time) => time,
        Err(_) if matches!(kind, EventKind::Other(_)) => return Ok(None),
        Err(warning) => return Err(warning),
    };
    Ok(Some(Event {
        kind,
        start_time,
        params: params.iter().map(ToString::to_string).collect(),
    }))
}

fn parse_timing_point(line: &str) -> Result<RawTimingPoint> {
    let fields = fields(line);
    let [time, beat_length, rest @ ..] = fields.as_slice() else {
        return Err(OsuParseWarning::MissingFields {
            expected: 2,
            found: fields.len(),
        });
    };
    let optional = |index: usize, name: &str, default: u32| -> Result<u32> {
        rest.get(index)
            .filter(|value| !value.is_empty())
            .map_or(Ok(default), |value| number(name, value))
    };
    Ok(RawTimingPoint {
        time: milliseconds("timing point time", time)?,
        beat_length: finite("beat length", beat_length)?,
        meter: optional(0, "meter", 4)?,
        sample_set: optional(1, "sample set", 0)?,
        sample_index: optional(2, "sample index", 0)?,
        volume: optional(3, "volume", 100)?,
        defines_tempo: optional(4, "uninherited flag", 1)? != 0,
        effects: optional(5, "effects", 0)?,
    })
}

fn parse_hit_object(line: &str) -> Result<HitObject> {
    let fields = fields(line);
    let [x, y, time, type_flags, rest @ ..] = fields.as_slice() else {
        return Err(OsuParseWarning::MissingFields {
            expected: 4,
            found: fields.len(),
        });
    };
    let type_flags: u32 = number("object type", type_flags)?;
    let (hit_sound, extras) = rest.split_first().map_or((None, &[][..]), |(hit_sound, extras)| {
        (Some(*hit_sound), extras)
    });
    let object_params = match extras.split_first() {
        // `endTime:hitSample` of a hold note.
        Some((first, others)) if type_flags & super::HOLD_NOTE_FLAG != 0 => {
            let mut params: Vec<String> = first.splitn(2, ':').map(ToString::to_string).collect();
            params.extend(others.iter().map(ToString::to_string));
            params
        }
        _ => extras.iter().map(ToString::to_string).collect(),
    };
    Ok(HitObject {
        x: integer("x", x)? as i32,
        y: integer("y", y)? as i32,
        time: integer("hit object time", time)?,
        type_flags,
        hit_sound: hit_sound
            .filter(|value| !value.is_empty())
            .map_or(Ok(0), |value| number("hit sound", value))?,
        object_params,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::osu::parse_osu;

    #[test]
    fn timing_point_defaults_for_old_format() {
        let point = parse_timing_point("1000,500").expect("valid timing point");
        assert_eq!(point.time, 1000.0);
        assert_eq!(point.beat_length, 500.0);
        assert_eq!(point.meter, 4);
        assert!(point.defines_tempo);
    }

    #[test]
    fn inherited_timing_point() {
        let point = parse_timing_point("1523.5,-50,4,2,0,60,0,1").expect("valid timing point");
        assert_eq!(point.time, 1523.5);
        assert_eq!(point.beat_length, -50.0);
        assert!(!point.defines_tempo);
        assert_eq!(point.volume, 60);
        assert_eq!(point.effects, 1);
    }

    #[test]
    fn hold_note_splits_tail_time() {
        let object =
            parse_hit_object("64,192,1000,128,0,2000:0:0:0:0:").expect("valid hit object");
        assert!(object.is_hold());
        assert_eq!(object.hold_tail_time(), Some("2000"));
        assert_eq!(object.object_params, vec!["2000", "0:0:0:0:"]);
    }

    #[test]
    fn normal_note_keeps_hit_sample() {
        let object = parse_hit_object("448,192,1500,1,0,0:0:0:0:").expect("valid hit object");
        assert!(!object.is_hold());
        assert_eq!(object.hold_tail_time(), None);
        assert_eq!(object.object_params, vec!["0:0:0:0:"]);
    }

    #[test]
    fn decimal_time_is_truncated() {
        let object = parse_hit_object("0,0,1000.7,1,0").expect("valid hit object");
        assert_eq!(object.time, 1000);
    }

    #[test]
    fn times_outside_i32_are_rejected() {
        assert_eq!(
            parse_hit_object("0,0,9223372036854775807,1,0"),
            Err(OsuParseWarning::InvalidNumber {
                field: "hit object time".to_string(),
                value: "9223372036854775807".to_string(),
            })
        );
        assert_eq!(
            parse_timing_point("100000000000000000,500"),
            Err(OsuParseWarning::InvalidNumber {
                field: "timing point time".to_string(),
                value: "100000000000000000".to_string(),
            })
        );
        assert!(integer("hold tail time", "1e300").is_err());
        assert_eq!(integer("x", "2147483647"), Ok(2147483647));
        assert_eq!(integer("x", "-2147483648.5"), Ok(-2147483648));
    }

    #[test]
    fn malformed_lines_are_reported_and_skipped() {
        const SRC: &str = "\
Mode: 3
[General]
Mode: 3
[Fancy]
whatever
[TimingPoints]
0,abc,4,1,0,100,1,0
0,500,4,1,0,100,1,0
[HitObjects]
64,192
64,192,1000,1,0,0:0:0:0:
";
        let output = parse_osu(SRC);
        let warnings: Vec<_> = output
            .warnings
            .iter()
            .map(|warning| warning.content().clone())
            .collect();
        assert_eq!(
            warnings,
            vec![
                OsuParseWarning::OutsideSection,
                OsuParseWarning::UnknownSection("Fancy".to_string()),
                OsuParseWarning::InvalidNumber {
                    field: "beat length".to_string(),
                    value: "abc".to_string(),
                },
                OsuParseWarning::MissingFields {
                    expected: 4,
                    found: 2,
                },
            ]
        );
        assert_eq!(output.osu.general.mode, 3);
        assert_eq!(output.osu.timing_points.len(), 1);
        assert_eq!(output.osu.hit_objects.len(), 1);
        assert_eq!(&SRC[output.warnings[0].as_range()], "Mode: 3");
    }

    #[test]
    fn events_skip_storyboard_commands() {
        const SRC: &str = "\
[Events]
0,0,\"bg.jpg\",0,0
Video,500,\"movie.mp4\"
Sprite,Foreground,Centre,\"a.png\",320,240
 F,0,0,1000,0,1
Sample,1200,0,\"clap.wav\",70
2,10000,12000
";
        let output = parse_osu(SRC);
        assert!(output.warnings.is_empty());
        let kinds: Vec<_> = output.osu.events.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Background,
                EventKind::Video,
                EventKind::Sample,
                EventKind::Other("2".to_string()),
            ]
        );
        assert_eq!(output.osu.events[1].start_time, 500);
        assert_eq!(output.osu.events[2].params, vec!["0", "\"clap.wav\"", "70"]);
    }

    #[test]
    fn video_event_with_bad_time_is_warned() {
        let output = parse_osu("[Events]\nVideo,soon,\"movie.mp4\"\n");
        assert_eq!(output.osu.events, vec![]);
        assert_eq!(
            output
                .warnings
                .into_iter()
                .map(SourceRangeMixin::into_content)
                .collect::<Vec<_>>(),
            vec![OsuParseWarning::InvalidNumber {
                field: "event start time".to_string(),
                value: "soon".to_string(),
            }]
        );
    }
}
