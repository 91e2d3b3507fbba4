//! Fancy diagnostics support using `ariadne`.
//!
//! Warnings of [`parse_osu`](crate::osu::parse_osu) carry the byte span of the skipped line, so
//! they can be rendered as `ariadne::Report`s pointing into the source. Ariadne computes rows
//! and columns from the byte offsets.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use osu2bms::{diagnostics::emit_osu_warnings, osu::parse_osu};
//!
//! let source = "[TimingPoints]\n0,fast,4,1,0,100,1,0\n";
//! let output = parse_osu(source);
//!
//! emit_osu_warnings("chart.osu", source, &output.warnings);
//! # }
//! ```

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::osu::OsuParseWarningWithRange;

/// Source text with its file name.
///
/// ```rust
/// use osu2bms::diagnostics::SimpleSource;
///
/// let source = SimpleSource::new("chart.osu", "[General]\nMode: 3\n");
/// assert_eq!(source.name(), "chart.osu");
/// ```
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Trait for converting positioned warnings to `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Convert the warning to an ariadne Report, using `src` for the file name.
    fn to_report<'a>(&self, src: &SimpleSource<'a>)
    -> Report<'a, (String, std::ops::Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: std::ops::Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, std::ops::Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for OsuParseWarningWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            self.as_range(),
            "osu parse: line skipped",
            self.content(),
            Color::Blue,
        )
    }
}

/// Renders positioned parse warnings to stderr.
///
/// # Parameters
/// * `name` - Name of the source file, used for display in diagnostic information
/// * `source` - Complete `.osu` source text
/// * `warnings` - Warnings to display
#[cfg(feature = "diagnostics")]
pub fn emit_osu_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a OsuParseWarningWithRange>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for warning in warnings {
        let report = warning.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Collect `ariadne::Report` instances for parse warnings without printing.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_osu_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a OsuParseWarningWithRange>,
) -> Vec<Report<'a, (String, std::ops::Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings
        .into_iter()
        .map(|warning| warning.to_report(&simple))
        .collect()
}

#[cfg(all(test, feature = "diagnostics"))]
mod tests {
    use super::*;
    use crate::osu::parse_osu;

    #[test]
    fn reports_point_at_skipped_lines() {
        let source = "[TimingPoints]\n0,fast,4,1,0,100,1,0\n[Nope]\n";
        let output = parse_osu(source);
        let reports = collect_osu_reports("chart.osu", source, &output.warnings);
        assert_eq!(reports.len(), 2);

        let mut rendered = Vec::new();
        for report in &reports {
            report
                .write(
                    ("chart.osu".to_string(), Source::from(source)),
                    &mut rendered,
                )
                .expect("write to vec");
        }
        let rendered = String::from_utf8(rendered).expect("utf-8 output");
        assert!(rendered.contains("invalid number `fast` for beat length"));
        assert!(rendered.contains("unknown section `[Nope]`"));
    }
}
