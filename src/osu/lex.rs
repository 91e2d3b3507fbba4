//! Lexical analyzer of the `.osu` format.
//!
//! The format is line oriented, so a token is a whole line classified as a format header, a
//! section header or a content line. Blank lines and `//` comments produce no token.

mod cursor;

use crate::{
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    util::StrExtension,
};

use self::cursor::Cursor;

const FORMAT_HEADER: &str = "osu file format v";

/// A classified line of the `.osu` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `osu file format vNN`, `None` if the version is unreadable.
    FormatVersion(Option<u32>),
    /// `[Name]`, holding `Name`.
    Section(&'a str),
    /// Any other line. Leading whitespace is kept because indented `[Events]` lines are
    /// storyboard commands.
    Line(&'a str),
}

/// Analyzes and splits the `.osu` format text into line tokens with their byte spans.
#[must_use]
pub fn tokenize(source: &str) -> Vec<SourceRangeMixin<Token<'_>>> {
    let mut cursor = Cursor::new(source);
    let mut tokens = vec![];
    while let Some((range, line)) = cursor.next_line_with_range() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let token = if trimmed.starts_with_ignore_case(FORMAT_HEADER) {
            let version = trimmed.get(FORMAT_HEADER.len()..).unwrap_or_default();
            Token::FormatVersion(version.trim().parse().ok())
        } else if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Token::Section(name.trim())
        } else {
            Token::Line(line.trim_end())
        };
        tokens.push(token.into_wrapper_range(range));
    }
    tokens
}
