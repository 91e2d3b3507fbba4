//! Reading chart bytes into text.
//!
//! Charts are UTF-8 nowadays, but older ones are written in Shift_JIS. Bytes that are valid
//! UTF-8 are taken as is, anything else is decoded as Shift_JIS (Windows code page 932).

use std::{
    borrow::Cow,
    io::{self, Read},
};

use encoding_rs::{SHIFT_JIS, UTF_8};
use thiserror::Error;

use crate::digest::{ChartDigest, DigestReader};

/// Failure of reading a chart source.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Decodes chart bytes into text.
///
/// ```
/// use osu2bms::decode::decode_chart_text;
///
/// assert_eq!(decode_chart_text("曲".as_bytes()), "曲");
/// assert_eq!(decode_chart_text(&[0x8b, 0xc8]), "曲");
/// ```
#[must_use]
pub fn decode_chart_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        return text;
    }
    let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
    if had_errors {
        log::debug!("chart source is neither UTF-8 nor Shift_JIS, unmappable bytes replaced");
    }
    text
}

/// Reads a whole chart source, digesting its bytes while reading.
///
/// # Errors
///
/// Returns [`DecodeError::Io`] if reading fails.
pub fn read_osu_source(reader: impl Read) -> Result<(String, ChartDigest), DecodeError> {
    let mut reader = DigestReader::new(reader);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode_chart_text(&bytes).into_owned();
    Ok((text, reader.finish()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bom_survives_for_the_lexer() {
        let bytes = b"\xef\xbb\xbfosu file format v14\n";
        assert_eq!(decode_chart_text(bytes), "\u{feff}osu file format v14\n");
    }

    #[test]
    fn shift_jis_fallback() {
        // "Title:テスト" in Shift_JIS
        let bytes = b"Title:\x83\x65\x83\x58\x83\x67";
        assert_eq!(decode_chart_text(bytes), "Title:テスト");
    }

    #[test]
    fn source_and_digest_from_one_read() {
        let bytes = b"[General]\nMode: 3\n";
        let (text, digest) = read_osu_source(&bytes[..]).expect("read from slice");
        assert_eq!(text, "[General]\nMode: 3\n");
        assert_eq!(digest, ChartDigest::of(bytes));
    }

    #[test]
    fn read_failure_is_reported() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
        }
        assert!(matches!(read_osu_source(Broken), Err(DecodeError::Io(_))));
    }
}
