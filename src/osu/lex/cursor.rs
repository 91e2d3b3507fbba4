use std::ops::Range;

/// Line-wise cursor over the `.osu` source.
pub struct Cursor<'a> {
    /// The index position.
    index: usize,
    /// The source str.
    source: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        // A UTF-8 byte order mark may survive decoding.
        let index = if source.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self { index, source }
    }

    pub const fn is_end(&self) -> bool {
        self.index >= self.source.len()
    }

    /// Determine the end of the current line and handle CRLF (\r\n) correctly.
    ///
    /// Returns a tuple `(next_index, line_end_index)` where `next_index` is the index just after
    /// the line feed and `line_end_index` is the index where the line content ends (exclusive),
    /// with a trailing `\r` excluded.
    fn current_line_bounds(&self) -> (usize, usize) {
        let rest = &self.source[self.index..];
        let (content_len, next_index) = rest.find('\n').map_or_else(
            || (rest.len(), self.source.len()),
            |feed| (feed, self.index + feed + 1),
        );
        let content = &rest[..content_len];
        let line_end_index = self.index + content.strip_suffix('\r').unwrap_or(content).len();
        (next_index, line_end_index)
    }

    /// Move cursor through the current line and return it with its range, without line ending.
    pub fn next_line_with_range(&mut self) -> Option<(Range<usize>, &'a str)> {
        if self.is_end() {
            return None;
        }
        let (next_index, line_end_index) = self.current_line_bounds();
        let range = self.index..line_end_index;
        let line = &self.source[range.clone()];
        self.index = next_index;
        Some((range, line))
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn crlf_is_excluded() {
        let mut cursor = Cursor::new("[General]\r\nMode: 3\r\n");
        assert_eq!(cursor.next_line_with_range(), Some((0..9, "[General]")));
        assert_eq!(cursor.next_line_with_range(), Some((11..18, "Mode: 3")));
        assert!(cursor.is_end());
        assert_eq!(cursor.next_line_with_range(), None);
    }

    #[test]
    fn last_line_without_feed() {
        let mut cursor = Cursor::new("a\nb");
        assert_eq!(cursor.next_line_with_range(), Some((0..1, "a")));
        assert_eq!(cursor.next_line_with_range(), Some((2..3, "b")));
        assert_eq!(cursor.next_line_with_range(), None);
    }

    #[test]
    fn bom_is_skipped() {
        let mut cursor = Cursor::new("\u{feff}osu file format v14");
        let (range, line) = cursor.next_line_with_range().expect("line");
        assert_eq!(line, "osu file format v14");
        assert_eq!(range.start, 3);
    }
}
