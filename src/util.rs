/// Trait extension utility for [`str`].
pub trait StrExtension {
    /// Returns `true` if `needle` is a prefix of the string regardless of its case.
    fn starts_with_ignore_case(&self, needle: &str) -> bool;

    /// Returns the string without a surrounding pair of double quotes, trimmed.
    fn unquote(&self) -> &Self;
}

impl StrExtension for str {
    fn starts_with_ignore_case(&self, needle: &str) -> bool {
        self.get(..needle.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(needle))
    }

    fn unquote(&self) -> &Self {
        let trimmed = self.trim();
        trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_ignore_case() {
        assert!("Video,0,\"a.mp4\"".starts_with_ignore_case("video"));
        assert!("[TimingPoints]".starts_with_ignore_case("[timing"));
        assert!(!"Vid".starts_with_ignore_case("video"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!("\"bg.jpg\"".unquote(), "bg.jpg");
        assert_eq!("  \"spaced name.png\" ".unquote(), "spaced name.png");
        assert_eq!("bare.png".unquote(), "bare.png");
        assert_eq!("\"unterminated".unquote(), "\"unterminated");
    }
}
