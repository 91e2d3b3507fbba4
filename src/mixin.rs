//! Mixin types for attaching source positions to values.
//!
//! - `SourceRangeMixin` is a generic wrapper that attaches a byte span of the `.osu` source to a value.
//! - `SourceRangeMixinExt` provides extension methods to wrap any value into a `SourceRangeMixin`.

/// A generic wrapper that attaches position information (byte span) to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRangeMixin<T> {
    /// Wrapped content value
    content: T,
    /// Start index in the source string (0-based, inclusive)
    start: usize,
    /// End index in the source string (0-based, exclusive)
    end: usize,
}

impl<T> SourceRangeMixin<T> {
    /// Instances a new `SourceRangeMixin`
    pub const fn new(content: T, start: usize, end: usize) -> Self {
        Self {
            content,
            start,
            end,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Leans the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the start index of the source span.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns the end index of the source span.
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns the source span as a range.
    pub const fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Maps the content of the wrapper, keeping the span.
    pub fn map<U, F>(self, f: F) -> SourceRangeMixin<U>
    where
        F: FnOnce(T) -> U,
    {
        SourceRangeMixin::new(f(self.content), self.start, self.end)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceRangeMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at indices [{}, {})",
            self.content, self.start, self.end
        )
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceRangeMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods for wrapping values into `SourceRangeMixin`.
pub trait SourceRangeMixinExt {
    /// Instances a new `SourceRangeMixin` with the span of a range.
    fn into_wrapper_range(self, range: std::ops::Range<usize>) -> SourceRangeMixin<Self>
    where
        Self: Sized,
    {
        SourceRangeMixin::new(self, range.start, range.end)
    }
}

impl<T> SourceRangeMixinExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_span() {
        let wrapped = "12".into_wrapper_range(3..5);
        let mapped = wrapped.map(|s| s.len());
        assert_eq!(*mapped.content(), 2);
        assert_eq!(mapped.as_range(), 3..5);
    }

    #[test]
    fn display_includes_indices() {
        let wrapped = SourceRangeMixin::new("oops", 10, 14);
        assert_eq!(wrapped.to_string(), "oops at indices [10, 14)");
    }
}
