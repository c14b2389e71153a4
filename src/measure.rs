use unicode_width::UnicodeWidthStr;

/// Character-count text width heuristic; full-width glyphs count double.
pub struct TextMetrics {
    pub char_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self { char_width: 9.0 }
    }
}

impl TextMetrics {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }

    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Width of the widest of `texts`.
    pub fn max_width<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> f64 {
        texts
            .into_iter()
            .map(|t| self.text_width(t))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("N"), 9.0);
        assert_eq!(m.text_width("0..1"), 36.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::new(8.0);
        // 全角文字は幅2
        assert_eq!(m.text_width("多"), 16.0);
    }

    #[test]
    fn test_max_width() {
        let m = TextMetrics::default();
        assert_eq!(m.max_width(["1", "N"]), 9.0);
        assert_eq!(m.max_width(["M", "1..*"]), 36.0);
        assert_eq!(m.max_width(std::iter::empty()), 0.0);
    }
}
