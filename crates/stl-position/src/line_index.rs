//! Line index for mapping byte offsets to source line text, used by the
//! diagnostic pretty-printer to recover the offending line for a caret span.

/// Caches line-start byte offsets for an STL source file so the formatter
/// can recover "line N" text without rescanning the whole file per diagnostic.
#[derive(Debug, Clone)]
pub struct LineStartsCache {
    line_starts: Vec<usize>,
}

impl LineStartsCache {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line number containing `offset`.
    pub fn line_number(&self, offset: usize) -> u32 {
        let idx = self.line_starts.binary_search(&offset).unwrap_or_else(|i| i.saturating_sub(1));
        idx as u32 + 1
    }

    /// The text of the given 1-based line, without its trailing newline.
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> &'a str {
        let idx = (line.saturating_sub(1)) as usize;
        let Some(&start) = self.line_starts.get(idx) else { return "" };
        let end = self.line_starts.get(idx + 1).map(|&e| e.saturating_sub(1)).unwrap_or(text.len());
        let end = end.max(start).min(text.len());
        text.get(start..end).unwrap_or("")
    }

    /// 1-based column for `offset` within its line.
    pub fn column(&self, offset: usize) -> u32 {
        let line = self.line_number(offset);
        let idx = (line - 1) as usize;
        let start = self.line_starts[idx];
        (offset.saturating_sub(start)) as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_line_and_column() {
        let text = "module foo\nconst int a = 1;\n";
        let cache = LineStartsCache::new(text);
        assert_eq!(cache.line_number(0), 1);
        assert_eq!(cache.line_number(11), 2);
        assert_eq!(cache.line_text(text, 2), "const int a = 1;");
        assert_eq!(cache.column(11), 1);
        assert_eq!(cache.column(17), 7);
    }
}
