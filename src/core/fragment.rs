//! Coded text fragments: the smallest unit of content the engine moves around.
//!
//! A fragment is an ordered list of spans, each either literal text or an
//! inline [`Code`] (an opening/closing tag pair or a standalone placeholder).
//! Codes carry the formatting the surrounding document format cares about;
//! the engine never interprets them, it only keeps them attached to the text
//! they belong to while that text is aligned, matched, and copied.

use serde::{Deserialize, Serialize};

/// What role an inline code plays in the surrounding markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    /// Start of a paired span (e.g. `<b>`)
    Opening,
    /// End of a paired span (e.g. `</b>`)
    Closing,
    /// Standalone marker (e.g. `<br/>`, `{0}`)
    Placeholder,
}

/// An inline formatting/placeholder marker inside a fragment.
///
/// `data` is the code's own payload (native markup as the filter captured
/// it); `outer_data` is reference data owned by the surrounding document
/// (e.g. an href rewritten per revision). Codes flagged `deletable` are ones
/// a translator may legitimately drop, so their absence from a translation
/// is not worth a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub kind: CodeKind,
    pub id: i32,
    pub data: Option<String>,
    pub outer_data: Option<String>,
    pub deletable: bool,
}

impl Code {
    pub fn new(kind: CodeKind, id: i32) -> Self {
        Self {
            kind,
            id,
            data: None,
            outer_data: None,
            deletable: false,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_outer_data(mut self, outer: impl Into<String>) -> Self {
        self.outer_data = Some(outer.into());
        self
    }

    pub fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }
}

/// One span of a fragment: literal text or an inline code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Span {
    Text(String),
    Code(Code),
}

/// An ordered sequence of text and code spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    spans: Vec<Span>,
}

impl TextFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment holding plain text and no codes.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut frag = Self::new();
        if !text.is_empty() {
            frag.spans.push(Span::Text(text));
        }
        frag
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        // Coalesce adjacent text spans so span layout stays canonical
        if let Some(Span::Text(last)) = self.spans.last_mut() {
            last.push_str(&text);
        } else {
            self.spans.push(Span::Text(text));
        }
    }

    pub fn push_code(&mut self, code: Code) {
        self.spans.push(Span::Code(code));
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// True when the fragment holds no visible text (codes alone don't count).
    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// The fragment's text with codes skipped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            if let Span::Text(t) = span {
                out.push_str(t);
            }
        }
        out
    }

    /// The fragment's text with codes rendered as stable `[#kind:id]` markers.
    ///
    /// Only used for comparison and display; the markers carry exactly the
    /// identity (kind + id) that code-sensitive equality is defined over.
    pub fn coded_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span {
                Span::Text(t) => out.push_str(t),
                Span::Code(c) => {
                    let tag = match c.kind {
                        CodeKind::Opening => "o",
                        CodeKind::Closing => "c",
                        CodeKind::Placeholder => "p",
                    };
                    out.push_str(&format!("[#{tag}:{id}]", id = c.id));
                }
            }
        }
        out
    }

    /// Number of characters of visible text, the quantity length-ratio
    /// scoring works over.
    pub fn char_count(&self) -> usize {
        self.spans
            .iter()
            .map(|s| match s {
                Span::Text(t) => t.chars().count(),
                Span::Code(_) => 0,
            })
            .sum()
    }

    /// Iterate the fragment's codes in document order.
    pub fn codes(&self) -> impl Iterator<Item = &Code> {
        self.spans.iter().filter_map(|s| match s {
            Span::Code(c) => Some(c),
            Span::Text(_) => None,
        })
    }

    /// Iterate the fragment's codes mutably, in document order.
    pub fn codes_mut(&mut self) -> impl Iterator<Item = &mut Code> {
        self.spans.iter_mut().filter_map(|s| match s {
            Span::Code(c) => Some(c),
            Span::Text(_) => None,
        })
    }

    /// Append another fragment, inserting a single joining space between
    /// visible text when both sides have some.
    pub fn append(&mut self, other: &TextFragment) {
        if other.is_empty() {
            return;
        }
        if !self.is_blank() && !other.is_blank() {
            self.push_text(" ");
        }
        for span in &other.spans {
            match span {
                Span::Text(t) => self.push_text(t.clone()),
                Span::Code(c) => self.push_code(c.clone()),
            }
        }
    }

    /// Collapse runs of whitespace in every text span to a single space and
    /// trim the fragment's outer edges.
    pub fn collapse_whitespace(&mut self) {
        let last = self.spans.len().saturating_sub(1);
        for (i, span) in self.spans.iter_mut().enumerate() {
            if let Span::Text(t) = span {
                let mut collapsed = String::with_capacity(t.len());
                let mut in_ws = false;
                for ch in t.chars() {
                    if ch.is_whitespace() {
                        in_ws = true;
                    } else {
                        // A leading run only survives on interior spans,
                        // where it separates the span from a preceding code
                        if in_ws && (!collapsed.is_empty() || i != 0) {
                            collapsed.push(' ');
                        }
                        in_ws = false;
                        collapsed.push(ch);
                    }
                }
                // Interior spans keep a trailing separator if one existed
                if in_ws && i != last && !collapsed.is_empty() {
                    collapsed.push(' ');
                }
                *t = collapsed;
            }
        }
        self.spans.retain(|s| !matches!(s, Span::Text(t) if t.is_empty()));
    }
}

impl std::fmt::Display for TextFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.coded_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_coded_text_render_codes_differently() {
        let mut frag = TextFragment::from_text("Click ");
        frag.push_code(Code::new(CodeKind::Opening, 1).with_data("<a>"));
        frag.push_text("here");
        frag.push_code(Code::new(CodeKind::Closing, 1).with_data("</a>"));
        frag.push_text(".");

        assert_eq!(frag.plain_text(), "Click here.");
        assert_eq!(frag.coded_text(), "Click [#o:1]here[#c:1].");
        assert_eq!(frag.char_count(), 11);
    }

    #[test]
    fn append_joins_with_single_space() {
        let mut a = TextFragment::from_text("First.");
        let b = TextFragment::from_text("Second.");
        a.append(&b);
        assert_eq!(a.plain_text(), "First. Second.");
    }

    #[test]
    fn append_to_blank_side_adds_no_separator() {
        let mut a = TextFragment::new();
        a.append(&TextFragment::from_text("Only."));
        assert_eq!(a.plain_text(), "Only.");
    }

    #[test]
    fn collapse_whitespace_squeezes_runs_and_trims() {
        let mut frag = TextFragment::from_text("  a\t\tb \n c  ");
        frag.collapse_whitespace();
        assert_eq!(frag.plain_text(), "a b c");
    }

    #[test]
    fn collapse_whitespace_keeps_separator_before_code() {
        let mut frag = TextFragment::from_text("end  ");
        frag.push_code(Code::new(CodeKind::Placeholder, 7));
        frag.push_text("  tail");
        frag.collapse_whitespace();
        assert_eq!(frag.coded_text(), "end [#p:7] tail");
    }

    #[test]
    fn adjacent_text_spans_coalesce() {
        let mut frag = TextFragment::new();
        frag.push_text("ab");
        frag.push_text("cd");
        assert_eq!(frag.spans().len(), 1);
        assert_eq!(frag.plain_text(), "abcd");
    }
}
