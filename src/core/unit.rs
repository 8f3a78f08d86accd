//! Paragraph-level text units: the containers paragraph leverage works over.
//!
//! A [`TextUnit`] owns exactly one source content and any number of
//! per-locale targets. Content is a list of [`Segment`]s; an unsegmented
//! paragraph is a single segment holding the whole text. Annotations a
//! downstream review/export step consumes (alternate translations, diff
//! match markers) live as explicit fields on the target container rather
//! than in a free-form bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::fragment::TextFragment;

/// A normalized locale identifier (e.g. `fr-fr`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocaleId(String);

impl LocaleId {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocaleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocaleId {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// An identified, alignable span of coded text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub fragment: TextFragment,
}

impl Segment {
    pub fn new(id: impl Into<String>, fragment: TextFragment) -> Self {
        Self {
            id: id.into(),
            fragment,
        }
    }

    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, TextFragment::from_text(text))
    }
}

/// Ordered segment list shared by source and target sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub segments: Vec<Segment>,
}

impl Content {
    pub fn from_fragment(fragment: TextFragment) -> Self {
        Self {
            segments: vec![Segment::new("0", fragment)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.fragment.is_empty())
    }

    /// More than one segment means a segmenter has already run over this
    /// content.
    pub fn is_segmented(&self) -> bool {
        self.segments.len() > 1
    }

    /// All segments joined into one fragment (single-segment content is
    /// returned as-is).
    pub fn whole_fragment(&self) -> TextFragment {
        let mut whole = TextFragment::new();
        for seg in &self.segments {
            whole.append(&seg.fragment);
        }
        whole
    }

    pub fn plain_text(&self) -> String {
        self.whole_fragment().plain_text()
    }

    pub fn coded_text(&self) -> String {
        self.whole_fragment().coded_text()
    }
}

/// How a leveraged translation relates to the previous document revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactPreviousVersion,
    FuzzyPreviousVersion,
}

/// An alternate translation hung off a target container, recording where a
/// leveraged candidate came from and how well it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltTranslation {
    /// Current source text the candidate applies to
    pub source: TextFragment,
    /// Source text of the previous revision's unit
    pub original_source: TextFragment,
    /// The leveraged target text, codes already reconciled
    pub target: TextFragment,
    pub match_type: MatchType,
    /// Similarity score, 0-100
    pub score: u8,
    /// Identifier of the step that produced this candidate
    pub origin: String,
}

/// Marker left by a diff-only leverage pass: the unit matched a previous
/// revision and needs a reviewer's confirmation, but nothing was copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffMatch {
    pub old_unit_id: String,
    pub score: u8,
    pub match_type: MatchType,
}

/// A per-locale target: content plus the annotations review tooling reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub content: Content,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_translations: Vec<AltTranslation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_match: Option<DiffMatch>,
}

impl Target {
    pub fn from_fragment(fragment: TextFragment) -> Self {
        Self {
            content: Content::from_fragment(fragment),
            ..Self::default()
        }
    }
}

/// A paragraph-level translatable container.
///
/// The source is always present; targets are keyed by locale and may be
/// absent. `referent` marks content that exists to be referenced by another
/// unit (footnotes and the like); the comparators never treat a referent
/// unit as equal to a non-referent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub referent: bool,
    pub source: Content,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<LocaleId, Target>,
}

impl TextUnit {
    /// An unsegmented unit holding one paragraph of plain text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_fragment(id, TextFragment::from_text(text))
    }

    pub fn from_fragment(id: impl Into<String>, fragment: TextFragment) -> Self {
        Self {
            id: id.into(),
            name: None,
            referent: false,
            source: Content::from_fragment(fragment),
            targets: BTreeMap::new(),
        }
    }

    /// Best human-readable handle for log messages: name when present,
    /// id otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn target(&self, locale: &LocaleId) -> Option<&Target> {
        self.targets.get(locale)
    }

    pub fn target_mut(&mut self, locale: &LocaleId) -> Option<&mut Target> {
        self.targets.get_mut(locale)
    }

    pub fn has_target(&self, locale: &LocaleId) -> bool {
        self.targets.contains_key(locale)
    }

    pub fn set_target(&mut self, locale: LocaleId, target: Target) {
        self.targets.insert(locale, target);
    }

    /// Fetch the target for `locale`, creating an empty one when absent so
    /// annotations have somewhere to live.
    pub fn target_or_default(&mut self, locale: &LocaleId) -> &mut Target {
        self.targets.entry(locale.clone()).or_default()
    }
}

/// One old-index/new-index association produced by paragraph leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub old_index: usize,
    pub new_index: usize,
    /// Similarity score, 0-100
    pub score: u8,
    pub match_type: MatchType,
}
