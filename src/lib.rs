//! **retread** - Deterministic sentence alignment and diff leverage for recycling translated content
//!
//! Two axes of translation reuse over one shared model: sentence-level
//! alignment of a text block against its translation, and paragraph-level
//! leverage of prior translations across document revisions. Inline
//! formatting codes survive both.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Alignment/leverage engine - the algorithmic core
pub mod core {
    /// Coded text fragments and inline code model
    pub mod fragment;
    pub use self::fragment::{Code, CodeKind, Span, TextFragment};

    /// Paragraph-level text units, targets, and annotations
    pub mod unit;
    pub use self::unit::{AltTranslation, LocaleId, MatchRecord, MatchType, Segment, TextUnit};

    /// Fatal error taxonomy
    pub mod error;
    pub use self::error::EngineError;

    /// Pluggable compatibility scoring (Gale-Church length ratio)
    pub mod score;
    pub use self::score::{GaleChurchScorer, ScoringStrategy};

    /// Sequence-alignment dynamic programming with tagged cell states
    pub mod matrix;
    pub use self::matrix::{AlignmentCell, MAX_CELLS};

    /// Sentence alignment orchestration
    pub mod aligner;
    pub use self::aligner::{AlignedPair, SentenceAligner};

    /// Inline-code reconciliation between donor and recipient fragments
    pub mod codes;
    pub use self::codes::transfer_codes;

    /// Exact and fuzzy unit comparators (trigram Dice similarity)
    pub mod compare;
    pub use self::compare::{ExactComparator, FuzzyComparator, UnitComparator, dice};

    /// Comparator-driven list diff between document revisions
    pub mod diff;
    pub use self::diff::match_units;

    /// Paragraph leverage reconciler
    pub mod leverage;
    pub use self::leverage::Leverager;

    /// File alignment across document trees
    pub mod files;
    pub use self::files::{FileAligner, FileAlignment};
}

/// Infrastructure - configuration, diagnostics, I/O
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use self::config::Settings;

    /// Explicit per-invocation diagnostics sink
    pub mod diag;
    pub use self::diag::{Diagnostic, Diagnostics, Severity};

    /// Plain-text document reader and sentence splitter
    pub mod reader;

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use self::walk::FileWalker;
}

// Strategic re-exports for library consumers (`crate::` keeps the local
// `core` module from colliding with the builtin core crate in use paths)
pub use crate::cli::{AppContext, Cli, Commands};
pub use crate::core::{
    AlignedPair, EngineError, Leverager, LocaleId, SentenceAligner, TextFragment, TextUnit,
};
pub use crate::infra::{Diagnostics, Settings};
