//! Glossary tooltips for rendered text.
//!
//! An [`Annotator`] compiles a [`Vocabulary`] into tooltip markup and replaces
//! every literal occurrence of a term name in a text. [`GlossaryFormatter`]
//! applies that to the items of a text field, and [`toggle`] carries the
//! client-side show/hide behavior.

mod annotate;
mod config;
mod error;
mod formatter;
pub mod render;
pub mod toggle;
mod vocabulary;

#[cfg(feature = "web")]
pub mod web;

pub use annotate::{Annotated, Annotator, annotate, annotate_with};
pub use config::{
    AnnotatorConfig, DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_READ_MORE_LABEL, MatchStrategy,
};
pub use error::GlossaryError;
pub use formatter::{FieldItem, GlossaryFormatter, ProcessedText, RenderedField};
pub use toggle::{Activation, Region, TOOLTIP_SCRIPT, TooltipBehavior, TooltipState};
pub use vocabulary::{FileSource, GlossaryTerm, Vocabulary, VocabularySource, suggest_names};
