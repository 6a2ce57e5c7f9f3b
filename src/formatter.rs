use crate::{Annotator, AnnotatorConfig, VocabularySource};
use serde::Serialize;
use tracing::{debug, warn};

pub const LIBRARY: &str = "glossary_tooltip/glossary_tooltip";
pub const CACHE_TAG: &str = "taxonomy_term_list:glossary";
pub const TEXT_FORMAT: &str = "full_html";
pub const SUPPORTED_FIELD_TYPES: &[&str] = &["text", "text_long", "text_with_summary"];

/// One value of a text field.
#[derive(Debug, Clone)]
pub struct FieldItem {
    pub value: String,
    pub langcode: String,
}

impl FieldItem {
    pub fn new(value: impl Into<String>, langcode: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            langcode: langcode.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedText {
    pub text: String,
    pub format: &'static str,
    pub langcode: String,
}

/// Render output for a whole field: one element per item plus the assets and
/// cache tags the page needs.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedField {
    pub items: Vec<ProcessedText>,
    pub libraries: Vec<&'static str>,
    pub cache_tags: Vec<String>,
    pub matches: usize,
}

/// Applies glossary tooltips to text fields.
pub struct GlossaryFormatter<S> {
    source: S,
    config: AnnotatorConfig,
}

impl<S: VocabularySource> GlossaryFormatter<S> {
    pub fn new(source: S, config: AnnotatorConfig) -> Self {
        Self { source, config }
    }

    pub fn applies_to(field_type: &str) -> bool {
        SUPPORTED_FIELD_TYPES.contains(&field_type)
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Loads the vocabulary once and annotates every item. When the vocabulary
    /// cannot be loaded or compiled, items are rendered unannotated.
    pub fn view_elements(&self, items: &[FieldItem]) -> RenderedField {
        let annotator = self
            .source
            .load()
            .and_then(|vocabulary| Annotator::new(&vocabulary, &self.config));
        let annotator = match annotator {
            Ok(annotator) => Some(annotator),
            Err(err) => {
                warn!(error = %err, "glossary vocabulary unavailable, rendering plain text");
                None
            }
        };

        let mut matches = 0usize;
        let items = items
            .iter()
            .map(|item| {
                let text = match &annotator {
                    Some(annotator) => {
                        let annotated = annotator.annotate(&item.value);
                        matches += annotated.matches;
                        annotated.text
                    }
                    None => item.value.clone(),
                };
                ProcessedText {
                    text,
                    format: TEXT_FORMAT,
                    langcode: item.langcode.clone(),
                }
            })
            .collect::<Vec<_>>();
        debug!(items = items.len(), matches, "rendered glossary field");

        RenderedField {
            items,
            libraries: vec![LIBRARY],
            cache_tags: vec![CACHE_TAG.to_string()],
            matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlossaryError, GlossaryTerm, Vocabulary};

    struct FailingSource;

    impl VocabularySource for FailingSource {
        fn load(&self) -> Result<Vocabulary, GlossaryError> {
            Err(GlossaryError::Io(std::io::Error::other("storage offline")))
        }
    }

    fn orbit_vocabulary() -> Vocabulary {
        vec![GlossaryTerm::new("Orbit", "A curved path")]
            .into_iter()
            .collect()
    }

    #[test]
    fn every_item_is_annotated_with_its_langcode() {
        let formatter = GlossaryFormatter::new(orbit_vocabulary(), AnnotatorConfig::default());
        let rendered = formatter.view_elements(&[
            FieldItem::new("Low Orbit", "en"),
            FieldItem::new("Orbit basse", "fr"),
            FieldItem::new("No terms", "en"),
        ]);
        assert_eq!(rendered.items.len(), 3);
        assert_eq!(rendered.matches, 2);
        assert!(rendered.items[0].text.contains("glossary-tooltip-link"));
        assert_eq!(rendered.items[1].langcode, "fr");
        assert_eq!(rendered.items[2].text, "No terms");
        assert!(rendered.items.iter().all(|item| item.format == "full_html"));
        assert_eq!(rendered.libraries, vec![LIBRARY]);
        assert_eq!(rendered.cache_tags, vec![CACHE_TAG.to_string()]);
    }

    #[test]
    fn load_failure_falls_back_to_plain_text() {
        let formatter = GlossaryFormatter::new(FailingSource, AnnotatorConfig::default());
        let rendered = formatter.view_elements(&[FieldItem::new("Orbit", "en")]);
        assert_eq!(rendered.items[0].text, "Orbit");
        assert_eq!(rendered.matches, 0);
        assert_eq!(rendered.libraries, vec![LIBRARY]);
    }

    #[test]
    fn only_text_field_types_are_supported() {
        assert!(GlossaryFormatter::<Vocabulary>::applies_to("text_with_summary"));
        assert!(!GlossaryFormatter::<Vocabulary>::applies_to("string"));
    }
}
