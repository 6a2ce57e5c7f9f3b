use crate::render::{TooltipOptions, render_tooltip};
use crate::{AnnotatorConfig, GlossaryError, MatchStrategy, Vocabulary};
use fst::Map;
use fst::raw::Output;
use tracing::{debug, warn};

/// Annotated text and the number of tooltips inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated {
    pub text: String,
    pub matches: usize,
}

/// Compiled vocabulary ready for repeated annotation passes.
pub struct Annotator {
    names: Vec<String>,
    replacements: Vec<String>,
    index: Map<Vec<u8>>,
    strategy: MatchStrategy,
}

impl Annotator {
    pub fn new(vocabulary: &Vocabulary, config: &AnnotatorConfig) -> Result<Self, GlossaryError> {
        let options = TooltipOptions {
            max_description_length: config.max_description_length,
            read_more_label: &config.read_more_label,
            detail_base_url: config.detail_base_url.as_deref(),
        };
        let names: Vec<String> = vocabulary.iter().map(|term| term.name.clone()).collect();
        let replacements: Vec<String> = vocabulary
            .iter()
            .map(|term| render_tooltip(term, &options))
            .collect();

        // The fst needs lexicographically sorted keys; values point back into `names`.
        let mut keys: Vec<(&str, u64)> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx as u64))
            .collect();
        keys.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        let index = Map::from_iter(keys)?;

        debug!(
            terms = names.len(),
            strategy = %config.strategy,
            "compiled glossary annotator"
        );
        Ok(Self {
            names,
            replacements,
            index,
            strategy: config.strategy,
        })
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Tooltip markup rendered for the term at vocabulary position `idx`.
    pub fn replacement(&self, idx: usize) -> Option<&str> {
        self.replacements.get(idx).map(String::as_str)
    }

    pub fn annotate(&self, text: &str) -> Annotated {
        if self.is_empty() {
            return Annotated {
                text: text.to_string(),
                matches: 0,
            };
        }
        match self.strategy {
            MatchStrategy::Longest => self.annotate_longest(text),
            MatchStrategy::Ordered => self.annotate_ordered(text),
        }
    }

    fn annotate_longest(&self, text: &str) -> Annotated {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut matches = 0usize;
        let mut copied = 0usize;
        let mut pos = 0usize;
        while pos < bytes.len() {
            match self.longest_match(&bytes[pos..]) {
                Some((len, idx)) => {
                    out.push_str(&text[copied..pos]);
                    out.push_str(&self.replacements[idx]);
                    pos += len;
                    copied = pos;
                    matches += 1;
                }
                None => {
                    pos += text[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        out.push_str(&text[copied..]);
        Annotated { text: out, matches }
    }

    fn annotate_ordered(&self, text: &str) -> Annotated {
        let mut current = text.to_string();
        let mut matches = 0usize;
        for (name, replacement) in self.names.iter().zip(&self.replacements) {
            let found = current.matches(name.as_str()).count();
            if found == 0 {
                continue;
            }
            matches += found;
            current = current.replace(name.as_str(), replacement);
        }
        Annotated {
            text: current,
            matches,
        }
    }

    /// Walks the fst from the root along `input`, remembering the last final
    /// state. Returns `(byte_len, vocabulary_index)` of the longest name that
    /// prefixes `input`.
    fn longest_match(&self, input: &[u8]) -> Option<(usize, usize)> {
        let fst = self.index.as_fst();
        let mut node = fst.root();
        let mut output = Output::zero();
        let mut best = None;
        for (consumed, &byte) in input.iter().enumerate() {
            let Some(slot) = node.find_input(byte) else {
                break;
            };
            let transition = node.transition(slot);
            output = output.cat(transition.out);
            node = fst.node(transition.addr);
            if node.is_final() {
                let value = output.cat(node.final_output()).value();
                best = Some((consumed + 1, value as usize));
            }
        }
        best
    }
}

/// Annotates `text` with tooltips for every term in `vocabulary`, using the
/// default strategy and the given description limit.
pub fn annotate(vocabulary: &Vocabulary, text: &str, max_description_length: usize) -> String {
    let config = AnnotatorConfig::default().with_max_description_length(max_description_length);
    annotate_with(vocabulary, text, &config).text
}

/// Like [`annotate`], but with full configuration. If the vocabulary cannot be
/// compiled the original text is returned unannotated.
pub fn annotate_with(vocabulary: &Vocabulary, text: &str, config: &AnnotatorConfig) -> Annotated {
    match Annotator::new(vocabulary, config) {
        Ok(annotator) => annotator.annotate(text),
        Err(err) => {
            warn!(error = %err, "glossary annotation skipped");
            Annotated {
                text: text.to_string(),
                matches: 0,
            }
        }
    }
}
