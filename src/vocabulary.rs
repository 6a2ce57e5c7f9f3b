use crate::GlossaryError;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Canonical route of a term page, used for terms with an id when no base URL
/// is configured.
pub const CANONICAL_TERM_ROUTE: &str = "/taxonomy/term";

/// A single glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detail_url: Option<String>,
    /// Identifier of the term in its source, used for canonical detail links.
    #[serde(default)]
    pub id: Option<String>,
}

impl GlossaryTerm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            detail_url: None,
            id: None,
        }
    }

    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.detail_url = Some(url.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Description text, empty when the source had none.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Explicit detail URL, or one derived from the term id (under `base_url`,
    /// falling back to the canonical term route), or from the name when a
    /// `base_url` is given.
    pub fn resolve_detail_url(&self, base_url: Option<&str>) -> Option<String> {
        if let Some(url) = self.detail_url.as_deref().filter(|url| !url.is_empty()) {
            return Some(url.to_string());
        }
        if let Some(id) = self.id.as_deref() {
            let base = base_url.unwrap_or(CANONICAL_TERM_ROUTE).trim_end_matches('/');
            return Some(format!("{base}/{}", encode_component(id)));
        }
        let base = base_url?.trim_end_matches('/');
        Some(format!("{base}/{}", encode_component(&self.name)))
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Ordered, name-unique collection of terms. Order is load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<GlossaryTerm>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a term. Returns `false` when the term was rejected (empty or
    /// duplicate name); the first term with a given name wins.
    pub fn push(&mut self, term: GlossaryTerm) -> bool {
        if term.name.is_empty() {
            warn!("skipping glossary term with an empty name");
            return false;
        }
        if self.terms.iter().any(|existing| existing.name == term.name) {
            warn!(name = %term.name, "skipping duplicate glossary term");
            return false;
        }
        self.terms.push(term);
        true
    }

    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    pub fn get(&self, name: &str) -> Option<&GlossaryTerm> {
        self.terms.iter().find(|term| term.name == name)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlossaryTerm> {
        self.terms.iter()
    }

    /// Parses a JSON array of term objects.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GlossaryError> {
        let rows: Vec<GlossaryTerm> = serde_json::from_reader(reader)?;
        Ok(rows.into_iter().collect())
    }

    pub fn from_json_str(input: &str) -> Result<Self, GlossaryError> {
        Self::from_json_reader(input.as_bytes())
    }

    /// Parses `name<TAB>description[<TAB>detail_url]` rows. A first row starting
    /// with `name` is treated as a header; blank lines are ignored.
    pub fn from_tsv_reader<R: BufRead>(reader: R) -> Result<Self, GlossaryError> {
        let mut vocabulary = Vocabulary::new();
        for (idx, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if idx == 0 && line.starts_with("name\t") {
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, '\t');
            let name = parts.next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(GlossaryError::Parse {
                    line: idx + 1,
                    message: "missing term name".to_string(),
                });
            }
            let description = parts.next().map(str::to_string);
            let detail_url = parts
                .next()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string);
            vocabulary.push(GlossaryTerm {
                name: name.to_string(),
                description,
                detail_url,
                id: None,
            });
        }
        Ok(vocabulary)
    }
}

impl FromIterator<GlossaryTerm> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = GlossaryTerm>>(iter: I) -> Self {
        let mut vocabulary = Vocabulary::new();
        for term in iter {
            vocabulary.push(term);
        }
        vocabulary
    }
}

impl<'a> IntoIterator for &'a Vocabulary {
    type Item = &'a GlossaryTerm;
    type IntoIter = std::slice::Iter<'a, GlossaryTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Supplies the vocabulary for an annotation pass.
pub trait VocabularySource {
    fn load(&self) -> Result<Vocabulary, GlossaryError>;
}

impl VocabularySource for Vocabulary {
    fn load(&self) -> Result<Vocabulary, GlossaryError> {
        Ok(self.clone())
    }
}

/// Reads a vocabulary from disk on every `load`, JSON or TSV by extension.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VocabularySource for FileSource {
    fn load(&self) -> Result<Vocabulary, GlossaryError> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let file = BufReader::new(File::open(&self.path)?);
        let vocabulary = match extension.as_str() {
            "json" => Vocabulary::from_json_reader(file)?,
            "tsv" | "txt" => Vocabulary::from_tsv_reader(file)?,
            other => return Err(GlossaryError::UnsupportedFormat(other.to_string())),
        };
        debug!(path = %self.path.display(), terms = vocabulary.len(), "loaded vocabulary");
        Ok(vocabulary)
    }
}

/// Names in `vocabulary` closest to `query`, best first.
pub fn suggest_names<'a>(vocabulary: &'a Vocabulary, query: &str, limit: usize) -> Vec<&'a str> {
    let needle = query.to_lowercase();
    let mut scored: Vec<(f64, &str)> = vocabulary
        .iter()
        .map(|term| {
            let score =
                rapidfuzz::fuzz::ratio(needle.chars(), term.name.to_lowercase().chars());
            (score, term.name.as_str())
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(limit).map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_and_empty_names_are_skipped() {
        let vocabulary: Vocabulary = vec![
            GlossaryTerm::new("Orbit", "first"),
            GlossaryTerm::new("", "nameless"),
            GlossaryTerm::new("Orbit", "second"),
            GlossaryTerm::new("orbit", "lowercase is distinct"),
        ]
        .into_iter()
        .collect();
        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.get("Orbit").unwrap().description(), "first");
        assert!(vocabulary.get("orbit").is_some());
    }

    #[test]
    fn json_null_description_reads_as_empty() {
        let vocabulary = Vocabulary::from_json_str(
            r#"[{"name": "Gravity", "description": null}, {"name": "Mass"}]"#,
        )
        .unwrap();
        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.terms()[0].description(), "");
        assert_eq!(vocabulary.terms()[1].description(), "");
    }

    #[test]
    fn tsv_skips_header_and_blank_lines() {
        let input = "name\tdescription\tdetail_url\nOrbit\tA curved path\t/glossary/orbit\n\nMass\tAmount of matter\n";
        let vocabulary = Vocabulary::from_tsv_reader(input.as_bytes()).unwrap();
        let names: Vec<_> = vocabulary.iter().map(|term| term.name.as_str()).collect();
        assert_eq!(names, vec!["Orbit", "Mass"]);
        assert_eq!(
            vocabulary.terms()[0].detail_url.as_deref(),
            Some("/glossary/orbit")
        );
        assert_eq!(vocabulary.terms()[1].detail_url, None);
    }

    #[test]
    fn tsv_rejects_rows_without_a_name() {
        let err = Vocabulary::from_tsv_reader("Orbit\tpath\n\tno name\n".as_bytes()).unwrap_err();
        match err {
            GlossaryError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn detail_url_prefers_explicit_then_id_then_name() {
        let explicit = GlossaryTerm::new("Orbit", "").with_detail_url("https://example.com/orbit");
        assert_eq!(
            explicit.resolve_detail_url(Some("/taxonomy/term")).as_deref(),
            Some("https://example.com/orbit")
        );
        let by_id = GlossaryTerm::new("Orbit", "").with_id("42");
        assert_eq!(
            by_id.resolve_detail_url(Some("/taxonomy/term/")).as_deref(),
            Some("/taxonomy/term/42")
        );
        let by_name = GlossaryTerm::new("Black hole", "");
        assert_eq!(
            by_name.resolve_detail_url(Some("/glossary")).as_deref(),
            Some("/glossary/Black%20hole")
        );
        assert_eq!(by_name.resolve_detail_url(None), None);
    }

    #[test]
    fn id_links_to_canonical_route_without_base_url() {
        let term = GlossaryTerm::new("Orbit", "").with_id("12");
        assert_eq!(term.resolve_detail_url(None).as_deref(), Some("/taxonomy/term/12"));
    }

    #[test]
    fn file_source_rejects_unknown_extension() {
        let source = FileSource::new("/nonexistent/terms.csv");
        assert!(source.load().is_err());
    }

    #[test]
    fn suggestions_rank_close_names_first() {
        let vocabulary: Vocabulary = vec![
            GlossaryTerm::new("Gravity", ""),
            GlossaryTerm::new("Orbit", ""),
            GlossaryTerm::new("Gravitation", ""),
        ]
        .into_iter()
        .collect();
        let suggestions = suggest_names(&vocabulary, "gravty", 2);
        assert_eq!(suggestions[0], "Gravity");
        assert_eq!(suggestions.len(), 2);
    }
}
