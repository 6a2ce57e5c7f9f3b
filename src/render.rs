//! Tooltip markup for a single glossary term.
//!
//! The markup is a label element immediately followed by a hidden description
//! wrapper. The class markers are shared with the client behavior in
//! [`crate::toggle`] and must not change independently of it.

use crate::GlossaryTerm;

pub const LABEL_CLASS: &str = "glossary-tooltip-link";
pub const DESCRIPTION_CLASS: &str = "glossary-tooltip-description";
pub const HIDDEN_CLASS: &str = "hidden";
pub const READ_MORE_CLASS: &str = "read-more";
pub const ELLIPSIS: &str = "...";

/// Options that shape the rendered description.
#[derive(Debug, Clone, Copy)]
pub struct TooltipOptions<'a> {
    pub max_description_length: usize,
    pub read_more_label: &'a str,
    pub detail_base_url: Option<&'a str>,
}

/// Renders the full tooltip element for `term`.
pub fn render_tooltip(term: &GlossaryTerm, options: &TooltipOptions<'_>) -> String {
    let mut out = String::with_capacity(160 + term.name.len() + term.description().len());
    out.push_str(&render_label(&term.name));
    out.push_str(r#"<span class=""#);
    out.push_str(DESCRIPTION_CLASS);
    out.push(' ');
    out.push_str(HIDDEN_CLASS);
    out.push_str(r#"">"#);
    out.push_str(&render_description(term, options));
    out.push_str("</span>");
    out
}

pub fn render_label(name: &str) -> String {
    format!(
        r#"<a class="{LABEL_CLASS}" role="button" tabindex="0" aria-expanded="false">{}</a>"#,
        html_escape(name)
    )
}

/// Description text, truncated by character count with a read-more link when
/// a detail URL is known.
pub fn render_description(term: &GlossaryTerm, options: &TooltipOptions<'_>) -> String {
    let description = term.description();
    let Some(excerpt) = truncate_chars(description, options.max_description_length) else {
        return html_escape(description);
    };
    let mut out = html_escape(excerpt);
    out.push_str(ELLIPSIS);
    if let Some(url) = term.resolve_detail_url(options.detail_base_url) {
        out.push_str(&format!(
            r#" <a class="{READ_MORE_CLASS}" target="_blank" href="{}">{}</a>"#,
            html_escape(&url),
            html_escape(options.read_more_label)
        ));
    }
    out
}

/// Returns the first `max_chars` characters when `text` is longer than that.
pub fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Some(&text[..cut]),
        None => None,
    }
}

pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TooltipOptions<'static> {
        TooltipOptions {
            max_description_length: 100,
            read_more_label: "Read more",
            detail_base_url: None,
        }
    }

    #[test]
    fn short_description_renders_in_full() {
        let term = GlossaryTerm::new("Gravity", "x".repeat(50));
        let html = render_tooltip(&term, &options());
        assert_eq!(
            html,
            format!(
                r#"<a class="glossary-tooltip-link" role="button" tabindex="0" aria-expanded="false">Gravity</a><span class="glossary-tooltip-description hidden">{}</span>"#,
                "x".repeat(50)
            )
        );
        assert!(!html.contains("Read more"));
    }

    #[test]
    fn long_description_is_truncated_with_read_more() {
        let description = "abcdefghij".repeat(15);
        let term = GlossaryTerm::new("Gravity", description.clone())
            .with_detail_url("/glossary/gravity");
        let text = render_description(&term, &options());
        assert_eq!(
            text,
            format!(
                r#"{}... <a class="read-more" target="_blank" href="/glossary/gravity">Read more</a>"#,
                &description[..100]
            )
        );
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let term = GlossaryTerm::new("Gravity", "y".repeat(100));
        assert_eq!(render_description(&term, &options()), "y".repeat(100));
    }

    #[test]
    fn truncation_without_detail_url_keeps_only_ellipsis() {
        let term = GlossaryTerm::new("Gravity", "z".repeat(101));
        assert_eq!(
            render_description(&term, &options()),
            format!("{}...", "z".repeat(100))
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let description = "é".repeat(120);
        assert_eq!(truncate_chars(&description, 100), Some("é".repeat(100).as_str()));
        assert_eq!(truncate_chars("ééé", 3), None);
    }

    #[test]
    fn missing_description_renders_empty_wrapper() {
        let mut term = GlossaryTerm::new("Void", "");
        term.description = None;
        let html = render_tooltip(&term, &options());
        assert!(html.ends_with(r#"<span class="glossary-tooltip-description hidden"></span>"#));
    }

    #[test]
    fn markup_is_escaped() {
        let term = GlossaryTerm::new("R&D", "<b>bold</b> \"quoted\"");
        let html = render_tooltip(&term, &options());
        assert!(html.contains(">R&amp;D</a>"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &quot;quoted&quot;"));
    }

    #[test]
    fn configured_label_and_base_url_are_used() {
        let term = GlossaryTerm::new("Orbit", "o".repeat(20)).with_id("7");
        let opts = TooltipOptions {
            max_description_length: 5,
            read_more_label: "Lire la suite",
            detail_base_url: Some("/taxonomy/term"),
        };
        assert_eq!(
            render_description(&term, &opts),
            r#"ooooo... <a class="read-more" target="_blank" href="/taxonomy/term/7">Lire la suite</a>"#
        );
    }
}
