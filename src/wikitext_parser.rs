use html_escape::decode_html_entities;
use lazy_static::lazy_static;
use regex::Regex;

use crate::extractors::sections::split_sections;

/// Upper bound on the abstract, in characters.
pub const ABSTRACT_MAX_CHARS: usize = 1024;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref COMMENT_DELIMITER: Regex = Regex::new(r"<!--|-->").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)</?[A-Za-z0-9]+.*?>").unwrap();
    // [http://example.org Label]
    static ref EXTERNAL_LINK: Regex = Regex::new(r"(?s)\[[a-z]+:.*? (.*?)\]").unwrap();
    static ref TEMPLATE_PARAMETER: Regex = Regex::new(r"(?s)\{\{\{.*?\}\}\}").unwrap();
    static ref TEMPLATE: Regex = Regex::new(r"(?s)\{\{.*?\}\}").unwrap();
    // [[Target]] and [[Target|Label]]
    static ref WIKILINK: Regex = Regex::new(r"(?s)\[\[(?:[^|\]]*\|)?(.*?)\]\]").unwrap();
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
    // Sentence terminators: ASCII, full-width ideographic, double-width roman
    // and half-width ideographic forms
    static ref FIRST_TWO_SENTENCES: Regex =
        Regex::new(r"^(.*?[.!?。．！？｡]+.*?[.!?。．！？｡]+)").unwrap();
}

// Take a page's wikitext and build the plain-text abstract for it
pub fn extract_abstract(wikitext: &str) -> String {
    // The lead section describes the page as a whole. Pages that open with
    // a header are summarised from their first section with any text.
    let sections = split_sections(wikitext);
    let stripped = std::iter::once(sections.lead)
        .chain(sections.sections.iter().map(|section| section.body))
        .map(strip_markup)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let start = extract_start(first_paragraph(&stripped));

    cleanup_text(truncate_chars(start, ABSTRACT_MAX_CHARS))
}

/// Strip wikitext and HTML markup, leaving plain text.
///
/// Malformed markup is not an error: whatever the patterns don't recognise
/// is left in the text.
pub fn strip_markup(text: &str) -> String {
    let text = remove_emphasis(text);
    let text = COMMENT.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = EXTERNAL_LINK.replace_all(&text, "${1}");
    let text = TEMPLATE_PARAMETER.replace_all(&text, "");
    let text = TEMPLATE.replace_all(&text, "");
    let text = collapse_links(&text);
    let text = decode_html_entities(&text);

    // Removing and decoding can put together markup that wasn't there before,
    // e.g. `'<b>'` or `&lt;b&gt;`
    let text = sweep_residue(text.into_owned());

    text.trim().to_string()
}

/// Keep the first two sentences of the text, or all of it if it has no
/// sentence terminators.
pub fn extract_start(text: &str) -> &str {
    FIRST_TWO_SENTENCES
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text, |m| m.as_str())
}

pub fn first_paragraph(text: &str) -> &str {
    PARAGRAPH_BREAK.split(text).next().unwrap_or_default().trim()
}

// [[Target|Label]] -> Label
pub fn collapse_links(text: &str) -> String {
    WIKILINK.replace_all(text, "${1}").into_owned()
}

pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Cut the text to at most `max` characters, never inside a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Replace characters that can't appear in an XML 1.0 document with U+FFFD.
pub fn cleanup_text(text: &str) -> String {
    text.chars()
        .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
        .collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

// Bold and italics
fn remove_emphasis(text: &str) -> String {
    text.replace("'''", "").replace("''", "")
}

fn sweep_residue(mut text: String) -> String {
    loop {
        let swept = remove_emphasis(&text);
        let swept = COMMENT.replace_all(&swept, "");
        let swept = TAG.replace_all(&swept, "");
        let swept = COMMENT_DELIMITER.replace_all(&swept, "").into_owned();

        // Every pass that changes something makes the text shorter
        if swept == text {
            return text;
        }
        text = swept;
    }
}

#[cfg(test)]
mod tests;
