use super::*;

#[test]
fn bold_and_italics() {
    assert_eq!(
        strip_markup("'''Bold''' and ''italic'' and '''''both'''''"),
        "Bold and italic and both"
    );
}

#[test]
fn comments_across_lines() {
    assert_eq!(strip_markup("Before<!-- hidden\nnote -->After"), "BeforeAfter");
    assert_eq!(strip_markup("a<!-- one -->b<!-- two -->c"), "abc");
}

#[test]
fn html_tags() {
    assert_eq!(
        strip_markup("Some <span class=\"x\">styled</span> text<br/>"),
        "Some styled text"
    );
    assert_eq!(strip_markup("H<sub>2</sub>O"), "H2O");
}

#[test]
fn external_links_keep_label() {
    assert_eq!(
        strip_markup("See [http://example.org the example site] now"),
        "See the example site now"
    );
}

#[test]
fn templates_are_removed() {
    assert_eq!(
        strip_markup("{{Infobox person\n| name = X\n}}X is a person."),
        "X is a person."
    );
    assert_eq!(strip_markup("Value: {{{1}}}!"), "Value: !");
}

#[test]
fn wikilinks_collapse_to_label() {
    assert_eq!(strip_markup("A [[Target|Label]] link"), "A Label link");
    assert_eq!(strip_markup("A [[Target]] link"), "A Target link");
}

#[test]
fn character_references_are_decoded() {
    assert_eq!(strip_markup("Fish &amp; chips &#8212; &#x41;"), "Fish & chips — A");
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    assert_eq!(strip_markup("\n\n  Text \n"), "Text");
}

#[test]
fn markup_created_by_stripping_does_not_survive() {
    assert_eq!(strip_markup("'<b>'x"), "x");
    assert_eq!(strip_markup("a &lt;b&gt;bold&lt;/b&gt; c"), "a bold c");
    assert_eq!(strip_markup("&#39;&#39;x&#39;&#39;"), "x");
    assert_eq!(strip_markup("dangling <!-- comment"), "dangling  comment");
}

#[test]
fn stripped_text_has_no_markup_left() {
    let inputs = [
        "''''''''",
        "'''''<!-- x -->'''",
        "<<b>b>text</</b>b>",
        "<!<!---->-- -->",
        "&lt;!-- &lt;i&gt; --&gt;",
        "'<!---->'<br>'",
    ];
    for input in inputs {
        let output = strip_markup(input);
        assert!(!output.contains("''"), "{input:?} -> {output:?}");
        assert!(!output.contains("<!--"), "{input:?} -> {output:?}");
        assert!(!output.contains("-->"), "{input:?} -> {output:?}");
        assert!(!TAG.is_match(&output), "{input:?} -> {output:?}");
    }
}

#[test]
fn first_two_sentences() {
    assert_eq!(
        extract_start("A short first paragraph. A second paragraph."),
        "A short first paragraph. A second paragraph."
    );
    assert_eq!(extract_start("One. Two! Three? Four."), "One. Two!");
    assert_eq!(extract_start("Really?! Yes... And more."), "Really?! Yes...");
}

#[test]
fn no_terminators_returns_everything() {
    assert_eq!(extract_start("No terminators here"), "No terminators here");
}

#[test]
fn single_sentence_returns_everything() {
    assert_eq!(extract_start("Just one. And a tail"), "Just one. And a tail");
}

#[test]
fn cjk_terminators() {
    assert_eq!(extract_start("これは文です。二つ目。三つ目。"), "これは文です。二つ目。");
    assert_eq!(extract_start("Ａ！Ｂ？Ｃ．"), "Ａ！Ｂ？");
    assert_eq!(extract_start("ｱ｡ｲ｡ｳ｡"), "ｱ｡ｲ｡");
}

#[test]
fn sentences_do_not_span_lines() {
    assert_eq!(extract_start("One.\nTwo. Three."), "One.\nTwo. Three.");
}

#[test]
fn paragraphs() {
    assert_eq!(
        first_paragraph("A short first paragraph.\n\nA second paragraph."),
        "A short first paragraph."
    );
    assert_eq!(first_paragraph("Line one\nline two\n \nNext"), "Line one\nline two");
    assert_eq!(first_paragraph(""), "");
}

#[test]
fn truncation_is_character_safe() {
    let text = "é".repeat(2000);
    let truncated = truncate_chars(&text, ABSTRACT_MAX_CHARS);
    assert_eq!(truncated.chars().count(), ABSTRACT_MAX_CHARS);
    assert_eq!(truncate_chars("short", 10), "short");
}

#[test]
fn cleanup_replaces_invalid_xml_characters() {
    assert_eq!(cleanup_text("a\u{0}b\u{1F}c\td\n"), "a\u{FFFD}b\u{FFFD}c\td\n");
    assert_eq!(cleanup_text("\u{FFFE}ok"), "\u{FFFD}ok");
}

#[test]
fn abstract_uses_lead_section() {
    assert_eq!(extract_abstract("Text1\n\n=Subsection 1="), "Text1");
}

#[test]
fn abstract_uses_first_paragraph() {
    let text = "A short first paragraph.\n\nA second paragraph.\n\n\n=Subsection 1=\nMore.";
    assert_eq!(extract_abstract(text), "A short first paragraph.");
}

#[test]
fn abstract_of_wikilinked_text() {
    let text = "'''Rust''' is a [[Programming language|language]]. It is {{lang|fast}}fast. Really.";
    assert_eq!(extract_abstract(text), "Rust is a language. It is fast.");
}

#[test]
fn abstract_is_bounded() {
    let text = "word ".repeat(1000);
    let abstract_text = extract_abstract(&text);
    assert!(abstract_text.chars().count() <= ABSTRACT_MAX_CHARS);

    let text = "長".repeat(3000);
    assert_eq!(extract_abstract(&text).chars().count(), ABSTRACT_MAX_CHARS);
}

#[test]
fn abstract_of_empty_text() {
    assert_eq!(extract_abstract(""), "");
    assert_eq!(extract_abstract("== Only a header =="), "");
    assert_eq!(extract_abstract("== One ==\n<!-- nothing -->\n== Two ==\n"), "");
}

#[test]
fn abstract_of_page_starting_with_header() {
    assert_eq!(
        extract_abstract("==History==\nRust was created in 2006. It is fast. Very."),
        "Rust was created in 2006. It is fast."
    );
    assert_eq!(
        extract_abstract("==Empty==\n\n==Usage==\nUsed ''widely''.\n\nSecond paragraph."),
        "Used widely."
    );
}

#[test]
fn lead_wins_over_sections() {
    assert_eq!(
        extract_abstract("Lead text.\n==History==\nSection text."),
        "Lead text."
    );
}
