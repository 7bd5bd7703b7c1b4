//! Splitting wikitext into sections on `== Header ==` and `<h2>Header</h2>` lines.

use nom::bytes::complete::{tag, tag_no_case, take_until, take_while1};
use nom::character::complete::one_of;
use nom::sequence::{pair, preceded, terminated};
use nom::IResult;

use crate::wikitext_parser::{cleanup_text, collapse_links, strip_tags};

#[derive(Debug, PartialEq, Eq)]
pub struct Section<'a> {
    /// The header line as written, e.g. `==History==`
    pub header: &'a str,
    /// Readable heading text, e.g. `History`
    pub heading: String,
    /// Text up to the next header
    pub body: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Text before the first header
    pub lead: &'a str,
    pub sections: Vec<Section<'a>>,
}

impl<'a> Sections<'a> {
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.heading.as_str())
    }
}

pub fn split_sections(text: &str) -> Sections<'_> {
    // (start, end, heading) of every header line
    let mut headers = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        if let Some((len, heading)) = header_line(line) {
            headers.push((line_start, line_start + len, heading));
        }
        line_start += line.len() + 1;
    }

    let lead_end = headers.first().map_or(text.len(), |(start, _, _)| *start);

    let sections = headers
        .iter()
        .enumerate()
        .map(|(i, (start, end, heading))| {
            let body_end = headers
                .get(i + 1)
                .map_or(text.len(), |(next_start, _, _)| *next_start);
            Section {
                header: &text[*start..*end],
                heading: heading.clone(),
                body: &text[*end..body_end],
            }
        })
        .collect();

    Sections {
        lead: &text[..lead_end],
        sections,
    }
}

// Returns the length of the header at the start of the line and its heading
fn header_line(line: &str) -> Option<(usize, String)> {
    if let Some(end) = wikitext_header(line) {
        return Some((end, clean_heading(&header_text(&line[..end]))));
    }

    html_header(line).map(|(end, inner)| (end, clean_heading(&strip_tags(inner))))
}

// Drop the opening equals signs and the first closing run, keeping anything
// after it: `==a=b==` reads `ab==`
fn header_text(header: &str) -> String {
    let rest = equals_run(header).map_or(header, |(rest, _)| rest).trim_start();
    match rest.find('=') {
        Some(idx) => {
            let after = rest[idx..].trim_start_matches('=');
            format!("{}{}", rest[..idx].trim_end(), after)
        }
        None => rest.to_string(),
    }
}

fn clean_heading(heading: &str) -> String {
    cleanup_text(collapse_links(heading).trim())
}

// A header only ends where whitespace or the end of the line follows
fn ends_header(rest: &str) -> bool {
    rest.chars().next().map_or(true, char::is_whitespace)
}

fn equals_run(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == '=')(input)
}

// `=Header=`: opening equals signs, at least one character, closing equals
// signs. The shortest such prefix that ends the header wins, trying the
// whole opening run first.
fn wikitext_header(line: &str) -> Option<usize> {
    let (rest, open) = equals_run(line).ok()?;

    let after_open = rest.chars().next().map(|c| open.len() + c.len_utf8());
    after_open
        .and_then(|start| closing_equals(line, start))
        .or_else(|| closing_equals(line, 2))
}

// End of the first `=` at or after `start` that ends the header
fn closing_equals(line: &str, start: usize) -> Option<usize> {
    line.get(start..)?
        .char_indices()
        .filter(|(_, c)| *c == '=')
        .map(|(idx, _)| start + idx + 1)
        .find(|&end| ends_header(&line[end..]))
}

fn html_header_open(input: &str) -> IResult<&str, char> {
    terminated(
        preceded(tag_no_case("<h"), one_of("123456")),
        pair(take_until(">"), tag(">")),
    )(input)
}

fn html_header_close(input: &str) -> IResult<&str, char> {
    terminated(
        preceded(tag_no_case("</h"), one_of("123456")),
        pair(take_until(">"), tag(">")),
    )(input)
}

// `<h2 id="x">Header</h2>`, returning the end of the closing tag and the
// inner text
fn html_header(line: &str) -> Option<(usize, &str)> {
    let (body, _) = html_header_open(line).ok()?;
    let body_start = line.len() - body.len();

    // ASCII lowercasing keeps byte offsets intact
    let lowered = line.to_ascii_lowercase();
    let result = lowered[body_start..]
        .match_indices("</h")
        .map(|(idx, _)| body_start + idx)
        .find_map(|close_start| {
            let (after, _) = html_header_close(&line[close_start..]).ok()?;
            let end = line.len() - after.len();
            ends_header(after).then(|| (end, &line[body_start..close_start]))
        });
    result
}
