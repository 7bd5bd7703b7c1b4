use html_escape::decode_html_entities;

use crate::categories::CategoryStore;
use crate::error::Result;
use crate::extractors::sections::split_sections;
use crate::wiki::{SiteConfig, Title, NS_CATEGORY};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEntry {
    /// Human-readable link text
    pub anchor: String,
    pub url: String,
}

impl LinkEntry {
    pub fn new(anchor: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            url: url.into(),
        }
    }
}

// Links for the <links> block of a page: one per section, or the page's
// categories if it has no sections at all
pub fn derive_links(
    text: &str,
    page_url: &str,
    page_id: u64,
    site: &SiteConfig,
    categories: &dyn CategoryStore,
) -> Result<Vec<LinkEntry>> {
    let links = section_links(text, page_url);
    if !links.is_empty() {
        return Ok(links);
    }

    category_links(page_id, site, categories)
}

pub fn section_links(text: &str, page_url: &str) -> Vec<LinkEntry> {
    let mut links = Vec::new();
    for heading in split_sections(text).headings() {
        let url = format!("{}#{}", page_url, section_anchor(heading));
        push_unique(&mut links, LinkEntry::new(heading, url));
    }
    links
}

pub fn category_links(
    page_id: u64,
    site: &SiteConfig,
    categories: &dyn CategoryStore,
) -> Result<Vec<LinkEntry>> {
    let mut links = Vec::new();
    for name in categories.category_links(page_id)? {
        let category = Title::new(NS_CATEGORY, &name);
        push_unique(&mut links, LinkEntry::new(category.text(), site.full_url(&category)));
    }
    Ok(links)
}

/// Fragment identifier for a heading, in the legacy MediaWiki form:
/// `Final & Last` becomes `Final_.26_Last`.
pub fn section_anchor(heading: &str) -> String {
    let id = decode_html_entities(heading).replace(' ', "_");
    urlencoding::encode(&id)
        .replace("%3A", ":")
        .replace('%', ".")
        .replace('~', ".7E")
}

// Anchors act as keys: a repeated heading keeps its first position
fn push_unique(links: &mut Vec<LinkEntry>, link: LinkEntry) {
    if !links.iter().any(|existing| existing.anchor == link.anchor) {
        links.push(link);
    }
}
