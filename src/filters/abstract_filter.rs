use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::categories::CategoryStore;
use crate::error::Result;
use crate::extractors::links::derive_links;
use crate::output::{element, sublink, DumpOutput};
use crate::wiki::{PageHandle, RevisionRecord, SiteConfig};
use crate::wikitext_parser::extract_abstract;

/// Throws away the page XML and writes an abstract feed instead:
///
/// ```xml
/// <feed>
/// <doc>
/// <title>Sitename: Page title</title>
/// <url>https://example.org/wiki/Page_title</url>
/// <abstract>First sentences of the page.</abstract>
/// <links>
/// <sublink linktype="nav"><anchor>History</anchor><link>https://example.org/wiki/Page_title#History</link></sublink>
/// </links>
/// </doc>
/// </feed>
/// ```
///
/// Only the last revision delivered for a page is summarised. The host must
/// deliver the current revision last; revisions are not compared.
pub struct AbstractFilter<S> {
    sink: S,
    site: Arc<SiteConfig>,
    categories: Arc<dyn CategoryStore>,
    state: ExtractionState,
    docs: u64,
}

// Lives for one page
#[derive(Debug, Default)]
struct ExtractionState {
    page: Option<CurrentPage>,
    revision: Option<RevisionRecord>,
}

#[derive(Debug)]
struct CurrentPage {
    id: u64,
    url: String,
}

impl<S: DumpOutput> AbstractFilter<S> {
    pub fn new(sink: S, site: Arc<SiteConfig>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            sink,
            site,
            categories,
            state: ExtractionState::default(),
            docs: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    fn doc_body(&self, revision: &RevisionRecord, page_url: &str) -> Result<String> {
        let mut xml = element("abstract", &extract_abstract(&revision.text));
        xml.push('\n');

        let links = derive_links(
            &revision.text,
            page_url,
            revision.page_id,
            &self.site,
            self.categories.as_ref(),
        )?;

        xml.push_str("<links>\n");
        for link in &links {
            xml.push_str(&sublink("nav", &link.anchor, &link.url));
        }
        // TODO: image links, with linktype="image"
        xml.push_str("</links>\n");

        Ok(xml)
    }
}

impl<S: DumpOutput> DumpOutput for AbstractFilter<S> {
    fn write_open_stream(&mut self, _xml: &str) -> Result<()> {
        self.docs = 0;
        self.sink.write_open_stream("<feed>\n")
    }

    fn write_close_stream(&mut self, _xml: &str) -> Result<()> {
        info!(docs = self.docs, "abstract feed complete");
        self.sink.write_close_stream("</feed>\n")
    }

    fn write_open_page(&mut self, page: &PageHandle, _xml: &str) -> Result<()> {
        let title = page.title();
        let url = self.site.full_url(&title);
        let display_title = format!("{}: {}", self.site.sitename, self.site.prefixed_text(&title));
        debug!(page_id = page.id, title = %display_title, "opening doc");

        let xml = format!(
            "<doc>\n{}\n{}\n",
            element("title", &display_title),
            element("url", &url)
        );

        // Abstract and links come once we have revision data
        self.state = ExtractionState {
            page: Some(CurrentPage { id: page.id, url }),
            revision: None,
        };

        self.sink.write_open_page(page, &xml)
    }

    fn write_close_page(&mut self, _xml: &str) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let Some(page) = state.page else {
            debug!("close page without an open page, nothing to write");
            return Ok(());
        };

        let mut xml = match &state.revision {
            Some(revision) => self.doc_body(revision, &page.url)?,
            None => {
                debug!(page_id = page.id, "no revision for page");
                String::new()
            }
        };
        xml.push_str("</doc>\n");

        self.docs += 1;
        self.sink.write_close_page(&xml)
    }

    fn write_revision(&mut self, revision: &RevisionRecord, _xml: &str) -> Result<()> {
        trace!(revision_id = revision.id, page_id = revision.page_id, "keeping revision");
        self.state.revision = Some(revision.clone());
        Ok(())
    }
}
