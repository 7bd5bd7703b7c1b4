//! Streaming reader for MediaWiki XML export files.
//!
//! Turns `<page>` and `<revision>` elements into [`DumpOutput`] events. Only
//! the fields the abstract feed needs are kept; everything else is skipped.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::str::FromStr;
use std::time::SystemTime;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::output::DumpOutput;
use crate::progress::Progress;
use crate::wiki::{PageHandle, RevisionRecord, SiteConfig, NS_MAIN};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevisionMode {
    /// Every revision, in document order
    #[default]
    Full,
    /// Only the last revision of each page
    Current,
}

/// What a dump's `<siteinfo>` says about the wiki.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteInfo {
    pub sitename: String,
    pub dbname: String,
    /// URL of the main page
    pub base: String,
    pub namespaces: BTreeMap<i32, String>,
}

impl SiteInfo {
    pub fn site_config(&self) -> SiteConfig {
        let mut site = SiteConfig::from_base_url(&self.sitename, &self.base);
        if !self.namespaces.is_empty() {
            site.namespaces = self.namespaces.clone();
        }
        site
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub pages: u64,
    pub revisions: u64,
}

pub struct DumpReader<R: BufRead> {
    reader: Reader<R>,
    mode: RevisionMode,
    // Set when a <page> start was consumed while looking for <siteinfo>
    page_pending: bool,
    progress: Option<(Progress, u64)>,
    stats: DumpStats,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(input: R, mode: RevisionMode) -> Self {
        Self {
            reader: Reader::from_reader(input),
            mode,
            page_pending: false,
            progress: None,
            stats: DumpStats::default(),
        }
    }

    /// Log progress every `interval` pages. `total_bytes` is the input size,
    /// or 0 if unknown.
    pub fn with_progress(mut self, total_bytes: u64, interval: u64) -> Self {
        if interval > 0 {
            self.progress = Some((Progress::new(total_bytes, SystemTime::now()), interval));
        }
        self
    }

    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    /// Read up to and including `<siteinfo>`. Returns `None` if the dump has
    /// no site info before its first page.
    pub fn read_site_info(&mut self) -> Result<Option<SiteInfo>> {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"mediawiki" => (),
                    b"siteinfo" => return self.parse_siteinfo().map(Some),
                    b"page" => {
                        self.page_pending = true;
                        return Ok(None);
                    }
                    tag => self.skip(tag)?,
                },
                Event::Eof => return Ok(None),
                _ => (),
            }
        }
    }

    /// Send every page of the dump to `output`, wrapped in stream open and
    /// close events.
    pub fn dump_into<O: DumpOutput + ?Sized>(&mut self, output: &mut O) -> Result<DumpStats> {
        self.stats = DumpStats::default();
        output.write_open_stream("")?;

        if std::mem::take(&mut self.page_pending) {
            self.parse_page(output)?;
        }

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"mediawiki" => (),
                    b"page" => self.parse_page(output)?,
                    tag => {
                        debug!(tag = %String::from_utf8_lossy(tag), "skipping element");
                        self.skip(tag)?;
                    }
                },
                Event::Eof => break,
                _ => (),
            }
        }

        output.write_close_stream("")?;
        info!(
            pages = self.stats.pages,
            revisions = self.stats.revisions,
            "dump complete"
        );
        Ok(self.stats)
    }

    fn parse_siteinfo(&mut self) -> Result<SiteInfo> {
        let mut info = SiteInfo::default();
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"sitename" => info.sitename = self.read_text(b"sitename")?,
                    b"dbname" => info.dbname = self.read_text(b"dbname")?,
                    b"base" => info.base = self.read_text(b"base")?,
                    b"namespaces" => (),
                    b"namespace" => {
                        let key = self.namespace_key(&e)?;
                        let name = self.read_text(b"namespace")?;
                        info.namespaces.insert(key, name);
                    }
                    tag => self.skip(tag)?,
                },
                // The main namespace has no name
                Event::Empty(e) if e.name().as_ref() == b"namespace" => {
                    let key = self.namespace_key(&e)?;
                    info.namespaces.insert(key, String::new());
                }
                Event::End(e) if e.name().as_ref() == b"siteinfo" => return Ok(info),
                Event::Eof => return Err(self.malformed("end of file inside <siteinfo>")),
                _ => (),
            }
        }
    }

    fn parse_page<O: DumpOutput + ?Sized>(&mut self, output: &mut O) -> Result<()> {
        let mut title = String::new();
        let mut namespace = NS_MAIN;
        let mut id = 0;
        let mut is_redirect = false;
        let mut opened = false;
        let mut current = None;

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"title" => title = self.read_text(b"title")?,
                    b"ns" => namespace = self.read_number(b"ns")?,
                    b"id" => id = self.read_number(b"id")?,
                    b"redirect" => {
                        is_redirect = true;
                        self.skip(b"redirect")?;
                    }
                    b"revision" => {
                        let revision = self.parse_revision(id)?;
                        match self.mode {
                            RevisionMode::Full => {
                                if !opened {
                                    let page = page_handle(&title, namespace, id, is_redirect);
                                    output.write_open_page(&page, "")?;
                                    opened = true;
                                }
                                output.write_revision(&revision, "")?;
                                self.stats.revisions += 1;
                            }
                            RevisionMode::Current => current = Some(revision),
                        }
                    }
                    tag => self.skip(tag)?,
                },
                Event::Empty(e) if e.name().as_ref() == b"redirect" => is_redirect = true,
                Event::End(e) if e.name().as_ref() == b"page" => break,
                Event::Eof => return Err(self.malformed("end of file inside <page>")),
                _ => (),
            }
        }

        if !opened {
            let page = page_handle(&title, namespace, id, is_redirect);
            output.write_open_page(&page, "")?;
        }
        if let Some(revision) = current {
            output.write_revision(&revision, "")?;
            self.stats.revisions += 1;
        }
        output.write_close_page("")?;

        self.stats.pages += 1;
        self.report_progress();
        Ok(())
    }

    fn parse_revision(&mut self, page_id: u64) -> Result<RevisionRecord> {
        let mut revision = RevisionRecord::new(0, page_id, String::new());

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"id" => revision.id = self.read_number(b"id")?,
                    b"text" => revision.text = self.read_text(b"text")?,
                    // contributor, comment, timestamp, sha1, ...
                    tag => self.skip(tag)?,
                },
                Event::End(e) if e.name().as_ref() == b"revision" => return Ok(revision),
                Event::Eof => return Err(self.malformed("end of file inside <revision>")),
                // <text deleted="deleted" /> and friends
                _ => (),
            }
        }
    }

    // Text content of the element whose start tag was just read
    fn read_text(&mut self, tag: &[u8]) -> Result<String> {
        let mut text = String::new();

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match self.reader.read_event_into(&mut buffer)? {
                Event::Text(e) => {
                    // Invalid UTF-8 is replaced rather than rejected
                    let raw = String::from_utf8_lossy(&e);
                    text.push_str(&unescape(&raw).map_err(quick_xml::Error::from)?);
                }
                Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
                Event::Start(e) => self.skip(e.name().as_ref())?,
                Event::End(e) if e.name().as_ref() == tag => return Ok(text),
                Event::Eof => {
                    let reason = format!(
                        "end of file inside <{}>",
                        String::from_utf8_lossy(tag)
                    );
                    return Err(self.malformed(&reason));
                }
                _ => (),
            }
        }
    }

    fn read_number<T: FromStr>(&mut self, tag: &[u8]) -> Result<T> {
        let text = self.read_text(tag)?;
        text.trim().parse().map_err(|_| {
            let reason = format!("<{}> is not a number: {:?}", String::from_utf8_lossy(tag), text);
            self.malformed(&reason)
        })
    }

    fn namespace_key(&self, e: &BytesStart) -> Result<i32> {
        let key = e
            .try_get_attribute("key")?
            .ok_or_else(|| self.malformed("<namespace> without key"))?;
        let value = key.unescape_value()?;
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(&format!("bad namespace key {:?}", value)))
    }

    fn skip(&mut self, tag: &[u8]) -> Result<()> {
        let mut garbage = Vec::new();
        self.reader.read_to_end_into(QName(tag), &mut garbage)?;
        Ok(())
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::MalformedDump {
            position: self.reader.buffer_position(),
            reason: reason.to_string(),
        }
    }

    fn report_progress(&mut self) {
        let position = self.reader.buffer_position() as u64;
        if let Some((progress, interval)) = self.progress.as_mut() {
            if self.stats.pages % *interval == 0 {
                let report = progress.progress(
                    self.stats.pages,
                    self.stats.revisions,
                    position,
                    SystemTime::now(),
                );
                info!("{}", report);
            }
        }
    }
}

// Dumps give prefixed titles ("Talk:Foo"); pages are keyed by the bare title
fn page_handle(title: &str, namespace: i32, id: u64, is_redirect: bool) -> PageHandle {
    let bare = match title.split_once(':') {
        Some((_, rest)) if namespace != NS_MAIN => rest,
        _ => title,
    };
    PageHandle::new(namespace, bare, id, is_redirect)
}
