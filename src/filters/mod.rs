//! Filters sit between the dump reader and the final sink.
//!
//! Predicate filters ([`DumpFilter`]) decide per page whether its events go
//! any further; chaining several of them ANDs their predicates. The
//! [`AbstractFilter`] replaces the page XML with an abstract feed.

mod abstract_filter;
mod registry;

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::output::DumpOutput;
use crate::wiki::{namespace_id, PageHandle, RevisionRecord};

pub use abstract_filter::AbstractFilter;
pub use registry::{register_abstract_filters, FilterContext, FilterFactory, FilterRegistry, FilterSpec};

pub trait PagePredicate {
    fn pass(&self, page: &PageHandle) -> bool;
}

/// Forwards a page's events only when the predicate accepts the page.
/// Stream open and close always go through.
pub struct DumpFilter<P, S> {
    predicate: P,
    sink: S,
    sending_this_page: bool,
}

impl<P: PagePredicate, S: DumpOutput> DumpFilter<P, S> {
    pub fn new(predicate: P, sink: S) -> Self {
        Self {
            predicate,
            sink,
            sending_this_page: false,
        }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<P: PagePredicate, S: DumpOutput> DumpOutput for DumpFilter<P, S> {
    fn write_open_stream(&mut self, xml: &str) -> Result<()> {
        self.sink.write_open_stream(xml)
    }

    fn write_close_stream(&mut self, xml: &str) -> Result<()> {
        self.sink.write_close_stream(xml)
    }

    fn write_open_page(&mut self, page: &PageHandle, xml: &str) -> Result<()> {
        self.sending_this_page = self.predicate.pass(page);
        if self.sending_this_page {
            self.sink.write_open_page(page, xml)
        } else {
            debug!(page_id = page.id, title = %page.title, "page filtered out");
            Ok(())
        }
    }

    fn write_close_page(&mut self, xml: &str) -> Result<()> {
        if self.sending_this_page {
            self.sending_this_page = false;
            self.sink.write_close_page(xml)
        } else {
            Ok(())
        }
    }

    fn write_revision(&mut self, revision: &RevisionRecord, xml: &str) -> Result<()> {
        if self.sending_this_page {
            self.sink.write_revision(revision, xml)
        } else {
            Ok(())
        }
    }
}

/// Lets through pages that aren't redirects.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedirectPredicate;

impl RedirectPredicate {
    pub fn is_eligible(&self, page: &PageHandle) -> bool {
        !page.is_redirect
    }
}

impl PagePredicate for RedirectPredicate {
    fn pass(&self, page: &PageHandle) -> bool {
        self.is_eligible(page)
    }
}

pub type NoredirectFilter<S> = DumpFilter<RedirectPredicate, S>;

/// Lets through pages in the listed namespaces, or with a leading `!`, pages
/// in any other namespace.
///
/// Parsed from a comma separated list of `NS_*` constants or numbers:
/// `NS_MAIN`, `0,1`, `!NS_USER,NS_USER_TALK`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespacePredicate {
    namespaces: BTreeSet<i32>,
    invert: bool,
}

impl NamespacePredicate {
    pub fn new(namespaces: impl IntoIterator<Item = i32>, invert: bool) -> Self {
        Self {
            namespaces: namespaces.into_iter().collect(),
            invert,
        }
    }
}

impl PagePredicate for NamespacePredicate {
    fn pass(&self, page: &PageHandle) -> bool {
        self.namespaces.contains(&page.namespace) != self.invert
    }
}

impl FromStr for NamespacePredicate {
    type Err = Error;

    fn from_str(param: &str) -> Result<Self> {
        let invalid = || Error::InvalidFilterParam {
            filter: "namespace".to_string(),
            param: param.to_string(),
        };

        let trimmed = param.trim();
        let (invert, list) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let namespaces = list
            .split(',')
            .map(|key| namespace_id(key).ok_or_else(invalid))
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(Self { namespaces, invert })
    }
}
