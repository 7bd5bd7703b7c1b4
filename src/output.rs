//! The sink side of a dump: everything that receives page events.

use std::io::Write;

use quick_xml::escape::{escape, partial_escape};

use crate::error::Result;
use crate::wiki::{PageHandle, RevisionRecord};

/// Receives the events of a dump run, in the order
/// open-stream, (open-page, revision*, close-page)*, close-stream.
///
/// Each call carries the XML fragment produced upstream for that event.
/// Filters forward, drop or replace fragments; terminal sinks write them.
pub trait DumpOutput {
    fn write_open_stream(&mut self, xml: &str) -> Result<()>;

    fn write_close_stream(&mut self, xml: &str) -> Result<()>;

    fn write_open_page(&mut self, page: &PageHandle, xml: &str) -> Result<()>;

    fn write_close_page(&mut self, xml: &str) -> Result<()>;

    fn write_revision(&mut self, revision: &RevisionRecord, xml: &str) -> Result<()>;
}

impl<T: DumpOutput + ?Sized> DumpOutput for Box<T> {
    fn write_open_stream(&mut self, xml: &str) -> Result<()> {
        (**self).write_open_stream(xml)
    }

    fn write_close_stream(&mut self, xml: &str) -> Result<()> {
        (**self).write_close_stream(xml)
    }

    fn write_open_page(&mut self, page: &PageHandle, xml: &str) -> Result<()> {
        (**self).write_open_page(page, xml)
    }

    fn write_close_page(&mut self, xml: &str) -> Result<()> {
        (**self).write_close_page(xml)
    }

    fn write_revision(&mut self, revision: &RevisionRecord, xml: &str) -> Result<()> {
        (**self).write_revision(revision, xml)
    }
}

/// Writes every fragment verbatim to a writer: a file, stdout, a buffer.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DumpOutput for WriterSink<W> {
    fn write_open_stream(&mut self, xml: &str) -> Result<()> {
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_close_stream(&mut self, xml: &str) -> Result<()> {
        self.writer.write_all(xml.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_open_page(&mut self, _page: &PageHandle, xml: &str) -> Result<()> {
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_close_page(&mut self, xml: &str) -> Result<()> {
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_revision(&mut self, _revision: &RevisionRecord, xml: &str) -> Result<()> {
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }
}

// <name>text</name>
pub fn element(name: &str, text: &str) -> String {
    format!("<{name}>{}</{name}>", partial_escape(text))
}

/// A `<sublink>` of the given link type, on a single line.
pub fn sublink(link_type: &str, anchor: &str, url: &str) -> String {
    format!(
        "<sublink linktype=\"{}\">{}{}</sublink>\n",
        escape(link_type),
        element("anchor", anchor),
        element("link", url)
    )
}
