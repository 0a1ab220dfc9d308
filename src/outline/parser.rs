use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use pulldown_cmark::{Event, HeadingLevel, Tag};
use std::fmt::Display;

use crate::{
    cmark::{CMarkParser, EventIteratorExt},
    error::{Error, Result},
    model::{Category, DocId, Entry, Sidebar, Sidebars},
};

/// Read sidebars back from a Markdown outline.
pub fn parse(source: &str) -> Result<Sidebars> {
    OutlineParser::new(source).parse()
}

struct OutlineParser<'a> {
    parser: CMarkParser<'a>,
}

impl<'a> OutlineParser<'a> {
    fn new(source: &'a str) -> Self {
        let parser = CMarkParser::new(source);

        Self { parser }
    }

    fn parse(mut self) -> Result<Sidebars> {
        let mut sidebars = Sidebars::new();

        loop {
            match self.parser.peek_event() {
                Some(Event::Start(Tag::Heading(HeadingLevel::H1, ..))) => {
                    self.parser.next_event();
                    let name = self.parse_heading(HeadingLevel::H1);
                    let sidebar = self.parse_sidebar()?;

                    if sidebars.insert(name.clone(), sidebar).is_some() {
                        bail!(self.parse_error(format!("Sidebar `{name}` is declared twice.")));
                    }
                }
                Some(Event::Start(Tag::List(..))) => {
                    bail!(self.parse_error("Entries must follow a `#` sidebar heading."))
                }
                Some(_) => self.parser.skip_block(),
                None => break,
            }
        }

        Ok(sidebars)
    }

    fn parse_heading(&mut self, level: HeadingLevel) -> String {
        self.parser
            .consume_until(|event| matches!(event, Event::End(Tag::Heading(end, ..)) if *end == level))
            .iter()
            .plain_text()
            .trim()
            .to_string()
    }

    fn parse_sidebar(&mut self) -> Result<Sidebar> {
        let items = self.parse_entries()?;

        if !matches!(
            self.parser.peek_event(),
            Some(Event::Start(Tag::Heading(HeadingLevel::H2, ..)))
        ) {
            return Ok(Sidebar::Items(items));
        }

        if !items.is_empty() {
            bail!(self.parse_error("Entries cannot precede the first `##` section heading."));
        }

        let mut sections = IndexMap::new();

        while let Some(Event::Start(Tag::Heading(HeadingLevel::H2, ..))) = self.parser.peek_event()
        {
            self.parser.next_event();
            let label = self.parse_heading(HeadingLevel::H2);
            let entries = self.parse_entries()?;

            if sections.insert(label.clone(), entries).is_some() {
                bail!(self.parse_error(format!("Section `{label}` is declared twice.")));
            }
        }

        Ok(Sidebar::Sections(sections))
    }

    /// Collect the entries of every list up to the next sidebar or section heading.
    fn parse_entries(&mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();

        loop {
            match self.parser.peek_event() {
                Some(Event::Start(Tag::Heading(HeadingLevel::H1 | HeadingLevel::H2, ..))) => break,
                Some(Event::Start(Tag::List(..))) => {
                    self.parser.next_event();
                    entries.extend(self.parse_list()?);
                }
                Some(_) => self.parser.skip_block(),
                None => break,
            }
        }

        Ok(entries)
    }

    /// Parse the items of a list whose start tag was already consumed.
    fn parse_list(&mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();

        loop {
            match self.parser.next_event() {
                Some(Event::Start(Tag::Item)) => entries.push(self.parse_item()?),
                Some(Event::End(Tag::List(..))) => break,
                Some(_) => (),
                None => bail!(self.parse_error("Unexpected end of outline inside a list.")),
            }
        }

        Ok(entries)
    }

    /// Parse a list item whose start tag was already consumed.
    fn parse_item(&mut self) -> Result<Entry> {
        let mut text = String::new();
        let mut entry = None;

        loop {
            match self.parser.next_event() {
                Some(Event::Start(Tag::Link(_, href, _))) => {
                    self.parser
                        .consume_until(|event| matches!(event, Event::End(Tag::Link(..))));

                    if entry.is_some() || !text.trim().is_empty() {
                        bail!(self.parse_error("A document item must contain only its link."));
                    }

                    entry = Some(Entry::Doc(doc_id_from_href(&href)));
                }
                Some(Event::Start(Tag::List(..))) => {
                    let items = self.parse_list()?;

                    if entry.is_some() {
                        bail!(self.parse_error("Documents cannot have nested entries."));
                    }

                    let label = text.trim();
                    if label.is_empty() {
                        bail!(self.parse_error("A nested list must follow a category label."));
                    }

                    entry = Some(Entry::Category(Category::new(label, items)));
                }
                Some(Event::Text(part)) | Some(Event::Code(part)) => text.push_str(&part),
                Some(Event::SoftBreak) | Some(Event::HardBreak) => text.push(' '),
                Some(Event::End(Tag::Item)) => break,
                Some(_) => (),
                None => bail!(self.parse_error("Unexpected end of outline inside a list item.")),
            }
        }

        entry.ok_or_else(|| {
            self.parse_error(format!(
                "Item `{}` is neither a document link nor a category with nested entries.",
                text.trim()
            ))
        })
    }

    fn parse_error(&self, message: impl Display) -> Error {
        let position = self.parser.position();

        anyhow!(
            "failed to parse outline line: {}, column: {}: {}",
            position.line,
            position.column,
            message
        )
    }
}

fn doc_id_from_href(href: &str) -> DocId {
    let href = decode_href(href);
    let href = href.strip_prefix("./").unwrap_or(&href);
    let id = href
        .strip_suffix(".mdx")
        .or_else(|| href.strip_suffix(".md"))
        .unwrap_or(href);

    DocId::new(id)
}

/// Decode `%XX` escapes in a single pass, so `%2520` reads back as `%20`.
fn decode_href(href: &str) -> String {
    let bytes = href.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        let escape = bytes
            .get(index + 1..index + 3)
            .filter(|_| bytes[index] == b'%')
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match escape {
            Some(byte) => {
                decoded.push(byte);
                index += 3;
            }
            None => {
                decoded.push(bytes[index]);
                index += 1;
            }
        }
    }

    String::from_utf8(decoded).unwrap_or_else(|_| href.to_string())
}
