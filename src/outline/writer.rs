use pulldown_cmark::{CowStr, Event, HeadingLevel, LinkType, Tag};

use crate::{
    cmark::EventIteratorExt,
    error::Result,
    model::{DocumentIndex, Entry, Sidebar, Sidebars},
};

/// Write sidebars as a Markdown outline. Document links are labelled from
/// `documents` when given, and with their id otherwise.
pub fn render(sidebars: &Sidebars, documents: Option<&DocumentIndex>) -> Result<String> {
    let mut writer = OutlineWriter {
        events: Vec::new(),
        documents,
    };

    for (name, sidebar) in sidebars.iter() {
        writer.heading(HeadingLevel::H1, name);

        match sidebar {
            Sidebar::Items(entries) => writer.list(entries),
            Sidebar::Sections(sections) => {
                for (label, entries) in sections {
                    writer.heading(HeadingLevel::H2, label);
                    writer.list(entries);
                }
            }
        }
    }

    let mut outline = writer.events.iter().stringify()?;
    if !outline.ends_with('\n') {
        outline.push('\n');
    }

    Ok(outline)
}

struct OutlineWriter<'a> {
    events: Vec<Event<'static>>,
    documents: Option<&'a DocumentIndex>,
}

impl<'a> OutlineWriter<'a> {
    fn heading(&mut self, level: HeadingLevel, text: &str) {
        self.events
            .push(Event::Start(Tag::Heading(level, None, Vec::new())));
        self.events.push(Event::Text(escape(text)));
        self.events
            .push(Event::End(Tag::Heading(level, None, Vec::new())));
    }

    fn list(&mut self, entries: &[Entry]) {
        if entries.is_empty() {
            return;
        }

        self.events.push(Event::Start(Tag::List(None)));

        for entry in entries {
            self.events.push(Event::Start(Tag::Item));

            match entry {
                Entry::Doc(id) => {
                    let label = self
                        .documents
                        .and_then(|documents| documents.get(id.as_str()))
                        .map_or(id.as_str(), |document| document.label());
                    let destination = owned(&format!("{}.md", encode_href(id.as_str())));

                    self.events.push(Event::Start(Tag::Link(
                        LinkType::Inline,
                        destination.clone(),
                        CowStr::Borrowed(""),
                    )));
                    self.events.push(Event::Text(escape(label)));
                    self.events.push(Event::End(Tag::Link(
                        LinkType::Inline,
                        destination,
                        CowStr::Borrowed(""),
                    )));
                }
                Entry::Category(category) => {
                    self.events.push(Event::Text(escape(&category.label)));
                    self.list(&category.items);
                }
            }

            self.events.push(Event::End(Tag::Item));
        }

        self.events.push(Event::End(Tag::List(None)));
    }
}

fn owned(text: &str) -> CowStr<'static> {
    CowStr::from(text.to_string())
}

/// Characters that would start inline markup anywhere in a line.
const SPECIAL: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '>', '#', '&', '~'];

/// Escape text so it reads back verbatim, including leading `-`, `+` and `1.` list markers.
fn escape(text: &str) -> CowStr<'static> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    let mut escaped = String::with_capacity(text.len());

    for (index, c) in text.char_indices() {
        let is_marker = (index == 0 && matches!(c, '-' | '+' | '|'))
            || (digits > 0 && index == digits && matches!(c, '.' | ')'));

        if !SPECIAL.contains(&c) && !is_marker {
            escaped.push(c);
        } else if index == 0 {
            // `cmark` backslash escapes the first character of a text event on its own.
            escaped.push_str(&format!("&#{};", u32::from(c)));
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }

    CowStr::from(escaped)
}

/// Percent-encode the characters a link destination cannot carry as-is.
fn encode_href(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());

    for c in id.chars() {
        match c {
            '%' | ' ' | '(' | ')' | '<' | '>' | '\\' | '&' => {
                encoded.push_str(&format!("%{:02X}", u32::from(c)))
            }
            c => encoded.push(c),
        }
    }

    encoded
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Document;

    #[test]
    fn labels_links_from_documents() {
        let mut sidebars = Sidebars::new();
        sidebars.insert("Docs", Sidebar::Items(vec![Entry::doc("intro")]));

        let mut documents = DocumentIndex::empty("docs");
        let intro = Document::from_source("intro.md", "---\nsidebar_label: Welcome\n---\n")
            .expect("document failed to parse");
        documents.insert(intro).expect("insert failed");

        let unlabelled = render(&sidebars, None).expect("failed to render");
        let labelled = render(&sidebars, Some(&documents)).expect("failed to render");

        assert!(unlabelled.starts_with("# Docs"));
        assert!(unlabelled.contains("[intro](intro.md)"));
        assert!(labelled.contains("[Welcome](intro.md)"));
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(&*escape("Plugins *beta*"), "Plugins \\*beta\\*");
        assert_eq!(&*escape("API_v2"), "API\\_v2");
        assert_eq!(&*escape("# Heading"), "&#35; Heading");
        assert_eq!(&*escape("- Item"), "&#45; Item");
        assert_eq!(&*escape("1. Basics"), "1\\. Basics");
        assert_eq!(&*escape("Q&A"), "Q\\&A");
        assert_eq!(&*escape("Plain text"), "Plain text");
    }

    #[test]
    fn encodes_link_destinations() {
        assert_eq!(encode_href("guides/setup"), "guides/setup");
        assert_eq!(encode_href("a%20b"), "a%2520b");
        assert_eq!(encode_href("my doc (draft)"), "my%20doc%20%28draft%29");
    }

    #[test]
    fn empty_sidebars_render_only_headings() {
        let mut sidebars = Sidebars::new();
        sidebars.insert("Docs", Sidebar::Items(Vec::new()));

        let outline = render(&sidebars, None).expect("failed to render");

        assert_eq!(outline.trim(), "# Docs");
    }
}
