use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use serde::{
    de::{
        self,
        value::{MapAccessDeserializer, SeqAccessDeserializer},
        MapAccess, SeqAccess, Visitor,
    },
    Deserialize, Deserializer, Serialize,
};
use std::{borrow::Borrow, fmt, fs, path::Path};

use crate::{error::Result, outline};

/// Identifier of a content document, such as `tutorials/basic/simple_cli`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A labeled group of nested entries.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The label shown for the group.
    pub label: String,
    /// Whether the group starts collapsed. Left to the site generator when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Nested entries in display order.
    pub items: Vec<Entry>,
}

impl Category {
    pub fn new(label: impl Into<String>, items: Vec<Entry>) -> Self {
        Self {
            label: label.into(),
            collapsed: None,
            items,
        }
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }
}

/// A sidebar entry which is either a document reference or a nested category.
///
/// On disk a document is a plain string and a category is an object tagged with
/// `"type": "category"`. The long `{"type": "doc", "id": ...}` form is accepted
/// on input and written back as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RawEntry")]
pub enum Entry {
    Doc(DocId),
    Category(Category),
}

impl Entry {
    pub fn doc(id: impl Into<DocId>) -> Self {
        Entry::Doc(id.into())
    }

    pub fn category(label: impl Into<String>, items: Vec<Entry>) -> Self {
        Entry::Category(Category::new(label, items))
    }

    pub fn maybe_category(&self) -> Option<&Category> {
        match self {
            Entry::Category(ref category) => Some(category),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum RawEntry {
    Doc(DocId),
    Tagged(TaggedEntry),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedEntry {
    Doc { id: DocId },
    Category(Category),
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Doc(id) => RawEntry::Doc(id),
            Entry::Category(category) => RawEntry::Tagged(TaggedEntry::Category(category)),
        }
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(EntryVisitor)
    }
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = Entry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a document id or an entry with a `type` of `doc` or `category`")
    }

    fn visit_str<E>(self, id: &str) -> std::result::Result<Entry, E>
    where
        E: de::Error,
    {
        Ok(Entry::doc(id))
    }

    fn visit_string<E>(self, id: String) -> std::result::Result<Entry, E>
    where
        E: de::Error,
    {
        Ok(Entry::doc(id))
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<Entry, A::Error>
    where
        A: MapAccess<'de>,
    {
        let entry = match TaggedEntry::deserialize(MapAccessDeserializer::new(map))? {
            TaggedEntry::Doc { id } => Entry::Doc(id),
            TaggedEntry::Category(category) => Entry::Category(category),
        };

        Ok(entry)
    }
}

/// A borrowed view of a node in a sidebar tree. Sections of the shorthand form
/// show up as categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Doc(&'a DocId),
    Category {
        label: &'a str,
        collapsed: Option<bool>,
        items: &'a [Entry],
    },
}

impl<'a> From<&'a Entry> for Node<'a> {
    fn from(entry: &'a Entry) -> Self {
        match entry {
            Entry::Doc(id) => Node::Doc(id),
            Entry::Category(category) => Node::Category {
                label: &category.label,
                collapsed: category.collapsed,
                items: &category.items,
            },
        }
    }
}

/// A node reached while walking a sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit<'a> {
    pub node: Node<'a>,
    /// Zero for top-level entries.
    pub depth: usize,
    /// Labels of the enclosing categories, outermost first.
    pub parents: Vec<&'a str>,
}

/// A single named sidebar. It is either a plain ordered list of entries or,
/// as a shorthand, an ordered map of section labels to entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Sidebar {
    Items(Vec<Entry>),
    Sections(IndexMap<String, Vec<Entry>>),
}

impl<'de> Deserialize<'de> for Sidebar {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SidebarVisitor)
    }
}

struct SidebarVisitor;

impl<'de> Visitor<'de> for SidebarVisitor {
    type Value = Sidebar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of entries or a map of section labels to entries")
    }

    fn visit_seq<A>(self, seq: A) -> std::result::Result<Sidebar, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Vec::deserialize(SeqAccessDeserializer::new(seq)).map(Sidebar::Items)
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<Sidebar, A::Error>
    where
        A: MapAccess<'de>,
    {
        IndexMap::deserialize(MapAccessDeserializer::new(map)).map(Sidebar::Sections)
    }
}

impl Sidebar {
    /// Top-level nodes in display order.
    pub fn nodes(&self) -> Vec<Node<'_>> {
        match self {
            Sidebar::Items(items) => items.iter().map(Node::from).collect(),
            Sidebar::Sections(sections) => sections
                .iter()
                .map(|(label, items)| Node::Category {
                    label,
                    collapsed: None,
                    items,
                })
                .collect(),
        }
    }

    /// Items of the named section, or of the top-level category with that label.
    pub fn section(&self, label: &str) -> Option<&[Entry]> {
        match self {
            Sidebar::Sections(sections) => sections.get(label).map(Vec::as_slice),
            Sidebar::Items(items) => items
                .iter()
                .filter_map(Entry::maybe_category)
                .find(|category| category.label == label)
                .map(|category| category.items.as_slice()),
        }
    }

    /// Every node, depth-first, in display order.
    pub fn walk(&self) -> Vec<Visit<'_>> {
        let mut visits = Vec::new();

        for node in self.nodes() {
            walk_node(node, 0, &mut Vec::new(), &mut visits);
        }

        visits
    }

    /// Document references in display order.
    pub fn doc_ids(&self) -> Vec<&DocId> {
        self.walk()
            .into_iter()
            .filter_map(|visit| match visit.node {
                Node::Doc(id) => Some(id),
                Node::Category { .. } => None,
            })
            .collect()
    }

    /// Number of levels in the tree; top-level documents alone count as one.
    pub fn depth(&self) -> usize {
        self.walk()
            .iter()
            .map(|visit| visit.depth + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Sidebar::Items(items) => items.is_empty(),
            Sidebar::Sections(sections) => sections.is_empty(),
        }
    }
}

fn walk_node<'a>(
    node: Node<'a>,
    depth: usize,
    parents: &mut Vec<&'a str>,
    visits: &mut Vec<Visit<'a>>,
) {
    visits.push(Visit {
        node,
        depth,
        parents: parents.clone(),
    });

    if let Node::Category { label, items, .. } = node {
        parents.push(label);
        for item in items {
            walk_node(Node::from(item), depth + 1, parents, visits);
        }
        parents.pop();
    }
}

/// Serialization formats a sidebar declaration can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    /// The Markdown outline read and written by [`crate::outline`].
    Outline,
}

impl Format {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Format> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("md" | "markdown") => Ok(Format::Outline),
            _ => Err(anyhow!(
                "Unable to tell the sidebar format of {} from its extension",
                path.display()
            )),
        }
    }
}

/// All sidebars of a documentation site, keyed by sidebar name in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sidebars {
    sidebars: IndexMap<String, Sidebar>,
}

impl Sidebars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load sidebars from a file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        Sidebars::from_str_with(format, &source)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save sidebars to a file, picking the format from its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let contents = self.to_string_with(format)?;

        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn from_str_with(format: Format, source: &str) -> Result<Self> {
        let sidebars = match format {
            Format::Json => serde_json::from_str(source)?,
            Format::Yaml => serde_yaml::from_str(source)?,
            Format::Outline => outline::parse(source)?,
        };

        Ok(sidebars)
    }

    pub fn to_string_with(&self, format: Format) -> Result<String> {
        let contents = match format {
            Format::Json => {
                let mut contents = serde_json::to_string_pretty(self)?;
                contents.push('\n');
                contents
            }
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Outline => outline::render(self, None)?,
        };

        Ok(contents)
    }

    pub fn insert(&mut self, name: impl Into<String>, sidebar: Sidebar) -> Option<Sidebar> {
        self.sidebars.insert(name.into(), sidebar)
    }

    pub fn get(&self, name: &str) -> Option<&Sidebar> {
        self.sidebars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sidebar)> {
        self.sidebars
            .iter()
            .map(|(name, sidebar)| (name.as_str(), sidebar))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sidebars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sidebars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sidebars.is_empty()
    }
}

impl FromIterator<(String, Sidebar)> for Sidebars {
    fn from_iter<T: IntoIterator<Item = (String, Sidebar)>>(iter: T) -> Self {
        Self {
            sidebars: iter.into_iter().collect(),
        }
    }
}
