use anyhow::{bail, Context};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use tracing::debug;

use crate::{error::Result, model::sidebar::DocId};

/// The subset of a document's YAML front matter that affects navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Replaces the file name part of the document id.
    pub id: Option<String>,
    pub title: Option<String>,
    /// Preferred over `title` when shown in a sidebar.
    pub sidebar_label: Option<String>,
}

impl FrontMatter {
    /// Split a leading `---` delimited front matter block off a document.
    /// Returns `None` for the front matter when the document has none.
    pub fn parse(content: &str) -> Result<(Option<FrontMatter>, &str)> {
        let Some((yaml, body)) = split_front_matter(content) else {
            return Ok((None, content));
        };

        if yaml.trim().is_empty() {
            return Ok((Some(FrontMatter::default()), body));
        }

        let front_matter = serde_yaml::from_str(yaml).with_context(|| "Invalid front matter")?;

        Ok((Some(front_matter), body))
    }
}

fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;

    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// A content document a sidebar can point at.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The id sidebars refer to this document by.
    pub id: DocId,
    /// The path of the document relative to the docs directory.
    pub path: PathBuf,
    /// Front matter of the document, empty if it had none.
    pub front_matter: FrontMatter,
}

impl Document {
    pub fn load(docs_dir: impl AsRef<Path>, path: impl Into<PathBuf>) -> Result<Document> {
        let path = path.into();
        let file_path = docs_dir.as_ref().join(&path);
        let content = fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read document: {}", file_path.display()))?;

        Document::from_source(path, &content)
            .with_context(|| format!("Failed to parse document: {}", file_path.display()))
    }

    /// Build a document from its path relative to the docs directory and its contents.
    pub fn from_source(path: impl Into<PathBuf>, content: &str) -> Result<Document> {
        let path = path.into();
        let (front_matter, _) = FrontMatter::parse(content)?;
        let front_matter = front_matter.unwrap_or_default();
        let id = document_id(&path, front_matter.id.as_deref())?;

        Ok(Document {
            id,
            path,
            front_matter,
        })
    }

    /// The label a sidebar shows for this document.
    pub fn label(&self) -> &str {
        self.front_matter
            .sidebar_label
            .as_deref()
            .or(self.front_matter.title.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

fn document_id(path: &Path, id_override: Option<&str>) -> Result<DocId> {
    let mut segments = Vec::new();

    for component in path.with_extension("").components() {
        match component {
            Component::Normal(segment) => match segment.to_str() {
                Some(segment) => segments.push(segment.to_string()),
                None => bail!("Document path {} is not valid UTF-8", path.display()),
            },
            Component::CurDir => (),
            _ => bail!(
                "Document path {} must be relative to the docs directory",
                path.display()
            ),
        }
    }

    if let Some(id) = id_override {
        if id.trim().is_empty() {
            bail!("Front matter of {} sets an empty id", path.display());
        }

        segments.pop();
        segments.push(id.to_string());
    }

    if segments.is_empty() {
        bail!("Document path {} is empty", path.display());
    }

    Ok(DocId::new(segments.join("/")))
}

/// All documents found under a docs directory, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentIndex {
    root: PathBuf,
    documents: IndexMap<DocId, Document>,
}

impl DocumentIndex {
    /// An index with no documents.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: IndexMap::new(),
        }
    }

    /// Recursively index every file under `docs_dir` with one of the given extensions.
    /// Files and directories starting with `.` or `_` are skipped.
    pub fn load(docs_dir: impl Into<PathBuf>, extensions: &[String]) -> Result<Self> {
        let mut index = DocumentIndex::empty(docs_dir);
        let mut paths = Vec::new();

        collect_paths(&index.root, Path::new(""), extensions, &mut paths)?;

        for path in paths {
            let document = Document::load(&index.root, path)?;
            index.insert(document)?;
        }

        debug!(
            "Indexed {} documents under {}",
            index.len(),
            index.root.display()
        );

        Ok(index)
    }

    /// Add a document, failing if another document already claims its id.
    pub fn insert(&mut self, document: Document) -> Result<()> {
        if let Some(existing) = self.documents.get(&document.id) {
            bail!(
                "Documents {} and {} both use the id `{}`",
                existing.path.display(),
                document.path.display(),
                document.id
            );
        }

        self.documents.insert(document.id.clone(), document);

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn collect_paths(
    root: &Path,
    relative: &Path,
    extensions: &[String],
    paths: &mut Vec<PathBuf>,
) -> Result<()> {
    let directory = root.join(relative);
    let mut entries = fs::read_dir(&directory)
        .with_context(|| format!("Failed to read directory {}", directory.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory {}", directory.display()))?;

    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }

        let path = relative.join(name);
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", root.join(&path).display()))?;

        if file_type.is_dir() {
            collect_paths(root, &path, extensions, paths)?;
        } else if has_extension(&path, extensions) {
            paths.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| {
            extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        })
}
