use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{
    document::DocumentIndex,
    sidebar::{DocId, Node, Sidebar, Sidebars},
};

/// A sidebar entry with its document resolved to a display label and a source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavItem {
    Doc {
        id: DocId,
        label: String,
        /// Path relative to the docs directory. Missing when no document has this id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Category {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collapsed: Option<bool>,
        items: Vec<NavItem>,
    },
}

impl NavItem {
    fn resolve(node: Node<'_>, documents: &DocumentIndex) -> NavItem {
        match node {
            Node::Doc(id) => match documents.get(id.as_str()) {
                Some(document) => NavItem::Doc {
                    id: id.clone(),
                    label: document.label().to_string(),
                    path: Some(document.path.clone()),
                },
                None => NavItem::Doc {
                    id: id.clone(),
                    label: id.to_string(),
                    path: None,
                },
            },
            Node::Category {
                label,
                collapsed,
                items,
            } => NavItem::Category {
                label: label.to_string(),
                collapsed,
                items: items
                    .iter()
                    .map(|item| NavItem::resolve(Node::from(item), documents))
                    .collect(),
            },
        }
    }
}

/// Every sidebar with its entries resolved against a document index. This is the
/// shape handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Navigation {
    sidebars: IndexMap<String, Vec<NavItem>>,
}

impl Navigation {
    pub fn resolve(sidebars: &Sidebars, documents: &DocumentIndex) -> Navigation {
        let sidebars = sidebars
            .iter()
            .map(|(name, sidebar)| (name.to_string(), resolve_sidebar(sidebar, documents)))
            .collect();

        Navigation { sidebars }
    }

    pub fn get(&self, name: &str) -> Option<&[NavItem]> {
        self.sidebars.get(name).map(Vec::as_slice)
    }
}

/// Resolve a single sidebar. Sections of the shorthand form become categories.
pub fn resolve_sidebar(sidebar: &Sidebar, documents: &DocumentIndex) -> Vec<NavItem> {
    sidebar
        .nodes()
        .into_iter()
        .map(|node| NavItem::resolve(node, documents))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{document::Document, sidebar::Entry};
    use pretty_assertions::assert_eq;

    fn index() -> DocumentIndex {
        let mut index = DocumentIndex::empty("docs");
        let intro = Document::from_source("intro.md", "---\ntitle: Getting started\n---\n")
            .expect("document failed to parse");
        index.insert(intro).expect("insert failed");

        index
    }

    #[test]
    fn resolves_labels_from_documents() {
        let mut sections = IndexMap::new();
        sections.insert(
            String::from("About"),
            vec![
                Entry::doc("intro"),
                Entry::category("More", vec![Entry::doc("missing")]),
            ],
        );
        let mut sidebars = Sidebars::new();
        sidebars.insert("Docs", Sidebar::Sections(sections));

        let navigation = Navigation::resolve(&sidebars, &index());

        let expected = vec![NavItem::Category {
            label: String::from("About"),
            collapsed: None,
            items: vec![
                NavItem::Doc {
                    id: DocId::new("intro"),
                    label: String::from("Getting started"),
                    path: Some(PathBuf::from("intro.md")),
                },
                NavItem::Category {
                    label: String::from("More"),
                    collapsed: None,
                    items: vec![NavItem::Doc {
                        id: DocId::new("missing"),
                        label: String::from("missing"),
                        path: None,
                    }],
                },
            ],
        }];

        assert_eq!(navigation.get("Docs"), Some(expected.as_slice()));
    }

    #[test]
    fn serializes_with_type_tags() {
        let mut sidebars = Sidebars::new();
        sidebars.insert("api", Sidebar::Items(vec![Entry::doc("intro")]));

        let navigation = Navigation::resolve(&sidebars, &index());
        let json = serde_json::to_value(&navigation).expect("failed to serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "api": [{"type": "doc", "id": "intro", "label": "Getting started", "path": "intro.md"}]
            })
        );
    }
}
