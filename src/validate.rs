//! Structural checks over a sidebar tree, optionally against the documents on disk.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::PathBuf,
};
use thiserror::Error;

use crate::model::{DocId, DocumentIndex, Node, Sidebar, Sidebars};

/// Where in a sidebar tree something was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub sidebar: String,
    /// Labels of the enclosing sections and categories, outermost first.
    pub trail: Vec<String>,
}

impl Location {
    fn new(sidebar: &str, trail: &[&str]) -> Self {
        Self {
            sidebar: sidebar.to_string(),
            trail: trail.iter().map(|label| label.to_string()).collect(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sidebar)?;
        for label in &self.trail {
            write!(f, " > {label}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("sidebar `{sidebar}` has no entries")]
    EmptySidebar { sidebar: String },

    #[error("empty document reference in {location}")]
    EmptyDocId { location: Location },

    #[error("category with an empty label in {location}")]
    EmptyLabel { location: Location },

    #[error("category `{label}` in {location} has no items")]
    EmptyCategory { label: String, location: Location },

    #[error("document `{id}` in {location} is already listed in {first}")]
    DuplicateDoc {
        id: DocId,
        location: Location,
        first: Location,
    },

    #[error("document `{id}` in {location} does not exist")]
    MissingDoc { id: DocId, location: Location },

    #[error("document `{id}` ({}) is not listed in any sidebar", .path.display())]
    UnreferencedDoc { id: DocId, path: PathBuf },
}

impl Problem {
    pub fn severity(&self) -> Severity {
        match self {
            Problem::UnreferencedDoc { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Every problem found by a check, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    problems: Vec<Problem>,
}

impl Report {
    pub fn push(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|problem| problem.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|problem| problem.severity() == Severity::Warning)
    }

    /// True when nothing worse than a warning was found.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check the structure of every sidebar.
pub fn validate(sidebars: &Sidebars) -> Report {
    let mut report = Report::default();

    for (name, sidebar) in sidebars.iter() {
        validate_sidebar(name, sidebar, &mut report);
    }

    report
}

/// Check the structure of every sidebar, then check document references against `documents`.
pub fn validate_with_documents(sidebars: &Sidebars, documents: &DocumentIndex) -> Report {
    let mut report = validate(sidebars);
    let mut referenced = HashSet::new();

    for (name, sidebar) in sidebars.iter() {
        for visit in sidebar.walk() {
            let Node::Doc(id) = visit.node else {
                continue;
            };

            if id.is_empty() {
                continue;
            }

            referenced.insert(id.as_str());

            if !documents.contains(id.as_str()) {
                report.push(Problem::MissingDoc {
                    id: id.clone(),
                    location: Location::new(name, &visit.parents),
                });
            }
        }
    }

    for document in documents.iter() {
        if !referenced.contains(document.id.as_str()) {
            report.push(Problem::UnreferencedDoc {
                id: document.id.clone(),
                path: document.path.clone(),
            });
        }
    }

    report
}

fn validate_sidebar(name: &str, sidebar: &Sidebar, report: &mut Report) {
    if sidebar.is_empty() {
        report.push(Problem::EmptySidebar {
            sidebar: name.to_string(),
        });
        return;
    }

    let mut seen: HashMap<&str, Location> = HashMap::new();

    for visit in sidebar.walk() {
        let location = Location::new(name, &visit.parents);

        match visit.node {
            Node::Doc(id) if id.is_empty() => report.push(Problem::EmptyDocId { location }),
            Node::Doc(id) => match seen.get(id.as_str()) {
                Some(first) => report.push(Problem::DuplicateDoc {
                    id: id.clone(),
                    location,
                    first: first.clone(),
                }),
                None => {
                    seen.insert(id.as_str(), location);
                }
            },
            Node::Category { label, items, .. } => {
                if label.trim().is_empty() {
                    report.push(Problem::EmptyLabel {
                        location: location.clone(),
                    });
                }
                if items.is_empty() {
                    report.push(Problem::EmptyCategory {
                        label: label.to_string(),
                        location,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Document, Entry, Format};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Sidebars {
        Sidebars::from_str_with(Format::Json, source).expect("sidebars failed to parse")
    }

    #[test]
    fn well_formed_tree_passes() {
        let sidebars = parse(
            r#"{"Docs": {"About": ["intro"], "Guides": ["a", {"type": "category", "label": "More", "items": ["b"]}]}}"#,
        );

        assert!(validate(&sidebars).is_empty());
    }

    #[test]
    fn reports_empty_ids_labels_and_categories() {
        let sidebars = parse(
            r#"{"Docs": ["", {"type": "category", "label": " ", "items": []}]}"#,
        );
        let report = validate(&sidebars);
        let docs = Location::new("Docs", &[]);

        assert_eq!(
            report.problems(),
            [
                Problem::EmptyDocId {
                    location: docs.clone()
                },
                Problem::EmptyLabel {
                    location: docs.clone()
                },
                Problem::EmptyCategory {
                    label: String::from(" "),
                    location: docs,
                },
            ]
        );
        assert!(!report.is_ok());
    }

    #[test]
    fn reports_empty_sidebars_and_sections() {
        let sidebars = parse(r#"{"Empty": [], "Docs": {"About": []}}"#);
        let report = validate(&sidebars);

        assert_eq!(
            report.problems(),
            [
                Problem::EmptySidebar {
                    sidebar: String::from("Empty")
                },
                Problem::EmptyCategory {
                    label: String::from("About"),
                    location: Location::new("Docs", &[]),
                },
            ]
        );
    }

    #[test]
    fn duplicates_are_scoped_to_one_sidebar() {
        let sidebars = parse(
            r#"{
                "Docs": {"About": ["intro"], "Guides": [{"type": "category", "label": "Deep", "items": ["intro"]}]},
                "Api": ["intro"]
            }"#,
        );
        let report = validate(&sidebars);

        assert_eq!(
            report.problems(),
            [Problem::DuplicateDoc {
                id: DocId::new("intro"),
                location: Location::new("Docs", &["Guides", "Deep"]),
                first: Location::new("Docs", &["About"]),
            }]
        );
        assert_eq!(
            report.problems()[0].to_string(),
            "document `intro` in Docs > Guides > Deep is already listed in Docs > About"
        );
    }

    #[test]
    fn cross_checks_documents() {
        let mut sidebars = Sidebars::new();
        sidebars.insert(
            "Docs",
            Sidebar::Items(vec![Entry::doc("intro"), Entry::doc("gone")]),
        );

        let mut documents = DocumentIndex::empty("docs");
        for path in ["intro.md", "orphan.md"] {
            let document = Document::from_source(path, "").expect("document failed to parse");
            documents.insert(document).expect("insert failed");
        }

        let report = validate_with_documents(&sidebars, &documents);

        assert_eq!(
            report.problems(),
            [
                Problem::MissingDoc {
                    id: DocId::new("gone"),
                    location: Location::new("Docs", &[]),
                },
                Problem::UnreferencedDoc {
                    id: DocId::new("orphan"),
                    path: PathBuf::from("orphan.md"),
                },
            ]
        );
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert!(!report.is_ok());
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let mut report = Report::default();
        report.push(Problem::UnreferencedDoc {
            id: DocId::new("orphan"),
            path: PathBuf::from("orphan.md"),
        });

        assert!(report.is_ok());
        assert_eq!(report.problems()[0].severity(), Severity::Warning);
    }
}
