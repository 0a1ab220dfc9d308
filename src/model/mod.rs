pub mod document;
pub mod nav;
pub mod sidebar;

pub use document::{Document, DocumentIndex, FrontMatter};
pub use nav::{NavItem, Navigation};
pub use sidebar::{Category, DocId, Entry, Format, Node, Sidebar, Sidebars, Visit};
