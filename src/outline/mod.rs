//! Sidebars as a Markdown outline.
//!
//! Each sidebar is a `#` heading, each section of the shorthand form a `##`
//! heading, and entries a nested bullet list. Documents are links whose
//! destination is the document id plus `.md`, categories are plain text items
//! with a nested list:
//!
//! ```markdown
//! # Docs
//!
//! ## Tutorials
//!
//! * [Introduction](tutorials/intro.md)
//! * Basic Tutorial
//!   * [Simple CLI](tutorials/basic/simple_cli.md)
//! ```

mod parser;
mod writer;

pub use parser::parse;
pub use writer::render;
