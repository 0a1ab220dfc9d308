//! Useful utilities for parsing and writing CommonMark.

mod parser;

pub use parser::*;

use pulldown_cmark::Event;
use pulldown_cmark_to_cmark::cmark;
use std::borrow::Borrow;

use crate::error::Result;

pub trait EventIteratorExt {
    /// Consume an event collection and return a stringified representation.
    fn stringify(self) -> Result<String>;

    /// Consume an event collection and return only its plain text, with any
    /// line breaks folded into single spaces.
    fn plain_text(self) -> String;
}

impl<'a, I, E> EventIteratorExt for I
where
    I: Iterator<Item = E>,
    E: Borrow<Event<'a>>,
{
    fn stringify(self) -> Result<String> {
        let mut buffer = String::new();
        cmark(self, &mut buffer)?;

        Ok(buffer)
    }

    fn plain_text(self) -> String {
        let mut buffer = String::new();

        for event in self {
            match event.borrow() {
                Event::Text(text) | Event::Code(text) => buffer.push_str(text),
                Event::SoftBreak | Event::HardBreak => buffer.push(' '),
                _ => (),
            }
        }

        buffer
    }
}
