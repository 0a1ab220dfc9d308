use anyhow::Context;
use std::fs;

use super::{RenderContext, Renderer};
use crate::{error::Result, outline};

/// File name written by [`OutlineRenderer`] into the destination directory.
pub const OUTLINE_FILE: &str = "SIDEBARS.md";

/// Writes the sidebars as a Markdown outline, labelled from the documents' front matter.
pub struct OutlineRenderer;

impl Renderer for OutlineRenderer {
    fn name(&self) -> &str {
        "outline"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<()> {
        fs::create_dir_all(ctx.destination).with_context(|| {
            format!("Failed to create directory {}", ctx.destination.display())
        })?;

        let path = ctx.destination.join(OUTLINE_FILE);
        let contents = outline::render(ctx.sidebars, Some(ctx.documents))?;

        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}
