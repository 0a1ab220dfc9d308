use anyhow::Context;
use std::fs;

use super::{RenderContext, Renderer};
use crate::error::Result;

/// File name written by [`JsonRenderer`] into the destination directory.
pub const NAVIGATION_FILE: &str = "navigation.json";

/// Writes the resolved navigation as JSON, the shape a site generator consumes.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<()> {
        fs::create_dir_all(ctx.destination).with_context(|| {
            format!("Failed to create directory {}", ctx.destination.display())
        })?;

        let path = ctx.destination.join(NAVIGATION_FILE);
        let mut contents = serde_json::to_string_pretty(&ctx.navigation)?;
        contents.push('\n');

        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}
