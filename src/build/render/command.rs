use anyhow::{bail, Context};
use shlex::Shlex;
use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
use tracing::debug;

use super::{RenderContext, Renderer};
use crate::error::Result;

/// Runs an external program with the JSON render context on its stdin.
pub struct CommandRenderer {
    name: String,
    command: String,
}

impl CommandRenderer {
    pub fn new(name: String, command: String) -> Self {
        Self { name, command }
    }

    fn build_command(&self, root: &Path) -> Result<Command> {
        let mut parts = Shlex::new(&self.command);
        let Some(bin) = parts.next() else {
            bail!("Command of the {} renderer is empty", self.name);
        };

        let bin = PathBuf::from(bin);
        let bin = if bin.components().count() == 1 {
            // NOTE: Search for the binary in PATH.
            bin
        } else {
            // NOTE: Search for the binary relative to the site root.
            root.join(bin)
        };

        let mut command = Command::new(bin);
        command.args(parts).current_dir(root);

        Ok(command)
    }
}

impl Renderer for CommandRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<()> {
        let payload = serde_json::to_vec(ctx)?;

        debug!("Spawning `{}`", self.command);
        let mut process = self
            .build_command(ctx.root)?
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to run `{}`", self.command))?;

        if let Some(mut stdin) = process.stdin.take() {
            // A renderer that exits without reading its input is judged by its status alone.
            if let Err(err) = stdin.write_all(&payload) {
                debug!("Renderer {} closed its input early: {err}", self.name);
            }
        }

        let status = process
            .wait()
            .with_context(|| format!("Failed to wait on `{}`", self.command))?;

        if !status.success() {
            bail!("Renderer {} failed ({}).", self.name, status);
        }

        Ok(())
    }
}
