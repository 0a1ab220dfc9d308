mod command;
mod json;
mod outline;

use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;

use crate::{
    config::Config,
    error::Result,
    model::{DocumentIndex, Navigation, Sidebars},
};

pub use command::*;
pub use json::*;
pub use outline::*;

pub trait Renderer {
    fn name(&self) -> &str;

    fn render(&self, ctx: &RenderContext<'_>) -> Result<()>;
}

#[non_exhaustive]
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    /// The root directory of the site (where docnav.toml lives).
    pub root: &'a Path,
    /// The directory where the renderer **must** put its output.
    /// This directory is not guaranteed to be empty nor to exist.
    pub destination: &'a Path,
    /// The configuration of the site.
    pub config: &'a Config,
    /// The sidebars as declared.
    pub sidebars: &'a Sidebars,
    /// Documents found in the docs directory.
    #[serde(skip)]
    pub documents: &'a DocumentIndex,
    /// The sidebars with every document resolved to its label and path.
    pub navigation: Navigation,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        root: &'a Path,
        destination: &'a Path,
        config: &'a Config,
        sidebars: &'a Sidebars,
        documents: &'a DocumentIndex,
        navigation: Navigation,
    ) -> Self {
        Self {
            root,
            destination,
            config,
            sidebars,
            documents,
            navigation,
        }
    }
}

/// Build the renderers listed in the `[output]` tables. Without any, only the
/// JSON navigation is written.
pub fn from_config(config: &Config) -> Result<Vec<Box<dyn Renderer>>> {
    if config.output.is_empty() {
        return Ok(vec![Box::new(JsonRenderer)]);
    }

    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();

    for (name, output) in &config.output {
        let renderer: Box<dyn Renderer> = match (name.as_str(), &output.command) {
            (_, Some(command)) => Box::new(CommandRenderer::new(name.clone(), command.clone())),
            ("json", None) => Box::new(JsonRenderer),
            ("outline", None) => Box::new(OutlineRenderer),
            (other, None) => {
                bail!("Output `{other}` is not a built-in renderer and has no `command`")
            }
        };

        renderers.push(renderer);
    }

    Ok(renderers)
}

pub(crate) fn run(renderer: &dyn Renderer, ctx: &RenderContext<'_>) -> Result<()> {
    renderer
        .render(ctx)
        .with_context(|| format!("The {} renderer failed", renderer.name()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_to_json_output() {
        let renderers = from_config(&Config::default()).expect("renderers failed to build");
        let names: Vec<_> = renderers.iter().map(|renderer| renderer.name()).collect();

        assert_eq!(names, ["json"]);
    }

    #[test]
    fn builds_configured_outputs_in_order() {
        let config: Config = r#"
[output.outline]
[output.search]
command = "index-docs --all"
[output.json]
"#
        .parse()
        .expect("config failed to parse");

        let renderers = from_config(&config).expect("renderers failed to build");
        let names: Vec<_> = renderers.iter().map(|renderer| renderer.name()).collect();

        assert_eq!(names, ["outline", "search", "json"]);
    }

    #[test]
    fn unknown_outputs_need_a_command() {
        let config: Config = "[output.pdf]".parse().expect("config failed to parse");

        assert!(from_config(&config).is_err());
    }
}
