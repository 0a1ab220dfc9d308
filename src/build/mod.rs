use anyhow::bail;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{
    config::{Config, CONFIG_FILE},
    error::Result,
    model::{DocumentIndex, Navigation, Sidebars},
    validate::{self, Report},
};

use self::render::{RenderContext, Renderer};

pub mod render;

/// A documentation site: its configuration, sidebars and documents, plus the
/// renderers to run over them.
pub struct Site {
    root: PathBuf,
    config: Config,
    sidebars: Sidebars,
    documents: DocumentIndex,
    destination: PathBuf,
    renderers: Vec<Box<dyn Renderer>>,
}

impl Site {
    /// Load the site rooted at `root`, reading `docnav.toml` when present.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_location = root.join(CONFIG_FILE);

        let config = if config_location.exists() {
            Config::load(config_location)?
        } else {
            Config::default()
        };

        Site::load_with_config(root, config)
    }

    pub fn load_with_config(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let root = root.into();
        let sidebars = Sidebars::load(root.join(&config.site.sidebars))?;

        let docs_dir = root.join(&config.site.docs);
        let documents = if docs_dir.is_dir() {
            DocumentIndex::load(&docs_dir, &config.site.extensions)?
        } else {
            warn!(
                "Docs directory {} does not exist, document references are not checked",
                docs_dir.display()
            );
            DocumentIndex::empty(docs_dir)
        };

        let renderers = render::from_config(&config)?;
        let destination = root.join(&config.site.build_dir);

        Ok(Self {
            root,
            config,
            sidebars,
            documents,
            destination,
            renderers,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sidebars(&self) -> &Sidebars {
        &self.sidebars
    }

    pub fn documents(&self) -> &DocumentIndex {
        &self.documents
    }

    /// Structural checks, plus document checks when a docs directory was found.
    pub fn check(&self) -> Report {
        if self.documents.is_empty() && !self.documents.root().is_dir() {
            validate::validate(&self.sidebars)
        } else {
            validate::validate_with_documents(&self.sidebars, &self.documents)
        }
    }

    pub fn navigation(&self) -> Navigation {
        Navigation::resolve(&self.sidebars, &self.documents)
    }

    pub fn with_renderer(&mut self, renderer: impl Renderer + 'static) -> &mut Self {
        self.renderers.push(Box::new(renderer));
        self
    }

    pub fn with_destination(&mut self, destination: impl Into<PathBuf>) -> &mut Self {
        self.destination = destination.into();
        self
    }

    /// Check the site, then run every renderer in order.
    pub fn build(&self) -> Result<()> {
        let report = self.check();
        for warning in report.warnings() {
            warn!("{warning}");
        }
        if !report.is_ok() {
            let errors: Vec<_> = report.errors().map(ToString::to_string).collect();
            bail!(
                "Sidebars have {} error(s):\n  {}",
                errors.len(),
                errors.join("\n  ")
            );
        }

        let ctx = RenderContext::new(
            &self.root,
            &self.destination,
            &self.config,
            &self.sidebars,
            &self.documents,
            self.navigation(),
        );

        for renderer in &self.renderers {
            info!("Running the {} renderer", renderer.name());
            render::run(&**renderer, &ctx)?;
        }

        Ok(())
    }
}
