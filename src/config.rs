use anyhow::Context;
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};
use toml::{value::Table, Value};

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the site root.
pub const CONFIG_FILE: &str = "docnav.toml";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Configuration for the documentation site itself.
    pub site: SiteConfig,

    /// Renderers to run on build, in declaration order.
    pub output: IndexMap<String, OutputConfig>,

    /// Any remaining configuration, readable by renderers through [`Config::get`].
    #[serde(flatten)]
    rest: Table,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let mut buffer = String::new();
        File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Config::from_str(&buffer)
    }

    /// Deserialize an arbitrary top-level table that is not owned by docnav itself.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.rest
            .get(key)
            .cloned()
            .map(|value| {
                value
                    .try_into()
                    .with_context(|| format!("Failed to deserialize `{key}` from config"))
            })
            .transpose()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            output: IndexMap::new(),
            rest: Table::default(),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;
        let Value::Table(mut table) = raw else {
            return Err(D::Error::custom("docnav.toml must always be a toml table"));
        };

        let site: SiteConfig = table
            .remove("site")
            .map(|site| site.try_into().map_err(D::Error::custom))
            .transpose()?
            .unwrap_or_default();

        let output: IndexMap<String, OutputConfig> = table
            .remove("output")
            .map(|output| output.try_into().map_err(D::Error::custom))
            .transpose()?
            .unwrap_or_default();

        let config = Config {
            site,
            output,
            rest: table,
        };

        Ok(config)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).with_context(|| "Attempted to parse invalid configuration file")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Optional title of the documentation site.
    pub title: Option<String>,
    /// Path of the sidebar declaration, relative to the site root.
    pub sidebars: PathBuf,
    /// Directory holding the content documents, relative to the site root.
    pub docs: PathBuf,
    /// File extensions (without the dot) recognised as documents.
    pub extensions: Vec<String>,
    /// Directory renderers write into, relative to the site root.
    pub build_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: None,
            sidebars: PathBuf::from("sidebars.json"),
            docs: PathBuf::from("docs"),
            extensions: vec![String::from("md"), String::from("mdx")],
            build_dir: PathBuf::from("build"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Shell-style command line of an external renderer.
    pub command: Option<String>,
}
