/// Mapper configuration
///
/// Priority: environment (`PGMAPPER_*`) > config file > defaults. The CLI
/// applies its own flags on top of the loaded value.
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::core::Result;

pub const CONFIG_PATHS: [&str; 2] = ["/etc/pgmapper/pgmapper.toml", "./pgmapper.toml"];
pub const ENV_PREFIX: &str = "PGMAPPER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapperConfig {
    /// `postgresql://` URL or libpq `key=value` connection string.
    #[serde(default = "default_url")]
    pub url: String,
    /// Tables registered right after connecting.
    #[serde(default)]
    pub tables: Vec<String>,
}

fn default_url() -> String {
    "host=localhost user=postgres dbname=postgres".to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            tables: Vec::new(),
        }
    }
}

impl MapperConfig {
    /// Load from `path` (must exist) or, when `None`, from the first of
    /// `CONFIG_PATHS` that exists, then overlay the environment.
    ///
    /// `PGMAPPER_TABLES` is a comma-separated list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::layered(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn layered(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                debug!(target: "pgmapper::config", "loading config from {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(found) = CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
                    debug!(target: "pgmapper::config", "loading config from {}", found.display());
                    builder = builder.add_source(File::from(found));
                }
            }
        }

        builder = builder.add_source(
            env.try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tables"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
