// Copyright 2018-2024 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sys_traits::FsRead;
use thiserror::Error;

use crate::resolve::join_specifier;
use crate::resolve::Alias;
use crate::source::read_text;
use crate::source::ReadError;

/// Settings for the `split-imports` command read from a JSON file.
///
/// Relative paths are resolved against the directory containing the file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CodemodConfig {
  pub base_path: Option<PathBuf>,
  pub aliases: Vec<Alias>,
  pub exclude_symbols: Vec<String>,
  pub target_barrel: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error(transparent)]
  Read(#[from] ReadError),
  #[error("Failed parsing config file '{}'.", .path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

pub fn load_config(
  sys: &impl FsRead,
  path: &Path,
) -> Result<CodemodConfig, ConfigError> {
  let text = read_text(sys, path)?;
  let mut config: CodemodConfig =
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
      path: path.to_path_buf(),
      source,
    })?;
  if let Some(dir) = path.parent() {
    config.resolve_paths(dir);
  }
  Ok(config)
}

impl CodemodConfig {
  fn resolve_paths(&mut self, dir: &Path) {
    let resolve = |path: &Path| join_specifier(dir, &path.to_string_lossy());
    if let Some(base_path) = &mut self.base_path {
      *base_path = resolve(base_path);
    }
    if let Some(target_barrel) = &mut self.target_barrel {
      *target_barrel = resolve(target_barrel);
    }
    for alias in &mut self.aliases {
      alias.path = resolve(&alias.path);
    }
  }
}
