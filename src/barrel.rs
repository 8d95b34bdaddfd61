// Copyright 2018-2024 the Deno authors. MIT license.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::IndexSet;
use sys_traits::FsMetadata;
use sys_traits::FsRead;
use thiserror::Error;

use crate::ast::parse_file;
use crate::ast::DefaultEsParser;
use crate::ast::EsParser;
use crate::ast::ParseError;
use crate::exports::analyze_exports;
use crate::resolve::is_relative_specifier;
use crate::resolve::join_specifier;
use crate::resolve::logical_module_path;
use crate::resolve::normalize_path;
use crate::resolve::relative_path;
use crate::resolve::resolve_module;
use crate::resolve::to_posix_string;
use crate::source::read_text;
use crate::source::ReadError;

/// The symbols visible through a barrel, keyed by the path of the file that
/// defines them relative to the resolution root.
///
/// Keys are kept in the order the files were discovered.
pub type BarrelMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum BarrelError {
  #[error(transparent)]
  Read(#[from] ReadError),
  #[error("Failed parsing '{}'.", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: ParseError,
  },
}

#[derive(Debug, Clone)]
pub struct ResolveBarrelOptions {
  /// Directory that non-relative re-export specifiers resolve against.
  /// Non-relative specifiers are skipped when this is `None`.
  pub base_path: Option<PathBuf>,
  /// Directory the keys of the resulting map are relative to.
  pub root: PathBuf,
  /// Report `default` as an export of files that have a default export.
  pub include_default_exports: bool,
}

impl ResolveBarrelOptions {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      base_path: None,
      root: root.into(),
      include_default_exports: false,
    }
  }
}

/// Walks the barrel at `entry` and all the modules it re-exports from.
pub fn resolve_barrel(
  sys: &(impl FsRead + FsMetadata),
  entry: &Path,
  options: &ResolveBarrelOptions,
) -> Result<BarrelMap, BarrelError> {
  BarrelResolver::new(sys, &DefaultEsParser, options).resolve(entry)
}

pub struct BarrelResolver<'a, TSys: FsRead + FsMetadata> {
  sys: &'a TSys,
  parser: &'a dyn EsParser,
  base_path: Option<PathBuf>,
  root: PathBuf,
  include_default_exports: bool,
  visited: IndexSet<PathBuf>,
  result: BarrelMap,
}

impl<'a, TSys: FsRead + FsMetadata> BarrelResolver<'a, TSys> {
  pub fn new(
    sys: &'a TSys,
    parser: &'a dyn EsParser,
    options: &ResolveBarrelOptions,
  ) -> Self {
    Self {
      sys,
      parser,
      base_path: options.base_path.as_deref().map(normalize_path),
      root: normalize_path(&options.root),
      include_default_exports: options.include_default_exports,
      visited: Default::default(),
      result: Default::default(),
    }
  }

  pub fn resolve(mut self, entry: &Path) -> Result<BarrelMap, BarrelError> {
    self.visit(&normalize_path(entry), None)?;
    Ok(self.result)
  }

  fn visit(
    &mut self,
    path: &Path,
    only: Option<&[String]>,
  ) -> Result<(), BarrelError> {
    if !self.visited.insert(path.to_path_buf()) {
      return Ok(());
    }

    let text = read_text(self.sys, path)?;
    let parsed_source = parse_file(self.parser, path, Arc::from(text))
      .map_err(|source| BarrelError::Parse {
        path: path.to_path_buf(),
        source,
      })?;
    let module_exports =
      analyze_exports(&parsed_source, self.include_default_exports);

    let exports = module_exports
      .exports
      .into_iter()
      .filter(|name| only.map(|only| only.contains(name)).unwrap_or(true))
      .collect::<IndexSet<_>>();
    if !exports.is_empty() {
      let key = to_posix_string(&relative_path(&self.root, path));
      log::debug!("Found {} export(s) in {}", exports.len(), key);
      self.result.insert(key, exports.into_iter().collect());
    }

    for reexport in module_exports.reexports {
      let Some(target) = self.resolve_reexport(path, &reexport.specifier)
      else {
        log::debug!(
          "Skipping unresolvable re-export '{}' in {}",
          reexport.specifier,
          path.display()
        );
        continue;
      };
      let filter = compose_filter(only, reexport.names.as_deref());
      self.visit(&target, filter.as_deref())?;
    }

    Ok(())
  }

  fn resolve_reexport(
    &self,
    referrer: &Path,
    specifier: &str,
  ) -> Option<PathBuf> {
    let base = if is_relative_specifier(specifier) {
      join_specifier(referrer.parent()?, specifier)
    } else {
      join_specifier(self.base_path.as_deref()?, specifier)
    };
    resolve_module(self.sys, &base)
  }
}

/// Combines the filter of the module being visited with the names of one of
/// its re-exports so that a chain of re-exports can only ever narrow the set
/// of visible names.
fn compose_filter(
  current: Option<&[String]>,
  names: Option<&[String]>,
) -> Option<Vec<String>> {
  match (current, names) {
    (None, None) => None,
    (None, Some(names)) => Some(names.to_vec()),
    (Some(current), None) => Some(current.to_vec()),
    (Some(current), Some(names)) => Some(
      names
        .iter()
        .filter(|name| current.contains(name))
        .cloned()
        .collect(),
    ),
  }
}

/// Maps each exported symbol to the logical module path of the file that
/// defines it.
///
/// When the same symbol is found in multiple files, the file visited last
/// wins.
#[derive(Debug, Default, Clone)]
pub struct ExportToFileIndex {
  modules: HashMap<String, String>,
}

impl ExportToFileIndex {
  /// Inverts a barrel map.
  ///
  /// Absolute keys are made relative to `base_path`. Relative keys are
  /// assumed to already be relative to it.
  pub fn from_barrel_map(map: &BarrelMap, base_path: &Path) -> Self {
    let base_path = normalize_path(base_path);
    let mut modules = HashMap::new();
    for (file, symbols) in map {
      let file_path = Path::new(file);
      let relative = if file_path.is_absolute() {
        relative_path(&base_path, &normalize_path(file_path))
      } else {
        normalize_path(file_path)
      };
      let module = logical_module_path(&to_posix_string(&relative));
      for symbol in symbols {
        modules.insert(symbol.clone(), module.clone());
      }
    }
    Self { modules }
  }

  /// Gets the logical module path (relative to the base path, without
  /// extension or `/index`) that defines `symbol`.
  pub fn get(&self, symbol: &str) -> Option<&str> {
    self.modules.get(symbol).map(|module| module.as_str())
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }
}
