// Copyright 2018-2024 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sys_traits::FsMetadata;

use crate::resolve::is_relative_specifier;
use crate::resolve::join_specifier;
use crate::resolve::normalize_path;
use crate::resolve::resolve_barrel_index;
use crate::resolve::Alias;

/// The decision made for a single import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
  /// The import targets the tracked barrel and should be split.
  Transform,
  /// The import doesn't target the tracked barrel.
  Skip,
  /// The specifier resolved to a path, but that path isn't a barrel.
  ///
  /// Callers treat this the same as `Skip`. It's reported separately so
  /// that it can be logged.
  Ambiguous,
}

/// Decides whether an import specifier refers to the barrel being split.
pub trait ImportClassificationPolicy {
  fn classify(&self, specifier: &str, current_file: &Path) -> Classification;
}

/// Only imports that resolve to one specific barrel are split.
///
/// Aliases must match the specifier exactly.
pub struct ExactTargetPolicy<'a, TSys: FsMetadata> {
  sys: &'a TSys,
  aliases: Vec<Alias>,
  target_barrel: PathBuf,
}

impl<'a, TSys: FsMetadata> ExactTargetPolicy<'a, TSys> {
  /// The target may be given either as the barrel's index file or as its
  /// directory.
  pub fn new(
    sys: &'a TSys,
    aliases: Vec<Alias>,
    target_barrel: &Path,
  ) -> Self {
    Self {
      sys,
      aliases,
      target_barrel: normalize_path(target_barrel),
    }
  }
}

impl<TSys: FsMetadata> ImportClassificationPolicy
  for ExactTargetPolicy<'_, TSys>
{
  fn classify(&self, specifier: &str, current_file: &Path) -> Classification {
    let resolved = if is_relative_specifier(specifier) {
      current_file
        .parent()
        .map(|dir| join_specifier(dir, specifier))
    } else {
      self
        .aliases
        .iter()
        .find_map(|alias| alias.resolve_exact(specifier))
    };
    let Some(resolved) = resolved else {
      return Classification::Skip;
    };
    match resolve_barrel_index(self.sys, &resolved) {
      Some(index)
        if index == self.target_barrel || resolved == self.target_barrel =>
      {
        Classification::Transform
      }
      Some(_) => Classification::Skip,
      None => Classification::Ambiguous,
    }
  }
}

/// Any import that resolves to a barrel directory is split.
///
/// Aliases match exactly or as a path prefix (`alias/rest`).
pub struct MapMembershipPolicy<'a, TSys: FsMetadata> {
  sys: &'a TSys,
  aliases: Vec<Alias>,
}

impl<'a, TSys: FsMetadata> MapMembershipPolicy<'a, TSys> {
  pub fn new(sys: &'a TSys, aliases: Vec<Alias>) -> Self {
    Self { sys, aliases }
  }
}

impl<TSys: FsMetadata> ImportClassificationPolicy
  for MapMembershipPolicy<'_, TSys>
{
  fn classify(&self, specifier: &str, current_file: &Path) -> Classification {
    let resolved = if is_relative_specifier(specifier) {
      current_file
        .parent()
        .map(|dir| join_specifier(dir, specifier))
    } else {
      self
        .aliases
        .iter()
        .find_map(|alias| alias.resolve_prefixed(specifier))
    };
    match resolved {
      Some(resolved) if resolve_barrel_index(self.sys, &resolved).is_some() => {
        Classification::Transform
      }
      _ => Classification::Skip,
    }
  }
}

/// Selects which classification policy a run uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClassificationPolicyKind {
  /// Split imports of any barrel reachable through a relative path or an
  /// alias prefix.
  #[default]
  MapMembership,
  /// Split only imports of the given barrel.
  #[serde(rename_all = "camelCase")]
  ExactTarget { target_barrel: PathBuf },
}

impl ClassificationPolicyKind {
  pub fn create_policy<'a, TSys: FsMetadata>(
    &self,
    sys: &'a TSys,
    aliases: Vec<Alias>,
  ) -> Box<dyn ImportClassificationPolicy + 'a> {
    match self {
      ClassificationPolicyKind::MapMembership => {
        Box::new(MapMembershipPolicy::new(sys, aliases))
      }
      ClassificationPolicyKind::ExactTarget { target_barrel } => {
        Box::new(ExactTargetPolicy::new(sys, aliases, target_barrel))
      }
    }
  }
}
