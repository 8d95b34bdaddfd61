// Copyright 2018-2024 the Deno authors. MIT license.

use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use sys_traits::FsMetadata;
use thiserror::Error;

/// Suffixes tried, in order, when resolving an extensionless module path.
const MODULE_CANDIDATES: &[&str] = &[
  ".ts",
  ".tsx",
  ".js",
  ".jsx",
  "/index.ts",
  "/index.tsx",
  "/index.js",
  "/index.jsx",
];

/// Suffixes that make a path a barrel (a directory with an index file).
const BARREL_INDEX_CANDIDATES: &[&str] =
  &["/index.ts", "/index.tsx", "/index.js", "/index.jsx"];

/// Matches the source extension of a module path.
static MODULE_EXTENSION_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\.(js|ts|jsx|tsx)$").unwrap());
/// Matches a trailing `/index` segment.
static INDEX_SUFFIX_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"/index$").unwrap());

/// Resolves an extensionless path to the file on disk that it refers to.
pub fn resolve_module(sys: &impl FsMetadata, base: &Path) -> Option<PathBuf> {
  resolve_with_candidates(sys, base, MODULE_CANDIDATES)
}

/// Resolves `base` to its index file when it denotes a barrel directory.
///
/// Unlike [`resolve_module`] this never matches `base.ts` and friends, so a
/// plain file with the same name as a directory isn't mistaken for a barrel.
pub fn resolve_barrel_index(
  sys: &impl FsMetadata,
  base: &Path,
) -> Option<PathBuf> {
  resolve_with_candidates(sys, base, BARREL_INDEX_CANDIDATES)
}

fn resolve_with_candidates(
  sys: &impl FsMetadata,
  base: &Path,
  candidates: &[&str],
) -> Option<PathBuf> {
  let base = normalize_path(base);
  for suffix in candidates {
    let mut candidate = OsString::from(base.as_os_str());
    candidate.push(suffix);
    let candidate = PathBuf::from(candidate);
    if sys.fs_is_file_no_err(&candidate) {
      return Some(candidate);
    }
  }
  None
}

pub fn is_relative_specifier(specifier: &str) -> bool {
  specifier == "."
    || specifier == ".."
    || specifier.starts_with("./")
    || specifier.starts_with("../")
}

/// Lexically normalizes a path, resolving `.` and `..` components without
/// touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut result = PathBuf::new();
  for component in path.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => {
        result.push(component.as_os_str())
      }
      Component::CurDir => {}
      Component::ParentDir => match result.components().next_back() {
        Some(Component::Normal(_)) => {
          result.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => result.push(".."),
      },
      Component::Normal(part) => result.push(part),
    }
  }
  result
}

/// Joins a specifier onto a directory and normalizes the result.
pub fn join_specifier(dir: &Path, specifier: &str) -> PathBuf {
  normalize_path(&dir.join(specifier))
}

/// Gets the path of `to` relative to the directory `from_dir`.
///
/// Both paths are expected to be normalized and absolute.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
  let from_components = from_dir.components().collect::<Vec<_>>();
  let to_components = to.components().collect::<Vec<_>>();
  let common_len = from_components
    .iter()
    .zip(&to_components)
    .take_while(|(a, b)| a == b)
    .count();
  let mut result = PathBuf::new();
  for _ in common_len..from_components.len() {
    result.push("..");
  }
  for component in &to_components[common_len..] {
    result.push(component.as_os_str());
  }
  result
}

/// Renders a path with forward slashes regardless of platform.
pub fn to_posix_string(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
    .replace("//", "/")
}

/// Builds a relative import specifier from the directory of the importing
/// file to `target`.
pub fn relative_specifier(from_dir: &Path, target: &Path) -> String {
  let relative = to_posix_string(&relative_path(from_dir, target));
  if relative.is_empty() {
    ".".to_string()
  } else if relative.starts_with('.') {
    relative
  } else {
    format!("./{}", relative)
  }
}

/// Strips the source extension and a trailing `/index` from a posix module
/// path so it can be used as an import specifier.
pub fn logical_module_path(path: &str) -> String {
  let path = MODULE_EXTENSION_RE.replace(path, "");
  INDEX_SUFFIX_RE.replace(&path, "").into_owned()
}

/// Maps a bare import specifier onto a directory.
///
/// A specifier equal to `prefix`, or starting with `prefix` followed by a
/// slash, resolves under `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
  #[serde(rename = "match")]
  pub prefix: String,
  pub path: PathBuf,
}

impl Alias {
  pub fn new(prefix: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      prefix: prefix.into(),
      path: path.into(),
    }
  }

  /// Resolves the specifier only when it is exactly the alias.
  pub fn resolve_exact(&self, specifier: &str) -> Option<PathBuf> {
    if specifier == self.prefix {
      Some(normalize_path(&self.path))
    } else {
      None
    }
  }

  /// Resolves the specifier when it is the alias or a path below it.
  pub fn resolve_prefixed(&self, specifier: &str) -> Option<PathBuf> {
    if let Some(path) = self.resolve_exact(specifier) {
      return Some(path);
    }
    let rest = specifier
      .strip_prefix(self.prefix.as_str())?
      .strip_prefix('/')?;
    Some(join_specifier(&self.path, rest))
  }
}

#[derive(Debug, Error)]
#[error("Invalid alias '{0}'. Expected <match>=<path>.")]
pub struct ParseAliasError(String);

impl FromStr for Alias {
  type Err = ParseAliasError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    match text.split_once('=') {
      Some((prefix, path)) if !prefix.is_empty() && !path.is_empty() => {
        Ok(Alias::new(prefix, path))
      }
      _ => Err(ParseAliasError(text.to_string())),
    }
  }
}
