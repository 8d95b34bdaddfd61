// Copyright 2018-2024 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use sys_traits::FsDirEntry;
use sys_traits::FsReadDir;

/// Directory names that are never descended into when collecting files.
pub const EXCLUDED_DIR_NAMES: &[&str] = &[
  "node_modules",
  "build",
  "dist",
  ".next",
  ".turbo",
  ".cache",
  "coverage",
  ".storybook",
];

pub const SOURCE_FILE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Recursively collects the source files under `dir`.
///
/// Entries are visited in file name order so the result is stable across
/// platforms. Directories that disappear or can't be read due to
/// permissions are skipped.
pub fn collect_source_files(
  sys: &impl FsReadDir,
  dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  collect_in_dir(sys, dir, &mut files)?;
  Ok(files)
}

fn collect_in_dir(
  sys: &impl FsReadDir,
  dir: &Path,
  files: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
  let entries = match sys.fs_read_dir(dir) {
    Ok(entries) => entries,
    Err(err) if is_skippable_error(&err) => return Ok(()),
    Err(err) => return Err(err),
  };
  let mut dirs = Vec::new();
  let mut entry_files = Vec::new();
  for entry in entries {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) if is_skippable_error(&err) => continue,
      Err(err) => return Err(err),
    };
    let file_type = match entry.file_type() {
      Ok(file_type) => file_type,
      Err(err) if is_skippable_error(&err) => continue,
      Err(err) => return Err(err),
    };
    let path = entry.path().into_owned();
    if file_type.is_dir() {
      let is_excluded = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| EXCLUDED_DIR_NAMES.contains(&name))
        .unwrap_or(false);
      if !is_excluded {
        dirs.push(path);
      }
    } else if file_type.is_file() && is_source_file(&path) {
      entry_files.push(path);
    }
  }

  entry_files.sort();
  dirs.sort();
  files.extend(entry_files);
  for dir in dirs {
    collect_in_dir(sys, &dir, files)?;
  }
  Ok(())
}

fn is_source_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| SOURCE_FILE_EXTENSIONS.contains(&ext))
    .unwrap_or(false)
}

fn is_skippable_error(err: &std::io::Error) -> bool {
  matches!(
    err.kind(),
    std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound
  )
}
