// Copyright 2018-2024 the Deno authors. MIT license.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::barrel::BarrelMap;
use crate::barrel::ExportToFileIndex;
use crate::classify::ClassificationPolicyKind;
use crate::resolve::Alias;
use crate::source::collect_source_files;
use crate::source::read_text;
use crate::source::BarrelSys;
use crate::source::ReadError;
use crate::split::ImportSplitter;
use crate::split::SplitError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodemodMode {
  /// Rewrite files in place, stopping at the first error.
  #[default]
  Write,
  /// Transform every file without writing anything and collect the errors.
  DryRun,
}

#[derive(Debug, Clone, Default)]
pub struct CodemodOptions {
  /// Directory the barrel map's logical module paths are relative to.
  pub base_path: PathBuf,
  pub aliases: Vec<Alias>,
  /// Symbols that are always left on the original import.
  pub excluded_symbols: HashSet<String>,
  pub policy: ClassificationPolicyKind,
  pub mode: CodemodMode,
}

#[derive(Debug, Default)]
pub struct CodemodReport {
  /// Files that were rewritten or, in dry run mode, would be.
  pub changed_files: Vec<PathBuf>,
  /// Split errors collected in dry run mode.
  pub errors: Vec<SplitError>,
}

#[derive(Debug, Error)]
pub enum CodemodError {
  #[error("Failed reading directory '{}'.", .path.display())]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error(transparent)]
  Read(#[from] ReadError),
  #[error("Failed writing '{}'.", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error(transparent)]
  Split(#[from] SplitError),
}

/// Splits the barrel imports of every source file under `src_dir`.
pub fn run_codemod(
  sys: &impl BarrelSys,
  src_dir: &Path,
  barrel_map: &BarrelMap,
  options: &CodemodOptions,
) -> Result<CodemodReport, CodemodError> {
  let index =
    ExportToFileIndex::from_barrel_map(barrel_map, &options.base_path);
  let policy = options.policy.create_policy(sys, options.aliases.clone());
  let splitter = ImportSplitter::new(
    policy.as_ref(),
    &index,
    &options.base_path,
    &options.excluded_symbols,
  );
  let files = collect_source_files(sys, src_dir).map_err(|source| {
    CodemodError::ReadDir {
      path: src_dir.to_path_buf(),
      source,
    }
  })?;
  log::debug!(
    "Checking {} files in {} against {} exported symbols.",
    files.len(),
    src_dir.display(),
    index.len()
  );

  let mut report = CodemodReport::default();
  for file in files {
    let text = read_text(sys, &file)?;
    let output = match splitter.split_imports(&file, &text) {
      Ok(Some(output)) => output,
      Ok(None) => {
        log::debug!("No barrel imports to split in {}", file.display());
        continue;
      }
      Err(err) => match options.mode {
        CodemodMode::Write => return Err(err.into()),
        CodemodMode::DryRun => {
          log::debug!("{:#}", err);
          report.errors.push(err);
          continue;
        }
      },
    };
    if options.mode == CodemodMode::Write {
      sys
        .fs_write(&file, output)
        .map_err(|source| CodemodError::Write {
          path: file.clone(),
          source,
        })?;
      log::info!("Transformed {}", file.display());
    }
    report.changed_files.push(file);
  }
  Ok(report)
}

#[cfg(test)]
mod test {
  use std::fs;

  use pretty_assertions::assert_eq;
  use sys_traits::impls::RealSys;

  use super::*;

  const BARREL_USER: &str =
    "import { foo, bar } from \"./utils\";\nfoo(bar);\n";

  fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    for (path, text) in files {
      let path = temp_dir.path().join(path);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, text).unwrap();
    }
    temp_dir
  }

  fn barrel_map() -> BarrelMap {
    let mut map = BarrelMap::new();
    map.insert("utils/foo.ts".to_string(), vec!["foo".to_string()]);
    map.insert("utils/bar/index.ts".to_string(), vec!["bar".to_string()]);
    map
  }

  fn options(root: &Path, mode: CodemodMode) -> CodemodOptions {
    CodemodOptions {
      base_path: root.join("src"),
      mode,
      ..Default::default()
    }
  }

  #[test]
  fn writes_changed_files_only() {
    let temp_dir = setup(&[
      ("src/utils/index.ts", "export * from './foo';\n"),
      ("src/utils/foo.ts", "export const foo = 1;\n"),
      ("src/utils/bar/index.ts", "export const bar = 1;\n"),
      ("src/a.ts", BARREL_USER),
      ("src/b.ts", "import { x } from \"./other\";\n"),
    ]);
    let root = temp_dir.path();
    let report = run_codemod(
      &RealSys,
      &root.join("src"),
      &barrel_map(),
      &options(root, CodemodMode::Write),
    )
    .unwrap();

    assert_eq!(report.changed_files, vec![root.join("src/a.ts")]);
    assert!(report.errors.is_empty());
    assert_eq!(
      fs::read_to_string(root.join("src/a.ts")).unwrap(),
      "import { foo } from \"./utils/foo\";\nimport { bar } from \"./utils/bar\";\nfoo(bar);\n"
    );
    assert_eq!(
      fs::read_to_string(root.join("src/b.ts")).unwrap(),
      "import { x } from \"./other\";\n"
    );
  }

  #[test]
  fn second_run_changes_nothing() {
    let temp_dir = setup(&[
      ("src/utils/index.ts", "export * from './foo';\n"),
      ("src/utils/bar/index.ts", "export const bar = 1;\n"),
      ("src/a.ts", "import { foo, bar } from \"./utils\";\n"),
      ("src/b.ts", "\u{FEFF}import { bar } from \"./utils\";\n"),
    ]);
    let root = temp_dir.path();
    let options = options(root, CodemodMode::Write);
    let first =
      run_codemod(&RealSys, &root.join("src"), &barrel_map(), &options)
        .unwrap();
    assert_eq!(
      first.changed_files,
      vec![root.join("src/a.ts"), root.join("src/b.ts")]
    );
    assert_eq!(
      fs::read_to_string(root.join("src/b.ts")).unwrap(),
      "\u{FEFF}import { bar } from \"./utils/bar\";\n"
    );

    let a_text = fs::read_to_string(root.join("src/a.ts")).unwrap();
    let second =
      run_codemod(&RealSys, &root.join("src"), &barrel_map(), &options)
        .unwrap();
    assert!(second.changed_files.is_empty());
    assert_eq!(fs::read_to_string(root.join("src/a.ts")).unwrap(), a_text);
  }

  #[test]
  fn missing_export_stops_without_writing() {
    let missing = "import { foo, nope } from \"./utils\";\n";
    let temp_dir = setup(&[
      ("src/utils/index.ts", "export * from './foo';\n"),
      ("src/a.ts", missing),
    ]);
    let root = temp_dir.path();
    let err = run_codemod(
      &RealSys,
      &root.join("src"),
      &barrel_map(),
      &options(root, CodemodMode::Write),
    )
    .unwrap_err();

    match err {
      CodemodError::Split(err) => {
        assert_eq!(err.missing_symbol(), Some("nope"));
      }
      err => panic!("unexpected error: {err:#}"),
    }
    assert_eq!(fs::read_to_string(root.join("src/a.ts")).unwrap(), missing);
  }

  #[test]
  fn dry_run_collects_errors_and_writes_nothing() {
    let temp_dir = setup(&[
      ("src/utils/index.ts", "export * from './foo';\n"),
      ("src/a.ts", BARREL_USER),
      ("src/b.ts", "import { nope } from \"./utils\";\n"),
      ("src/c.ts", "import { other } from \"./utils\";\n"),
    ]);
    let root = temp_dir.path();
    let report = run_codemod(
      &RealSys,
      &root.join("src"),
      &barrel_map(),
      &options(root, CodemodMode::DryRun),
    )
    .unwrap();

    assert_eq!(report.changed_files, vec![root.join("src/a.ts")]);
    let missing = report
      .errors
      .iter()
      .filter_map(|err| err.missing_symbol())
      .collect::<Vec<_>>();
    assert_eq!(missing, vec!["nope", "other"]);
    assert_eq!(
      fs::read_to_string(root.join("src/a.ts")).unwrap(),
      BARREL_USER
    );
  }
}
