// Copyright 2018-2024 the Deno authors. MIT license.

use std::borrow::Cow;
use std::path::Path;
use std::path::PathBuf;

use sys_traits::FsMetadata;
use sys_traits::FsRead;
use sys_traits::FsReadDir;
use sys_traits::FsWrite;
use thiserror::Error;

mod file_system;
mod text_encoding;

pub use file_system::collect_source_files;
pub use file_system::EXCLUDED_DIR_NAMES;
pub use file_system::SOURCE_FILE_EXTENSIONS;
pub use text_encoding::strip_bom;
pub use text_encoding::BOM_CHAR;

/// The file system capabilities needed to resolve barrels and rewrite
/// imports.
///
/// Everything that touches the disk goes through an implementation of this
/// trait so that callers can swap in `sys_traits::impls::InMemorySys` or
/// another implementation without any process wide state.
pub trait BarrelSys: FsRead + FsWrite + FsMetadata + FsReadDir {}

impl<T: FsRead + FsWrite + FsMetadata + FsReadDir> BarrelSys for T {}

#[derive(Debug, Error)]
#[error("Failed reading '{}'.", .path.display())]
pub struct ReadError {
  pub path: PathBuf,
  #[source]
  pub source: std::io::Error,
}

/// Reads a file as text, attaching the path to any error.
pub fn read_text(
  sys: &impl FsRead,
  path: &Path,
) -> Result<Cow<'static, str>, ReadError> {
  sys.fs_read_to_string(path).map_err(|source| ReadError {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod test {
  use sys_traits::impls::InMemorySys;
  use sys_traits::FsCreateDirAll;

  use super::*;

  #[test]
  fn read_text_reports_path() {
    let sys = InMemorySys::default();
    sys.fs_create_dir_all("/project").unwrap();
    sys.fs_write("/project/mod.ts", "export const a = 1;").unwrap();

    assert_eq!(
      read_text(&sys, Path::new("/project/mod.ts")).unwrap(),
      "export const a = 1;"
    );
    let err = read_text(&sys, Path::new("/project/missing.ts")).unwrap_err();
    assert_eq!(err.path, PathBuf::from("/project/missing.ts"));
    assert!(err.to_string().contains("/project/missing.ts"));
  }
}
