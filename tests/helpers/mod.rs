// Copyright 2018-2024 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use barrel_split::Alias;
use serde::Deserialize;
use serde::Serialize;

/// A test described by a text file.
///
/// The first line may hold options as `~~ { ...json } ~~`. The rest of the
/// file is a list of `# path` sections holding file contents and a final
/// `# output` section with the expected output.
pub struct Spec {
  pub options: SpecOptions,
  pub files: Vec<SpecFile>,
  pub output_file: SpecFile,
}

impl Spec {
  pub fn emit(&self) -> String {
    let mut text = String::new();
    if self.options != SpecOptions::default() {
      text.push_str("~~ ");
      text.push_str(&serde_json::to_string(&self.options).unwrap());
      text.push_str(" ~~");
      text.push('\n');
    }
    for file in &self.files {
      text.push_str(&file.emit());
      text.push('\n');
    }
    text.push_str(&self.output_file.emit());
    if !text.ends_with('\n') {
      text.push('\n');
    }
    text
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecOptions {
  /// Barrel to resolve, relative to the temp directory.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entry: Option<String>,
  /// Defaults to `src`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_path: Option<String>,
  #[serde(skip_serializing_if = "is_false")]
  pub include_default: bool,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub aliases: Vec<Alias>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub exclude_symbols: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target_barrel: Option<String>,
  #[serde(skip_serializing_if = "is_false")]
  pub dry_run: bool,
}

impl SpecOptions {
  pub fn base_path(&self) -> &str {
    self.base_path.as_deref().unwrap_or("src")
  }
}

fn is_false(v: &bool) -> bool {
  !v
}

#[derive(Debug)]
pub struct SpecFile {
  pub specifier: String,
  pub text: String,
}

impl SpecFile {
  pub fn emit(&self) -> String {
    format!("# {}\n{}", self.specifier, self.text)
  }
}

pub fn parse_spec(text: String) -> Spec {
  let mut files = Vec::new();
  let mut current_file = None;
  let mut options = SpecOptions::default();
  for (i, line) in text.split('\n').enumerate() {
    if i == 0 && line.starts_with("~~ ") {
      let line = line.replace("~~", "").trim().to_string();
      options = serde_json::from_str(&line).unwrap();
      continue;
    }
    if let Some(specifier) = line.strip_prefix("# ") {
      if let Some(file) = current_file.take() {
        files.push(file);
      }
      current_file = Some(SpecFile {
        specifier: specifier.to_string(),
        text: String::new(),
      });
    } else {
      let current_file = current_file.as_mut().unwrap();
      if !current_file.text.is_empty() {
        current_file.text.push('\n');
      }
      current_file.text.push_str(line);
    }
  }
  files.push(current_file.unwrap());
  let output_file =
    files.remove(files.iter().position(|f| f.specifier == "output").unwrap());
  Spec {
    options,
    files,
    output_file,
  }
}

/// The files of a spec written out to a temporary directory.
pub struct TempProject {
  temp_dir: tempfile::TempDir,
}

impl TempProject {
  pub fn new(files: &[SpecFile]) -> Self {
    let temp_dir = tempfile::tempdir().unwrap();
    for file in files {
      let path = temp_dir.path().join(&file.specifier);
      std::fs::create_dir_all(path.parent().unwrap()).unwrap();
      std::fs::write(path, &file.text).unwrap();
    }
    Self { temp_dir }
  }

  pub fn root(&self) -> &Path {
    self.temp_dir.path()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }

  pub fn read(&self, relative: &str) -> String {
    std::fs::read_to_string(self.path(relative)).unwrap()
  }

  /// Removes the temp directory from paths in the text so output is
  /// stable across runs.
  pub fn strip_root(&self, text: &str) -> String {
    let root = format!("{}/", self.root().display());
    text.replace(&root, "")
  }
}
