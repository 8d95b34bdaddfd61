// Copyright 2018-2024 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use deno_ast::MediaType;
use deno_ast::ModuleSpecifier;
use deno_ast::ParseDiagnostic;
use deno_ast::ParsedSource;
use thiserror::Error;

use crate::source::strip_bom;
use crate::source::BOM_CHAR;

pub struct ParseOptions<'a> {
  pub specifier: &'a ModuleSpecifier,
  pub source: Arc<str>,
  pub media_type: MediaType,
}

/// Parses programs to a ParsedSource.
pub trait EsParser {
  fn parse_program(
    &self,
    options: ParseOptions,
  ) -> Result<ParsedSource, ParseDiagnostic>;
}

#[derive(Default, Clone)]
pub struct DefaultEsParser;

impl EsParser for DefaultEsParser {
  fn parse_program(
    &self,
    options: ParseOptions,
  ) -> Result<ParsedSource, ParseDiagnostic> {
    deno_ast::parse_module(deno_ast::ParseParams {
      specifier: options.specifier.clone(),
      text: options.source,
      media_type: options.media_type,
      capture_tokens: false,
      scope_analysis: false,
      maybe_syntax: None,
    })
  }
}

#[derive(Debug, Error)]
pub enum ParseError {
  #[error("Failed converting '{}' to a file URL.", .0.display())]
  InvalidPath(PathBuf),
  #[error(transparent)]
  Diagnostic(#[from] ParseDiagnostic),
}

/// Gets the media type used to parse a file on disk.
///
/// Plain JavaScript files are parsed as JSX because projects commonly put
/// JSX in `.js` files.
pub fn media_type_for_path(path: &Path) -> MediaType {
  match MediaType::from_path(path) {
    MediaType::JavaScript | MediaType::Mjs | MediaType::Cjs => MediaType::Jsx,
    media_type => media_type,
  }
}

/// Parses the text of the file at `path`.
///
/// A leading byte order mark is stripped, so ranges in the result are
/// relative to the text without it.
pub fn parse_file(
  parser: &dyn EsParser,
  path: &Path,
  source: Arc<str>,
) -> Result<ParsedSource, ParseError> {
  let specifier = ModuleSpecifier::from_file_path(path)
    .map_err(|()| ParseError::InvalidPath(path.to_path_buf()))?;
  let source = if source.starts_with(BOM_CHAR) {
    Arc::from(strip_bom(&source))
  } else {
    source
  };
  let parsed_source = parser.parse_program(ParseOptions {
    specifier: &specifier,
    source,
    media_type: media_type_for_path(path),
  })?;
  Ok(parsed_source)
}
