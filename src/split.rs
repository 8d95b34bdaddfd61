// Copyright 2018-2024 the Deno authors. MIT license.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use deno_ast::swc::ast::ImportDecl;
use deno_ast::swc::ast::ImportNamedSpecifier;
use deno_ast::swc::ast::ImportSpecifier;
use deno_ast::swc::ast::ModuleDecl;
use deno_ast::swc::ast::ModuleItem;
use deno_ast::ProgramRef;
use deno_ast::SourceRange;
use deno_ast::SourceRangedForSpanned;
use deno_ast::StartSourcePos;
use indexmap::IndexMap;
use thiserror::Error;

use crate::ast::parse_file;
use crate::ast::DefaultEsParser;
use crate::ast::EsParser;
use crate::ast::ParseError;
use crate::barrel::ExportToFileIndex;
use crate::classify::Classification;
use crate::classify::ImportClassificationPolicy;
use crate::exports::export_name_to_string;
use crate::resolve::is_relative_specifier;
use crate::resolve::join_specifier;
use crate::resolve::relative_specifier;
use crate::source::BOM_CHAR;

#[derive(Debug, Error)]
pub enum SplitError {
  #[error(
    "No export found for symbol '{symbol}' imported in {}.",
    .file.display()
  )]
  MissingExport { symbol: String, file: PathBuf },
  #[error("Failed parsing '{}'.", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: ParseError,
  },
}

impl SplitError {
  /// The symbol that had no entry in the export index, if that's what
  /// caused this error.
  pub fn missing_symbol(&self) -> Option<&str> {
    match self {
      SplitError::MissingExport { symbol, .. } => Some(symbol),
      SplitError::Parse { .. } => None,
    }
  }
}

/// Rewrites imports of a barrel into imports of the modules that define
/// each symbol.
pub struct ImportSplitter<'a> {
  classifier: &'a dyn ImportClassificationPolicy,
  index: &'a ExportToFileIndex,
  base_path: &'a Path,
  excluded_symbols: &'a HashSet<String>,
  parser: &'a dyn EsParser,
}

impl<'a> ImportSplitter<'a> {
  pub fn new(
    classifier: &'a dyn ImportClassificationPolicy,
    index: &'a ExportToFileIndex,
    base_path: &'a Path,
    excluded_symbols: &'a HashSet<String>,
  ) -> Self {
    Self {
      classifier,
      index,
      base_path,
      excluded_symbols,
      parser: &DefaultEsParser,
    }
  }

  pub fn with_parser(mut self, parser: &'a dyn EsParser) -> Self {
    self.parser = parser;
    self
  }

  /// Splits the barrel imports found in `source`, the text of the file at
  /// `file_path`.
  ///
  /// Returns `None` when nothing in the file needs to change.
  pub fn split_imports(
    &self,
    file_path: &Path,
    source: &str,
  ) -> Result<Option<String>, SplitError> {
    let parsed_source = parse_file(self.parser, file_path, Arc::from(source))
      .map_err(|source| SplitError::Parse {
        path: file_path.to_path_buf(),
        source,
      })?;
    let module = match parsed_source.program_ref() {
      ProgramRef::Module(module) => module,
      ProgramRef::Script(_) => return Ok(None),
    };
    let text: &str = parsed_source.text();
    let text_start = parsed_source.text_info_lazy().range().start;
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let mut replacements = Vec::new();
    for item in &module.body {
      let ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl)) = item else {
        continue;
      };
      if import_decl.type_only
        || import_decl.with.is_some()
        || import_decl.specifiers.is_empty()
      {
        continue;
      }
      let specifier = import_decl.src.value.to_string();
      match self.classifier.classify(&specifier, file_path) {
        Classification::Transform => {}
        Classification::Skip => continue,
        Classification::Ambiguous => {
          log::debug!(
            "Leaving '{}' in {} as it doesn't resolve to a barrel.",
            specifier,
            file_path.display()
          );
          continue;
        }
      }
      let context = DeclContext {
        decl: import_decl,
        text,
        text_start,
        specifier: &specifier,
        file_path,
      };
      if let Some(replacement) = self.split_decl(&context)? {
        let range = import_decl.range().as_byte_range(text_start);
        let replacement = replacement.join(newline);
        // a sub-barrel that defines its own symbols splits into itself
        if text[range.clone()] != replacement {
          replacements.push((range, replacement));
        }
      }
    }

    if replacements.is_empty() {
      return Ok(None);
    }

    let mut output = String::with_capacity(source.len());
    if source.starts_with(BOM_CHAR) {
      output.push(BOM_CHAR);
    }
    let mut last_end = 0;
    for (range, replacement) in replacements {
      output.push_str(&text[last_end..range.start]);
      output.push_str(&replacement);
      last_end = range.end;
    }
    output.push_str(&text[last_end..]);
    Ok(Some(output))
  }

  /// Builds the statements that replace a single import declaration or
  /// `None` if it has nothing to split.
  fn split_decl(
    &self,
    context: &DeclContext,
  ) -> Result<Option<Vec<String>>, SplitError> {
    let mut retained = ImportClause::default();
    let mut groups = IndexMap::<String, Vec<String>>::new();

    for import_specifier in &context.decl.specifiers {
      match import_specifier {
        ImportSpecifier::Default(n) => {
          retained.default = Some(n.local.sym.to_string());
        }
        ImportSpecifier::Namespace(n) => {
          retained.namespace = Some(n.local.sym.to_string());
        }
        ImportSpecifier::Named(n) => {
          let imported_name = n
            .imported
            .as_ref()
            .map(export_name_to_string)
            .unwrap_or_else(|| n.local.sym.to_string());
          let specifier_text = context.render_named(n);
          if n.is_type_only || self.excluded_symbols.contains(&imported_name)
          {
            retained.named.push(specifier_text);
            continue;
          }
          let Some(module) = self.index.get(&imported_name) else {
            return Err(SplitError::MissingExport {
              symbol: imported_name,
              file: context.file_path.to_path_buf(),
            });
          };
          let new_specifier = self.build_specifier(context, module);
          groups
            .entry(new_specifier)
            .or_default()
            .push(specifier_text);
        }
      }
    }

    if groups.is_empty() {
      return Ok(None);
    }

    let statement_text = context.slice(context.decl.range());
    let has_semicolon = statement_text.trim_end().ends_with(';');
    let src_text = context.slice(context.decl.src.range());
    let quote = match src_text.chars().next() {
      Some('\'') => '\'',
      _ => '"',
    };

    let mut statements = Vec::with_capacity(groups.len() + 1);
    if !retained.is_empty() {
      statements.push(retained.render(src_text, has_semicolon));
    }
    for (specifier, named) in groups {
      let clause = ImportClause {
        named,
        ..Default::default()
      };
      let quoted = format!("{quote}{specifier}{quote}");
      statements.push(clause.render(&quoted, has_semicolon));
    }
    Ok(Some(statements))
  }

  fn build_specifier(&self, context: &DeclContext, module: &str) -> String {
    if !is_relative_specifier(context.specifier) {
      return module.to_string();
    }
    let target = join_specifier(self.base_path, module);
    match context.file_path.parent() {
      Some(dir) => relative_specifier(dir, &target),
      None => module.to_string(),
    }
  }
}

struct DeclContext<'a> {
  decl: &'a ImportDecl,
  text: &'a str,
  text_start: StartSourcePos,
  specifier: &'a str,
  file_path: &'a Path,
}

impl DeclContext<'_> {
  fn slice(&self, range: SourceRange) -> &str {
    &self.text[range.as_byte_range(self.text_start)]
  }

  /// Renders a named import specifier, keeping string literal names as
  /// they were written.
  fn render_named(&self, specifier: &ImportNamedSpecifier) -> String {
    let mut text = String::new();
    if specifier.is_type_only {
      text.push_str("type ");
    }
    if let Some(imported) = &specifier.imported {
      text.push_str(self.slice(imported.range()));
      text.push_str(" as ");
    }
    text.push_str(&specifier.local.sym);
    text
  }
}

#[derive(Default)]
struct ImportClause {
  default: Option<String>,
  namespace: Option<String>,
  named: Vec<String>,
}

impl ImportClause {
  fn is_empty(&self) -> bool {
    self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
  }

  fn render(&self, quoted_specifier: &str, has_semicolon: bool) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(default) = &self.default {
      parts.push(default.clone());
    }
    if let Some(namespace) = &self.namespace {
      parts.push(format!("* as {}", namespace));
    }
    if !self.named.is_empty() {
      parts.push(format!("{{ {} }}", self.named.join(", ")));
    }
    format!(
      "import {} from {}{}",
      parts.join(", "),
      quoted_specifier,
      if has_semicolon { ";" } else { "" }
    )
  }
}
