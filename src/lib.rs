// Copyright 2018-2024 the Deno authors. MIT license.

#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

//! Resolves the symbols a barrel module re-exports back to the files that
//! define them, then rewrites barrel imports into direct imports of those
//! files.

mod ast;
mod barrel;
mod classify;
mod codemod;
mod config;
mod exports;
mod resolve;
pub mod source;
mod split;

pub use ast::media_type_for_path;
pub use ast::parse_file;
pub use ast::DefaultEsParser;
pub use ast::EsParser;
pub use ast::ParseError;
pub use ast::ParseOptions;
pub use barrel::resolve_barrel;
pub use barrel::BarrelError;
pub use barrel::BarrelMap;
pub use barrel::BarrelResolver;
pub use barrel::ExportToFileIndex;
pub use barrel::ResolveBarrelOptions;
pub use classify::Classification;
pub use classify::ClassificationPolicyKind;
pub use classify::ExactTargetPolicy;
pub use classify::ImportClassificationPolicy;
pub use classify::MapMembershipPolicy;
pub use codemod::run_codemod;
pub use codemod::CodemodError;
pub use codemod::CodemodMode;
pub use codemod::CodemodOptions;
pub use codemod::CodemodReport;
pub use config::load_config;
pub use config::CodemodConfig;
pub use config::ConfigError;
pub use deno_ast::MediaType;
pub use exports::analyze_exports;
pub use exports::ModuleExports;
pub use exports::ReExport;
pub use resolve::is_relative_specifier;
pub use resolve::join_specifier;
pub use resolve::logical_module_path;
pub use resolve::normalize_path;
pub use resolve::relative_specifier;
pub use resolve::resolve_barrel_index;
pub use resolve::resolve_module;
pub use resolve::Alias;
pub use resolve::ParseAliasError;
pub use split::ImportSplitter;
pub use split::SplitError;
