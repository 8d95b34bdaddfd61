// Copyright 2018-2024 the Deno authors. MIT license.

use deno_ast::swc::ast::Decl;
use deno_ast::swc::ast::DefaultDecl;
use deno_ast::swc::ast::ExportSpecifier;
use deno_ast::swc::ast::ModuleDecl;
use deno_ast::swc::ast::ModuleExportName;
use deno_ast::swc::ast::ModuleItem;
use deno_ast::swc::ast::ObjectPatProp;
use deno_ast::swc::ast::Pat;
use deno_ast::swc::ast::TsModuleName;
use deno_ast::ParsedSource;
use deno_ast::ProgramRef;

/// A re-export of another module, `export { a } from "./a"` or
/// `export * from "./a"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExport {
  pub specifier: String,
  /// The names taken from the target module or `None` for a wildcard.
  pub names: Option<Vec<String>>,
}

/// The value exports found in a single module.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleExports {
  /// Names this module exports from its own bindings.
  pub exports: Vec<String>,
  /// Other modules this module re-exports from, in declaration order.
  pub reexports: Vec<ReExport>,
}

/// Collects the value exports of a parsed module.
///
/// Type only declarations are excluded because they have no runtime binding
/// that could be imported from the defining file. Default exports are only
/// included when `include_default` is set.
pub fn analyze_exports(
  parsed_source: &ParsedSource,
  include_default: bool,
) -> ModuleExports {
  let module = match parsed_source.program_ref() {
    ProgramRef::Module(module) => module,
    ProgramRef::Script(_) => return ModuleExports::default(),
  };
  let mut result = ModuleExports::default();
  for item in &module.body {
    let ModuleItem::ModuleDecl(decl) = item else {
      continue;
    };
    match decl {
      ModuleDecl::ExportDecl(export_decl) => {
        fill_decl_names(&export_decl.decl, &mut result.exports);
      }
      ModuleDecl::ExportNamed(named) => {
        if named.type_only {
          continue;
        }
        match &named.src {
          Some(src) => {
            let mut names = Vec::with_capacity(named.specifiers.len());
            for specifier in &named.specifiers {
              match specifier {
                ExportSpecifier::Named(n) => {
                  if !n.is_type_only {
                    names.push(export_name_to_string(&n.orig));
                  }
                }
                // `export * as ns from` creates a binding owned by this module
                ExportSpecifier::Namespace(n) => {
                  result.exports.push(export_name_to_string(&n.name));
                }
                ExportSpecifier::Default(n) => {
                  result.exports.push(n.exported.sym.to_string());
                }
              }
            }
            if !names.is_empty() {
              result.reexports.push(ReExport {
                specifier: src.value.to_string(),
                names: Some(names),
              });
            }
          }
          None => {
            for specifier in &named.specifiers {
              if let ExportSpecifier::Named(n) = specifier {
                if n.is_type_only {
                  continue;
                }
                let name = n.exported.as_ref().unwrap_or(&n.orig);
                result.exports.push(export_name_to_string(name));
              }
            }
          }
        }
      }
      ModuleDecl::ExportAll(export_all) => {
        if !export_all.type_only {
          result.reexports.push(ReExport {
            specifier: export_all.src.value.to_string(),
            names: None,
          });
        }
      }
      ModuleDecl::ExportDefaultDecl(default_decl) => {
        let is_type =
          matches!(default_decl.decl, DefaultDecl::TsInterfaceDecl(_));
        if include_default && !is_type {
          result.exports.push("default".to_string());
        }
      }
      ModuleDecl::ExportDefaultExpr(_) => {
        if include_default {
          result.exports.push("default".to_string());
        }
      }
      _ => {}
    }
  }
  result
}

fn fill_decl_names(decl: &Decl, names: &mut Vec<String>) {
  match decl {
    Decl::Fn(n) if !n.declare => names.push(n.ident.sym.to_string()),
    Decl::Class(n) if !n.declare => names.push(n.ident.sym.to_string()),
    Decl::Var(n) if !n.declare => {
      for declarator in &n.decls {
        fill_pat_names(&declarator.name, names);
      }
    }
    // const enums are erased at compile time
    Decl::TsEnum(n) if !n.declare && !n.is_const => {
      names.push(n.id.sym.to_string())
    }
    Decl::TsModule(n) if !n.declare => {
      if let TsModuleName::Ident(ident) = &n.id {
        names.push(ident.sym.to_string());
      }
    }
    _ => {}
  }
}

fn fill_pat_names(pat: &Pat, names: &mut Vec<String>) {
  match pat {
    Pat::Ident(ident) => names.push(ident.id.sym.to_string()),
    Pat::Array(array) => {
      for elem in array.elems.iter().flatten() {
        fill_pat_names(elem, names);
      }
    }
    Pat::Object(object) => {
      for prop in &object.props {
        match prop {
          ObjectPatProp::KeyValue(kv) => fill_pat_names(&kv.value, names),
          ObjectPatProp::Assign(assign) => {
            names.push(assign.key.id.sym.to_string())
          }
          ObjectPatProp::Rest(rest) => fill_pat_names(&rest.arg, names),
        }
      }
    }
    Pat::Rest(rest) => fill_pat_names(&rest.arg, names),
    Pat::Assign(assign) => fill_pat_names(&assign.left, names),
    _ => {}
  }
}

pub fn export_name_to_string(name: &ModuleExportName) -> String {
  match name {
    ModuleExportName::Ident(ident) => ident.sym.to_string(),
    ModuleExportName::Str(str) => str.value.to_string(),
  }
}

#[cfg(test)]
mod test {
  use std::path::Path;

  use pretty_assertions::assert_eq;

  use super::*;
  use crate::ast::parse_file;
  use crate::ast::DefaultEsParser;

  fn exports_of(
    path: &str,
    text: &str,
    include_default: bool,
  ) -> ModuleExports {
    let parsed =
      parse_file(&DefaultEsParser, Path::new(path), text.into()).unwrap();
    analyze_exports(&parsed, include_default)
  }

  #[test]
  fn local_value_exports() {
    let result = exports_of(
      "/mod.ts",
      r#"
export function fn1() {}
export const a = 1, { b, c: d, ...rest } = obj, [e, , f = 2] = arr;
export class Klass {}
export enum Color { Red }
export namespace Ns { export const x = 1; }
const g = 1, h = 2;
export { g, h as i };
export default function () {}
"#,
      false,
    );
    assert_eq!(
      result.exports,
      vec![
        "fn1", "a", "b", "d", "rest", "e", "f", "Klass", "Color", "Ns", "g",
        "i"
      ]
    );
    assert!(result.reexports.is_empty());
  }

  #[test]
  fn excludes_type_only_exports() {
    let result = exports_of(
      "/mod.ts",
      r#"
export type A = string;
export interface B {}
export declare const c: number;
export declare function d(): void;
export const enum E { A }
type F = number;
const g = 1;
export type { F };
export { type F as G, g };
export type { H } from "./h";
export type * from "./types";
"#,
      false,
    );
    assert_eq!(result.exports, vec!["g"]);
    assert!(result.reexports.is_empty());
  }

  #[test]
  fn reexports_in_declaration_order() {
    let result = exports_of(
      "/mod.ts",
      r#"
export * from "./a";
export { b, c as renamed } from "./b";
export * as ns from "./ns";
export { type T, d } from "./d";
"#,
      false,
    );
    assert_eq!(result.exports, vec!["ns"]);
    assert_eq!(
      result.reexports,
      vec![
        ReExport {
          specifier: "./a".to_string(),
          names: None,
        },
        ReExport {
          specifier: "./b".to_string(),
          names: Some(vec!["b".to_string(), "c".to_string()]),
        },
        ReExport {
          specifier: "./d".to_string(),
          names: Some(vec!["d".to_string()]),
        },
      ]
    );
  }

  #[test]
  fn default_exports_when_requested() {
    let text = "export default 5;\nexport const a = 1;";
    assert_eq!(exports_of("/mod.js", text, false).exports, vec!["a"]);
    assert_eq!(
      exports_of("/mod.js", text, true).exports,
      vec!["default", "a"]
    );
    assert_eq!(
      exports_of("/mod.ts", "export default interface A {}", true).exports,
      Vec::<String>::new()
    );
  }
}
