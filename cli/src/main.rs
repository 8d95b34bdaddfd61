// Copyright 2018-2024 the Deno authors. MIT license.

use std::error::Error as _;
use std::path::Path;
use std::path::PathBuf;

use barrel_split::load_config;
use barrel_split::normalize_path;
use barrel_split::resolve_barrel;
use barrel_split::run_codemod;
use barrel_split::source::read_text;
use barrel_split::source::ReadError;
use barrel_split::Alias;
use barrel_split::BarrelError;
use barrel_split::BarrelMap;
use barrel_split::ClassificationPolicyKind;
use barrel_split::CodemodConfig;
use barrel_split::CodemodError;
use barrel_split::CodemodMode;
use barrel_split::CodemodOptions;
use barrel_split::ConfigError;
use barrel_split::ResolveBarrelOptions;
use barrel_split::SplitError;
use clap::Parser;
use clap::Subcommand;
use sys_traits::impls::RealSys;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "barrel-split")]
#[command(version, about = "Rewrite barrel imports into direct imports")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the symbols visible through a barrel as JSON
  ListExports {
    /// Barrel index file to start from
    barrel: PathBuf,
    /// Directory that non-relative re-exports resolve against
    #[arg(long)]
    base_path: Option<PathBuf>,
    /// Directory the output paths are relative to (default: base path,
    /// else the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Include `default` for files with a default export
    #[arg(long)]
    include_default: bool,
  },
  /// Rewrite imports of barrels in a source tree
  SplitImports {
    /// Directory of source files to rewrite
    src_dir: PathBuf,
    /// JSON output of `list-exports`
    barrel_map: PathBuf,
    /// Directory the barrel map paths are relative to (default: src-dir)
    #[arg(long)]
    base_path: Option<PathBuf>,
    /// Import alias as <match>=<path>
    #[arg(long = "alias")]
    aliases: Vec<Alias>,
    /// Symbols to leave on the original import
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,
    /// Only split imports of this barrel
    #[arg(long)]
    target_barrel: Option<PathBuf>,
    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
  },
}

#[derive(Debug, Error)]
enum CliError {
  #[error("Failed resolving the current directory.")]
  Cwd(#[source] std::io::Error),
  #[error(transparent)]
  Barrel(#[from] BarrelError),
  #[error(transparent)]
  Codemod(#[from] CodemodError),
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error(transparent)]
  Read(#[from] ReadError),
  #[error("Failed parsing barrel map '{}'.", .path.display())]
  BarrelMap {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("{count} file(s) could not be transformed.")]
  DryRun { count: usize, has_missing_export: bool },
}

impl CliError {
  fn exit_code(&self) -> i32 {
    match self {
      CliError::Codemod(CodemodError::Split(SplitError::MissingExport {
        ..
      }))
      | CliError::DryRun {
        has_missing_export: true,
        ..
      } => 2,
      _ => 1,
    }
  }
}

fn main() {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  )
  .init();
  let cli = Cli::parse();
  if let Err(err) = run(cli) {
    eprintln!("error: {}", err);
    let mut source = err.source();
    while let Some(err) = source {
      eprintln!("  caused by: {}", err);
      source = err.source();
    }
    std::process::exit(err.exit_code());
  }
}

fn run(cli: Cli) -> Result<(), CliError> {
  let cwd = std::env::current_dir().map_err(CliError::Cwd)?;
  let absolute = |path: &Path| normalize_path(&cwd.join(path));
  match cli.command {
    Command::ListExports {
      barrel,
      base_path,
      root,
      include_default,
    } => {
      let base_path = base_path.as_deref().map(absolute);
      let root = root
        .as_deref()
        .map(absolute)
        .or_else(|| base_path.clone())
        .unwrap_or_else(|| cwd.clone());
      let options = ResolveBarrelOptions {
        base_path,
        root,
        include_default_exports: include_default,
      };
      let barrel_map = resolve_barrel(&RealSys, &absolute(&barrel), &options)?;
      println!("{}", serde_json::to_string_pretty(&barrel_map)?);
    }
    Command::SplitImports {
      src_dir,
      barrel_map,
      base_path,
      aliases,
      exclude,
      target_barrel,
      dry_run,
      config,
    } => {
      let config = match config {
        Some(path) => load_config(&RealSys, &absolute(&path))?,
        None => CodemodConfig::default(),
      };
      let src_dir = absolute(&src_dir);
      let barrel_map_path = absolute(&barrel_map);
      let text = read_text(&RealSys, &barrel_map_path)?;
      let barrel_map: BarrelMap =
        serde_json::from_str(&text).map_err(|source| CliError::BarrelMap {
          path: barrel_map_path,
          source,
        })?;

      // flags take precedence over the config file
      let mut all_aliases = aliases
        .into_iter()
        .map(|alias| Alias::new(alias.prefix, absolute(&alias.path)))
        .collect::<Vec<_>>();
      all_aliases.extend(config.aliases);
      let options = CodemodOptions {
        base_path: base_path
          .as_deref()
          .map(absolute)
          .or(config.base_path)
          .unwrap_or_else(|| src_dir.clone()),
        aliases: all_aliases,
        excluded_symbols: exclude
          .into_iter()
          .chain(config.exclude_symbols)
          .filter(|symbol| !symbol.is_empty())
          .collect(),
        policy: match target_barrel.as_deref().map(absolute) {
          Some(target_barrel) => {
            ClassificationPolicyKind::ExactTarget { target_barrel }
          }
          None => match config.target_barrel {
            Some(target_barrel) => {
              ClassificationPolicyKind::ExactTarget { target_barrel }
            }
            None => ClassificationPolicyKind::MapMembership,
          },
        },
        mode: if dry_run {
          CodemodMode::DryRun
        } else {
          CodemodMode::Write
        },
      };

      let report = run_codemod(&RealSys, &src_dir, &barrel_map, &options)?;
      for file in &report.changed_files {
        if dry_run {
          println!("would transform: {}", file.display());
        } else {
          println!("transformed: {}", file.display());
        }
      }
      if !report.errors.is_empty() {
        for err in &report.errors {
          eprintln!("error: {}", err);
        }
        return Err(CliError::DryRun {
          count: report.errors.len(),
          has_missing_export: report
            .errors
            .iter()
            .any(|err| err.missing_symbol().is_some()),
        });
      }
    }
  }
  Ok(())
}
