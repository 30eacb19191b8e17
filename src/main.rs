use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use twinpane::app::{App, Pane};
use twinpane::config::Config;
use twinpane::favorites::{FavoriteItem, Favorites};
use twinpane::fs::{CompressionLevel, FileSystemEntry, FileSystemGateway, LocalFileSystem, LoggingGateway};
use twinpane::operation::{self, Operation};
use twinpane::panel::SortColumn;

const USAGE: &str = "\
twinpane - dual-pane file manager toolkit

Usage: twinpane [options] <command> [args]

Commands:
  ls [path]                   List a directory (drives when omitted)
  drives                      List mounted volumes
  mkdir <path>                Create a directory
  touch <path>                Create an empty file
  rm <path>...                Delete files or directories
  cp <source>... <dest>       Copy into a directory, or to a new path
  mv <source>... <dest>       Move into a directory, or to a new path
  rename <old> <new>          Rename a file or directory
  zip <dest.zip> <source>...  Create a zip archive
  unzip <archive> <dest>      Extract a zip archive
  open <path>                 Open a file with the editor or system default
  reveal <path>               Show a path in the system file manager
  parent <path>               Print the parent directory
  fav [add <name> <path> | rm <name>]
                              List or edit favorites
  keys                        List key bindings from the config

Options:
  --sort <column>             name, extension, date_modified, size, file_version
  --desc                      Sort descending
  --json                      Print listings as JSON
  --level <level>             optimal, fastest, no_compression, smallest_size
  -v, --verbose               Log every filesystem call
  --init                      Write the default config to ~/.config/twinpane/
  -h, --help                  Print this help message
  -V, --version               Print version";

struct Options {
  sort: Option<SortColumn>,
  descending: bool,
  json: bool,
  level: Option<CompressionLevel>,
  verbose: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
  eprintln!("twinpane: {msg}");
  std::process::exit(1);
}

fn main() -> Result<()> {
  let mut args = std::env::args().skip(1);

  let mut show_help = false;
  let mut show_version = false;
  let mut show_init = false;
  let mut options = Options { sort: None, descending: false, json: false, level: None, verbose: false };
  let mut positional: Vec<String> = Vec::new();

  while let Some(arg) = args.next() {
    match arg.as_str() {
      "--help" | "-h" => show_help = true,
      "--version" | "-V" => show_version = true,
      "--init" => show_init = true,
      "--verbose" | "-v" => options.verbose = true,
      "--desc" => options.descending = true,
      "--json" => options.json = true,
      "--sort" => {
        let value = args.next().unwrap_or_else(|| fail("--sort needs a column"));
        options.sort = Some(SortColumn::from_name(&value).unwrap_or_else(|| fail(format!("unknown sort column '{value}'"))));
      }
      "--level" => {
        let value = args.next().unwrap_or_else(|| fail("--level needs a value"));
        options.level = Some(
          CompressionLevel::from_name(&value).unwrap_or_else(|| fail(format!("unknown compression level '{value}'"))),
        );
      }
      a if !a.starts_with('-') || a == "-" => positional.push(a.to_string()),
      _ => fail(format!("unknown option '{arg}'")),
    }
  }

  if show_help {
    println!("{USAGE}");
    return Ok(());
  }

  if show_version {
    println!("twinpane {}", env!("CARGO_PKG_VERSION"));
    return Ok(());
  }

  let default_level = if options.verbose { "debug" } else { "warn" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

  if show_init {
    let config_path = Config::config_path().unwrap_or_else(|e| fail(e));
    let write = if config_path.exists() {
      eprint!("{} already exists. Overwrite? [y/N] ", config_path.display());
      let mut answer = String::new();
      io::stdin().read_line(&mut answer).unwrap_or(0);
      answer.trim().eq_ignore_ascii_case("y")
    } else {
      true
    };
    if write {
      Config::dump_default_config(&config_path).unwrap_or_else(|e| fail(e));
      println!("{}", config_path.display());
    }
    return Ok(());
  }

  let (config, config_errors) = Config::load();
  for e in &config_errors {
    log::warn!("config: {e}");
  }

  let local = LocalFileSystem::with_editor(config.editor.clone());
  let gateway: Arc<dyn FileSystemGateway> = if options.verbose {
    Arc::new(LoggingGateway::new(local))
  } else {
    Arc::new(local)
  };

  let Some((command, rest)) = positional.split_first() else {
    println!("{USAGE}");
    return Ok(());
  };

  if let Err(e) = run_command(command, rest, &options, config, gateway) {
    fail(format!("{e:#}"));
  }
  Ok(())
}

fn run_command(
  command: &str,
  rest: &[String],
  options: &Options,
  config: Config,
  gateway: Arc<dyn FileSystemGateway>,
) -> Result<()> {
  let paths: Vec<PathBuf> = rest.iter().map(PathBuf::from).collect();
  match (command, paths.as_slice()) {
    ("ls", []) => list(options, config, gateway, PathBuf::new()),
    ("ls", [path]) => list(options, config, gateway, path.clone()),
    ("drives", []) => print_entries(options, &gateway.list_volumes()),
    ("mkdir", [path]) => Ok(gateway.create_directory(path)?),
    ("touch", [path]) => Ok(gateway.create_file(path)?),
    ("rm", targets @ [_, ..]) => execute(gateway, Operation::Delete { paths: targets.to_vec() }),
    ("cp", [sources @ .., dest]) if !sources.is_empty() => transfer(gateway, sources, dest, false),
    ("mv", [sources @ .., dest]) if !sources.is_empty() => transfer(gateway, sources, dest, true),
    ("rename", [old, new]) => Ok(gateway.rename_entry(old, new)?),
    ("zip", [dest, sources @ ..]) if !sources.is_empty() => {
      let level = options.level.unwrap_or(config.compression_level);
      execute(gateway, Operation::Zip { sources: sources.to_vec(), dest: dest.clone(), level })
    }
    ("unzip", [archive, dest]) => {
      execute(gateway, Operation::Unzip { archive: archive.clone(), dest_dir: dest.clone() })
    }
    ("open", [path]) => {
      if !gateway.exists(path) {
        bail!("{} does not exist", path.display());
      }
      gateway.open_file(path);
      Ok(())
    }
    ("reveal", [path]) => {
      gateway.reveal_in_file_manager(path);
      Ok(())
    }
    ("parent", [path]) => {
      println!("{}", gateway.parent_path(path).display());
      Ok(())
    }
    ("fav", _) => favorites(rest),
    ("keys", []) => {
      for (action, keys) in config.keymap.listing() {
        println!("{action:<24} {}", keys.join(", "));
      }
      Ok(())
    }
    _ => bail!("invalid arguments for '{command}', see --help"),
  }
}

fn list(options: &Options, mut config: Config, gateway: Arc<dyn FileSystemGateway>, path: PathBuf) -> Result<()> {
  if let Some(column) = options.sort {
    config.sort_column = column;
    config.sort_ascending = true;
  }
  if options.descending {
    config.sort_ascending = false;
  }
  let mut app = App::new(gateway, config);
  app.navigate(Pane::Left, path);
  print_entries(options, app.left.items())
}

fn print_entries(options: &Options, entries: &[FileSystemEntry]) -> Result<()> {
  let mut out = io::stdout().lock();
  if options.json {
    serde_json::to_writer_pretty(&mut out, entries)?;
    writeln!(out)?;
    return Ok(());
  }
  for entry in entries {
    let version = entry.file_version.as_deref().unwrap_or("");
    writeln!(out, "{:<8} {:>12}  {:<40} {version}", entry.extension, entry.size, entry.name)?;
  }
  Ok(())
}

/// `cp a b dir/` copies into `dir`; `cp a b` with a single source copies to `b`.
fn transfer(gateway: Arc<dyn FileSystemGateway>, sources: &[PathBuf], dest: &Path, remove_source: bool) -> Result<()> {
  if dest.is_dir() {
    let sources = sources.to_vec();
    let dest_dir = dest.to_path_buf();
    let op = if remove_source {
      Operation::Move { sources, dest_dir }
    } else {
      Operation::Copy { sources, dest_dir }
    };
    return execute(gateway, op);
  }

  let [source] = sources else {
    bail!("{} is not a directory", dest.display());
  };
  let title = if remove_source { "Moving" } else { "Copying" };
  let mut report = |percent: f64| print_progress(title, percent);
  if remove_source {
    gateway.move_entry(source, dest, Some(&mut report))?;
  } else {
    gateway.copy_entry(source, dest, Some(&mut report))?;
  }
  eprintln!();
  Ok(())
}

fn print_progress(title: &str, percent: f64) {
  eprint!("\r{title}: {percent:>5.1}%");
  let _ = io::stderr().flush();
}

/// Runs `op` on a worker thread and renders its progress on stderr.
fn execute(gateway: Arc<dyn FileSystemGateway>, op: Operation) -> Result<()> {
  let title = op.title();
  let result = operation::spawn(gateway, op).wait(|percent| print_progress(&title, percent));
  eprintln!();
  result.map_err(anyhow::Error::msg).with_context(|| format!("{title} failed"))
}

fn favorites(args: &[String]) -> Result<()> {
  let mut favorites = Favorites::load();
  match args {
    [] => {
      fn print(items: &[FavoriteItem], depth: usize) {
        for item in items {
          if item.is_folder {
            println!("{:indent$}{}/", "", item.name, indent = depth * 2);
          } else {
            println!("{:indent$}{} -> {}", "", item.name, item.path.display(), indent = depth * 2);
          }
          print(&item.children, depth + 1);
        }
      }
      print(favorites.list(), 0);
      Ok(())
    }
    [cmd, name, path] if cmd == "add" => {
      favorites.add(name.clone(), PathBuf::from(path));
      favorites.save()
    }
    [cmd, name] if cmd == "rm" => {
      if favorites.remove(name) == 0 {
        bail!("no favorite named '{name}'");
      }
      favorites.save()
    }
    _ => bail!("usage: twinpane fav [add <name> <path> | rm <name>]"),
  }
}
