use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::ops::copy_dir_recursive;
use crate::error::{FsError, FsResult, IoContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
  #[default]
  Optimal,
  Fastest,
  NoCompression,
  SmallestSize,
}

impl CompressionLevel {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().replace('-', "_").as_str() {
      "optimal" => Some(Self::Optimal),
      "fastest" => Some(Self::Fastest),
      "no_compression" | "none" | "store" => Some(Self::NoCompression),
      "smallest_size" | "smallest" => Some(Self::SmallestSize),
      _ => None,
    }
  }

  fn file_options(self) -> SimpleFileOptions {
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    match self {
      Self::Optimal => deflated,
      Self::Fastest => deflated.compression_level(Some(1)),
      Self::SmallestSize => deflated.compression_level(Some(9)),
      Self::NoCompression => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
    }
  }
}

/// Stages every source under its base name in a fresh temp directory, then
/// archives the staging directory's contents into `dest`. The staging
/// directory is removed whether or not archiving succeeds.
pub fn zip_entries(sources: &[PathBuf], dest: &Path, level: CompressionLevel) -> FsResult<()> {
  zip_entries_staged_in(&std::env::temp_dir(), sources, dest, level)
}

fn zip_entries_staged_in(
  staging_parent: &Path,
  sources: &[PathBuf],
  dest: &Path,
  level: CompressionLevel,
) -> FsResult<()> {
  let staging = tempfile::Builder::new()
    .prefix("twinpane-zip-")
    .tempdir_in(staging_parent)
    .at("create_directory", staging_parent)?;

  let result = stage_sources(sources, staging.path())
    .and_then(|()| write_archive(staging.path(), dest, level));

  let staging_path = staging.path().to_path_buf();
  if let Err(e) = staging.close() {
    log::warn!("failed to remove zip staging directory {}: {e}", staging_path.display());
  }
  result
}

fn stage_sources(sources: &[PathBuf], staging: &Path) -> FsResult<()> {
  for source in sources {
    if source.as_os_str().is_empty() {
      continue;
    }
    let name = staged_name(source).ok_or_else(|| FsError::InvalidPath { path: source.clone() })?;
    let target = staging.join(name);
    if source.is_dir() {
      copy_dir_recursive(source, &target)?;
    } else if source.is_file() {
      std::fs::copy(source, &target).at("copy", source)?;
    } else {
      log::warn!("zip source {} does not exist, skipping", source.display());
    }
  }
  Ok(())
}

/// Base name of a source; volume roots like `D:\` become `D`.
fn staged_name(source: &Path) -> Option<String> {
  if let Some(name) = source.file_name() {
    return Some(name.to_string_lossy().to_string());
  }
  let cleaned: String = source
    .to_string_lossy()
    .chars()
    .filter(|c| !matches!(c, '/' | '\\' | ':'))
    .collect();
  (!cleaned.is_empty() && cleaned != "." && cleaned != "..").then_some(cleaned)
}

fn write_archive(root: &Path, dest: &Path, level: CompressionLevel) -> FsResult<()> {
  if dest.exists() {
    std::fs::remove_file(dest).at("delete", dest)?;
  }
  let file = File::create(dest).at("create_file", dest)?;
  let mut zip = ZipWriter::new(file);
  let result = add_dir_contents(&mut zip, root, root, level.file_options())
    .and_then(|()| zip.finish().map(|_| ()).map_err(|e| FsError::archive(dest, e)));
  if result.is_err() {
    let _ = std::fs::remove_file(dest);
  }
  result
}

fn add_dir_contents(
  zip: &mut ZipWriter<File>,
  root: &Path,
  dir: &Path,
  options: SimpleFileOptions,
) -> FsResult<()> {
  let mut children: Vec<PathBuf> = std::fs::read_dir(dir)
    .at("read_directory", dir)?
    .map(|e| e.map(|e| e.path()))
    .collect::<io::Result<_>>()
    .at("read_directory", dir)?;
  children.sort();

  for path in children {
    let name = archive_name(root, &path);
    if path.is_dir() {
      zip
        .add_directory(format!("{name}/"), options)
        .map_err(|e| FsError::archive(&path, e))?;
      add_dir_contents(zip, root, &path, options)?;
    } else {
      let mut input = File::open(&path).at("read_file", &path)?;
      let len = input.metadata().at("read_file", &path)?.len();
      zip
        .start_file(name, options.large_file(needs_zip64(len)))
        .map_err(|e| FsError::archive(&path, e))?;
      io::copy(&mut input, zip).at("write_archive", &path)?;
    }
  }
  Ok(())
}

/// Entries at or past 4 GiB need Zip64 extra fields.
fn needs_zip64(len: u64) -> bool {
  len >= u64::from(u32::MAX)
}

/// Relative path inside the archive, always `/`-separated.
fn archive_name(root: &Path, path: &Path) -> String {
  let rel = path.strip_prefix(root).unwrap_or(path);
  rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy().to_string())
    .collect::<Vec<_>>()
    .join("/")
}

/// Extracts every entry of `archive` into `dest_dir`, creating it if needed and
/// overwriting existing files.
pub fn unzip_entry(archive: &Path, dest_dir: &Path) -> FsResult<()> {
  std::fs::create_dir_all(dest_dir).at("create_directory", dest_dir)?;

  let file = File::open(archive).at("open_archive", archive)?;
  let mut zip = ZipArchive::new(file).map_err(|e| FsError::archive(archive, e))?;

  for i in 0..zip.len() {
    let mut entry = zip.by_index(i).map_err(|e| FsError::archive(archive, e))?;
    let Some(rel) = entry.enclosed_name() else {
      log::warn!("skipping unsafe archive entry {:?} in {}", entry.name(), archive.display());
      continue;
    };
    let outpath = dest_dir.join(rel);

    if entry.is_dir() {
      std::fs::create_dir_all(&outpath).at("create_directory", &outpath)?;
    } else {
      if let Some(parent) = outpath.parent() {
        std::fs::create_dir_all(parent).at("create_directory", parent)?;
      }
      let mut outfile = File::create(&outpath).at("create_file", &outpath)?;
      io::copy(&mut entry, &mut outfile).at("extract", &outpath)?;
    }
  }

  Ok(())
}
