use std::io;
use std::path::{Path, PathBuf};

use super::archive::{self, CompressionLevel};
use super::entry::FileSystemEntry;
use super::ops::{self, Progress};
use super::volumes;
use crate::error::{FsError, FsResult, IoContext};
use crate::opener;

/// Every filesystem read and mutation the panels need.
///
/// Listing calls never fail: unreadable entries are skipped and logged.
/// Mutations report failures as [`FsError`], except `move_entry` which first
/// retries a failed rename as copy + delete. `open_file` and
/// `reveal_in_file_manager` are best-effort and swallow errors.
pub trait FileSystemGateway: Send + Sync {
  fn list_volumes(&self) -> Vec<FileSystemEntry>;

  /// Directories first, then files. An empty or missing `path` lists volumes.
  fn list_directory(&self, path: &Path) -> Vec<FileSystemEntry>;

  fn exists(&self, path: &Path) -> bool;

  fn create_directory(&self, path: &Path) -> FsResult<()>;

  fn create_file(&self, path: &Path) -> FsResult<()>;

  fn delete_entry(&self, path: &Path) -> FsResult<()>;

  fn rename_entry(&self, old_path: &Path, new_path: &Path) -> FsResult<()>;

  fn copy_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()>;

  fn move_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()>;

  fn zip_entries(&self, sources: &[PathBuf], dest: &Path, level: CompressionLevel) -> FsResult<()>;

  fn unzip_entry(&self, archive: &Path, dest_dir: &Path) -> FsResult<()>;

  fn open_file(&self, path: &Path);

  fn reveal_in_file_manager(&self, path: &Path);

  /// Absolute parent directory, or an empty path for roots and empty input.
  fn parent_path(&self, path: &Path) -> PathBuf {
    parent_path(path)
  }
}

pub fn parent_path(path: &Path) -> PathBuf {
  if path.as_os_str().is_empty() {
    return PathBuf::new();
  }
  let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
  absolute.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Gateway over the local disks.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
  editor: Option<String>,
}

impl LocalFileSystem {
  pub fn new() -> Self {
    Self::default()
  }

  /// Use `command` instead of the platform opener for `open_file`.
  pub fn with_editor(editor: Option<String>) -> Self {
    Self { editor: editor.filter(|c| !c.trim().is_empty()) }
  }
}

fn log_skipped(path: &Path, err: &io::Error) {
  if err.kind() == io::ErrorKind::PermissionDenied {
    log::debug!("skipping inaccessible {}", path.display());
  } else {
    log::warn!("skipping {}: {err}", path.display());
  }
}

impl FileSystemGateway for LocalFileSystem {
  fn list_volumes(&self) -> Vec<FileSystemEntry> {
    volumes::volume_roots().into_iter().map(FileSystemEntry::volume).collect()
  }

  fn list_directory(&self, path: &Path) -> Vec<FileSystemEntry> {
    if path.as_os_str().is_empty() || !path.is_dir() {
      return self.list_volumes();
    }

    let read_dir = match std::fs::read_dir(path) {
      Ok(rd) => rd,
      Err(e) => {
        log_skipped(path, &e);
        return Vec::new();
      }
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for item in read_dir {
      let item = match item {
        Ok(item) => item,
        Err(e) => {
          log_skipped(path, &e);
          continue;
        }
      };
      match FileSystemEntry::from_path(item.path()) {
        Ok(entry) if entry.is_dir() => dirs.push(entry),
        Ok(entry) => files.push(entry),
        Err(e) => log_skipped(&item.path(), &e),
      }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    log::debug!("listed {} entries in {}", dirs.len(), path.display());
    dirs
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn create_directory(&self, path: &Path) -> FsResult<()> {
    if path.is_dir() {
      return Ok(());
    }
    std::fs::create_dir(path).at("create_directory", path)
  }

  fn create_file(&self, path: &Path) -> FsResult<()> {
    std::fs::File::create(path).at("create_file", path)?;
    Ok(())
  }

  fn delete_entry(&self, path: &Path) -> FsResult<()> {
    ops::delete_path(path)
  }

  fn rename_entry(&self, old_path: &Path, new_path: &Path) -> FsResult<()> {
    if old_path.is_dir() {
      if new_path.symlink_metadata().is_ok() {
        return Err(FsError::AlreadyExists { path: new_path.to_path_buf() });
      }
      std::fs::rename(old_path, new_path).at("rename", old_path)
    } else if old_path.symlink_metadata().is_ok() {
      if new_path.is_dir() {
        return Err(FsError::AlreadyExists { path: new_path.to_path_buf() });
      }
      std::fs::rename(old_path, new_path).at("rename", old_path)
    } else {
      log::debug!("rename source {} does not exist", old_path.display());
      Ok(())
    }
  }

  fn copy_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()> {
    ops::copy_entry(source, dest, &mut Progress::new(on_progress))
  }

  fn move_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()> {
    ops::move_entry_with(source, dest, &mut Progress::new(on_progress), |from, to| {
      std::fs::rename(from, to)
    })
  }

  fn zip_entries(&self, sources: &[PathBuf], dest: &Path, level: CompressionLevel) -> FsResult<()> {
    archive::zip_entries(sources, dest, level)
  }

  fn unzip_entry(&self, archive: &Path, dest_dir: &Path) -> FsResult<()> {
    archive::unzip_entry(archive, dest_dir)
  }

  fn open_file(&self, path: &Path) {
    if !path.is_file() {
      log::debug!("not opening {}: not a file", path.display());
      return;
    }
    let result = match &self.editor {
      Some(cmd) => opener::open_with_command(path, cmd),
      None => opener::open_default(path),
    };
    if let Err(e) = result {
      log::warn!("{e}");
    }
  }

  fn reveal_in_file_manager(&self, path: &Path) {
    let Some(target) = opener::reveal_target(path) else {
      log::debug!("nothing to reveal for {}", path.display());
      return;
    };
    if let Err(e) = opener::open_default(&target) {
      log::warn!("{e}");
    }
  }
}
