use std::fmt::Debug;
use std::path::{Path, PathBuf};

use super::archive::CompressionLevel;
use super::entry::FileSystemEntry;
use super::gateway::FileSystemGateway;
use crate::error::FsResult;

/// Logs every call made through the wrapped gateway, its outcome, and any error.
pub struct LoggingGateway<G> {
  inner: G,
}

impl<G: FileSystemGateway> LoggingGateway<G> {
  pub fn new(inner: G) -> Self {
    Self { inner }
  }
}

fn logged<T, A: Debug>(op: &str, args: A, call: impl FnOnce() -> FsResult<T>) -> FsResult<T> {
  log::info!("{op} {args:?}");
  let result = call();
  match &result {
    Ok(_) => log::debug!("{op} completed"),
    Err(e) => log::error!("{op} failed: {e}"),
  }
  result
}

impl<G: FileSystemGateway> FileSystemGateway for LoggingGateway<G> {
  fn list_volumes(&self) -> Vec<FileSystemEntry> {
    let volumes = self.inner.list_volumes();
    log::debug!("list_volumes returned {} entries", volumes.len());
    volumes
  }

  fn list_directory(&self, path: &Path) -> Vec<FileSystemEntry> {
    let entries = self.inner.list_directory(path);
    log::debug!("list_directory {} returned {} entries", path.display(), entries.len());
    entries
  }

  fn exists(&self, path: &Path) -> bool {
    self.inner.exists(path)
  }

  fn create_directory(&self, path: &Path) -> FsResult<()> {
    logged("create_directory", path, || self.inner.create_directory(path))
  }

  fn create_file(&self, path: &Path) -> FsResult<()> {
    logged("create_file", path, || self.inner.create_file(path))
  }

  fn delete_entry(&self, path: &Path) -> FsResult<()> {
    logged("delete_entry", path, || self.inner.delete_entry(path))
  }

  fn rename_entry(&self, old_path: &Path, new_path: &Path) -> FsResult<()> {
    logged("rename_entry", (old_path, new_path), || self.inner.rename_entry(old_path, new_path))
  }

  fn copy_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()> {
    logged("copy_entry", (source, dest), || self.inner.copy_entry(source, dest, on_progress))
  }

  fn move_entry(
    &self,
    source: &Path,
    dest: &Path,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()> {
    logged("move_entry", (source, dest), || self.inner.move_entry(source, dest, on_progress))
  }

  fn zip_entries(&self, sources: &[PathBuf], dest: &Path, level: CompressionLevel) -> FsResult<()> {
    logged("zip_entries", (sources, dest, level), || self.inner.zip_entries(sources, dest, level))
  }

  fn unzip_entry(&self, archive: &Path, dest_dir: &Path) -> FsResult<()> {
    logged("unzip_entry", (archive, dest_dir), || self.inner.unzip_entry(archive, dest_dir))
  }

  fn open_file(&self, path: &Path) {
    log::info!("open_file {}", path.display());
    self.inner.open_file(path);
  }

  fn reveal_in_file_manager(&self, path: &Path) {
    log::info!("reveal_in_file_manager {}", path.display());
    self.inner.reveal_in_file_manager(path);
  }

  fn parent_path(&self, path: &Path) -> PathBuf {
    self.inner.parent_path(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fs::LocalFileSystem;
  use std::fs;

  #[test]
  fn test_forwards_results_and_errors() {
    let dir = std::env::temp_dir().join(format!("twinpane_logging_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let gateway = LoggingGateway::new(LocalFileSystem::new());

    gateway.create_file(&dir.join("a.txt")).unwrap();
    assert!(gateway.exists(&dir.join("a.txt")));
    assert_eq!(gateway.list_directory(&dir).len(), 1);
    assert!(gateway.create_file(&dir.join("missing").join("b.txt")).is_err());

    let mut ticks = 0;
    let mut sink = |_: f64| ticks += 1;
    gateway.copy_entry(&dir.join("a.txt"), &dir.join("b.txt"), Some(&mut sink)).unwrap();
    assert_eq!(ticks, 1);

    let _ = fs::remove_dir_all(&dir);
  }
}
