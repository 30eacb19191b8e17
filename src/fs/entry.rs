use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use super::version;

/// Extension reported for every directory entry.
pub const DIR_EXTENSION: &str = "<DIR>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
  Directory,
  File,
}

/// One row of a panel listing. Entries are immutable snapshots; a refresh
/// produces new ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSystemEntry {
  pub kind: EntryKind,
  pub name: String,
  pub path: PathBuf,
  pub last_modified: SystemTime,
  pub size: u64,
  pub extension: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_version: Option<String>,
}

impl FileSystemEntry {
  pub fn directory(path: PathBuf, name: String, last_modified: SystemTime) -> Self {
    Self {
      kind: EntryKind::Directory,
      name,
      path,
      last_modified,
      size: 0,
      extension: DIR_EXTENSION.to_string(),
      file_version: None,
    }
  }

  pub fn file(
    path: PathBuf,
    name: String,
    last_modified: SystemTime,
    size: u64,
    file_version: Option<String>,
  ) -> Self {
    let extension = file_extension(&name);
    Self {
      kind: EntryKind::File,
      name,
      path,
      last_modified,
      size,
      extension,
      file_version,
    }
  }

  /// A mounted volume, shown in the drives pseudo-directory.
  pub fn volume(root: PathBuf) -> Self {
    let name = root.to_string_lossy().to_string();
    Self::directory(root, name, SystemTime::now())
  }

  /// Reads metadata for `path`, following symlinks.
  pub fn from_path(path: PathBuf) -> io::Result<Self> {
    let metadata = std::fs::metadata(&path)?;
    let name = entry_name(&path);
    let last_modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    if metadata.is_dir() {
      Ok(Self::directory(path, name, last_modified))
    } else {
      let file_version = version::file_version(&path);
      Ok(Self::file(path, name, last_modified, metadata.len(), file_version))
    }
  }

  pub fn is_dir(&self) -> bool {
    self.kind == EntryKind::Directory
  }

  pub fn is_hidden(&self) -> bool {
    self.name.starts_with('.')
  }
}

/// Last path component, or the whole path for roots like `/` or `C:\`.
pub fn entry_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Suffix from the last dot (inclusive), case preserved. A trailing dot or no
/// dot at all yields an empty string.
pub fn file_extension(name: &str) -> String {
  match name.rfind('.') {
    Some(idx) if idx + 1 < name.len() => name[idx..].to_string(),
    _ => String::new(),
  }
}
