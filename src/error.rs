use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure of a filesystem mutation. Listing never produces one of these.
#[derive(Debug, Error)]
pub enum FsError {
  #[error("{op} failed for {}: {source}", path.display())]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("archive error for {}: {source}", path.display())]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("{} already exists", path.display())]
  AlreadyExists { path: PathBuf },

  #[error("{} has no usable file name", path.display())]
  InvalidPath { path: PathBuf },
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
  pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
    FsError::Io { op, path: path.to_path_buf(), source }
  }

  pub fn archive(path: &Path, source: zip::result::ZipError) -> Self {
    FsError::Archive { path: path.to_path_buf(), source }
  }

  /// Path the failure is attributed to.
  pub fn path(&self) -> &Path {
    match self {
      FsError::Io { path, .. }
      | FsError::Archive { path, .. }
      | FsError::AlreadyExists { path }
      | FsError::InvalidPath { path } => path,
    }
  }
}

/// Attaches the operation name and path to an `io::Result`.
pub trait IoContext<T> {
  fn at(self, op: &'static str, path: &Path) -> FsResult<T>;
}

impl<T> IoContext<T> for io::Result<T> {
  fn at(self, op: &'static str, path: &Path) -> FsResult<T> {
    self.map_err(|e| FsError::io(op, path, e))
  }
}
