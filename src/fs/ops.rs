use std::io;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsResult, IoContext};

/// Forwards percentages to an optional sink, never going backwards and never
/// repeating a final 100.
pub struct Progress<'a> {
  sink: Option<&'a mut dyn FnMut(f64)>,
  last: f64,
  done: bool,
}

impl<'a> Progress<'a> {
  pub fn new(sink: Option<&'a mut dyn FnMut(f64)>) -> Self {
    Self { sink, last: 0.0, done: false }
  }

  pub fn silent() -> Self {
    Self::new(None)
  }

  pub fn report(&mut self, percent: f64) {
    let percent = percent.clamp(0.0, 100.0);
    if self.done || percent < self.last {
      return;
    }
    self.last = percent;
    self.done = percent >= 100.0;
    if let Some(sink) = &mut self.sink {
      sink(percent);
    }
  }

  /// Reports 100 unless it was already reported.
  pub fn finish(&mut self) {
    self.report(100.0);
  }
}

/// Delete a path (file or directory) permanently. Missing paths are not an error.
pub fn delete_path(path: &Path) -> FsResult<()> {
  if path.is_dir() {
    std::fs::remove_dir_all(path).at("delete", path)
  } else if path.symlink_metadata().is_ok() {
    std::fs::remove_file(path).at("delete", path)
  } else {
    Ok(())
  }
}

/// Returns a unique destination path by appending `_copy`, `_copy2`, etc.
/// if the path already exists.
pub fn unique_dest_path(dest: &Path) -> PathBuf {
  if dest.symlink_metadata().is_err() {
    return dest.to_path_buf();
  }

  let stem = dest
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .unwrap_or_default();
  let ext = dest.extension().map(|e| e.to_string_lossy().to_string());
  let parent = dest.parent().unwrap_or(Path::new("."));

  let make_name = |suffix: &str| -> PathBuf {
    match &ext {
      Some(e) => parent.join(format!("{stem}{suffix}.{e}")),
      None => parent.join(format!("{stem}{suffix}")),
    }
  };

  let first = make_name("_copy");
  if first.symlink_metadata().is_err() {
    return first;
  }

  let mut n = 2u32;
  loop {
    let candidate = make_name(&format!("_copy{n}"));
    if candidate.symlink_metadata().is_err() {
      return candidate;
    }
    n += 1;
  }
}

/// `path` with symlinks and `.`/`..` resolved. A path that does not exist yet
/// is resolved through its parent.
fn resolved(path: &Path) -> Option<PathBuf> {
  if let Ok(p) = path.canonicalize() {
    return Some(p);
  }
  let name = path.file_name()?;
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  parent.canonicalize().ok().map(|p| p.join(name))
}

/// True when both paths name the same filesystem object, however they are
/// spelled (`./`, symlinks, hard links on unix).
pub fn same_file(a: &Path, b: &Path) -> bool {
  #[cfg(unix)]
  {
    use std::os::unix::fs::MetadataExt;
    if let (Ok(ma), Ok(mb)) = (std::fs::metadata(a), std::fs::metadata(b)) {
      return ma.dev() == mb.dev() && ma.ino() == mb.ino();
    }
  }
  match (resolved(a), resolved(b)) {
    (Some(a), Some(b)) => a == b,
    _ => false,
  }
}

fn is_inside(dest: &Path, source: &Path) -> bool {
  if dest.starts_with(source) {
    return true;
  }
  match (resolved(dest), resolved(source)) {
    (Some(dest), Some(source)) => dest.starts_with(source),
    _ => false,
  }
}

/// Copy a file or directory to `dest`, overwriting existing files. Copying
/// onto the source itself, or a directory into itself, is an error.
pub fn copy_entry(source: &Path, dest: &Path, progress: &mut Progress) -> FsResult<()> {
  if source.is_dir() {
    if is_inside(dest, source) {
      return Err(FsError::io(
        "copy",
        dest,
        io::Error::new(io::ErrorKind::InvalidInput, "destination is inside the source directory"),
      ));
    }
    copy_dir_top_level(source, dest, progress)?;
    progress.finish();
  } else {
    if same_file(source, dest) {
      return Err(FsError::io(
        "copy",
        dest,
        io::Error::new(io::ErrorKind::InvalidInput, "source and destination are the same file"),
      ));
    }
    std::fs::copy(source, dest).at("copy", source)?;
    progress.report(100.0);
  }
  Ok(())
}

/// Copies `source` into `dest`, ticking once per top-level child.
fn copy_dir_top_level(source: &Path, dest: &Path, progress: &mut Progress) -> FsResult<()> {
  std::fs::create_dir_all(dest).at("create_directory", dest)?;

  let (dirs, files) = split_children(source)?;
  let total = dirs.len() + files.len();
  let mut processed = 0usize;

  for file in files {
    let target = dest.join(file.file_name().unwrap_or_default());
    std::fs::copy(&file, &target).at("copy", &file)?;
    processed += 1;
    progress.report(processed as f64 / total as f64 * 100.0);
  }

  for dir in dirs {
    let target = dest.join(dir.file_name().unwrap_or_default());
    copy_dir_recursive(&dir, &target)?;
    processed += 1;
    progress.report(processed as f64 / total as f64 * 100.0);
  }

  Ok(())
}

/// Recursively copy a directory and all its contents.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> FsResult<()> {
  std::fs::create_dir_all(dest).at("create_directory", dest)?;
  for entry in std::fs::read_dir(source).at("read_directory", source)? {
    let entry = entry.at("read_directory", source)?;
    let src_path = entry.path();
    let dst_path = dest.join(entry.file_name());
    if src_path.is_dir() {
      copy_dir_recursive(&src_path, &dst_path)?;
    } else {
      std::fs::copy(&src_path, &dst_path).at("copy", &src_path)?;
    }
  }
  Ok(())
}

fn split_children(dir: &Path) -> FsResult<(Vec<PathBuf>, Vec<PathBuf>)> {
  let mut dirs = Vec::new();
  let mut files = Vec::new();
  for entry in std::fs::read_dir(dir).at("read_directory", dir)? {
    let path = entry.at("read_directory", dir)?.path();
    if path.is_dir() {
      dirs.push(path);
    } else {
      files.push(path);
    }
  }
  Ok((dirs, files))
}

/// Move `source` to `dest` with `rename`, falling back to copy + delete when
/// the rename fails for any reason.
pub fn move_entry_with<R>(
  source: &Path,
  dest: &Path,
  progress: &mut Progress,
  rename: R,
) -> FsResult<()>
where
  R: Fn(&Path, &Path) -> io::Result<()>,
{
  if let Err(e) = rename(source, dest) {
    log::info!(
      "move {} -> {} failed ({e}); falling back to copy and delete",
      source.display(),
      dest.display()
    );
    copy_entry(source, dest, progress)?;
    delete_path(source)?;
  }
  progress.finish();
  Ok(())
}
