#[cfg(unix)]
use std::path::Path;
use std::path::PathBuf;

/// Roots of the mounted, ready volumes on this machine.
#[cfg(windows)]
pub fn volume_roots() -> Vec<PathBuf> {
  (b'A'..=b'Z')
    .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
    .filter(|root| std::fs::read_dir(root).is_ok())
    .collect()
}

/// Roots of the mounted, ready volumes on this machine: `/` plus every
/// mount point directly under the usual removable-media directories.
#[cfg(unix)]
pub fn volume_roots() -> Vec<PathBuf> {
  let mut roots = vec![PathBuf::from("/")];
  let mut bases = vec![PathBuf::from("/mnt"), PathBuf::from("/media"), PathBuf::from("/Volumes")];
  if let Ok(read) = std::fs::read_dir("/run/media") {
    bases.extend(read.flatten().map(|e| e.path()));
  }
  for base in bases {
    let Ok(read) = std::fs::read_dir(&base) else { continue };
    for entry in read.flatten() {
      let path = entry.path();
      if is_mount_point(&path, &base) && std::fs::read_dir(&path).is_ok() {
        roots.push(path);
      }
    }
  }
  roots.sort();
  roots.dedup();
  roots
}

#[cfg(not(any(unix, windows)))]
pub fn volume_roots() -> Vec<PathBuf> {
  vec![PathBuf::from("/")]
}

/// A directory on a different device than its parent is mounted there.
#[cfg(unix)]
fn is_mount_point(path: &Path, parent: &Path) -> bool {
  use std::os::unix::fs::MetadataExt;
  match (std::fs::metadata(path), std::fs::metadata(parent)) {
    (Ok(dir), Ok(parent)) => dir.is_dir() && dir.dev() != parent.dev(),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_volume_roots_not_empty() {
    assert!(!volume_roots().is_empty());
  }

  #[cfg(unix)]
  #[test]
  fn test_root_is_first() {
    assert_eq!(volume_roots()[0], PathBuf::from("/"));
  }

  #[cfg(unix)]
  #[test]
  fn test_plain_subdirectory_is_not_a_mount_point() {
    let dir = std::env::temp_dir().join(format!("twinpane_volumes_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("child")).unwrap();
    assert!(!is_mount_point(&dir.join("child"), &dir));
    assert!(!is_mount_point(&dir.join("missing"), &dir));
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_roots_are_unique() {
    let roots = volume_roots();
    let mut deduped = roots.clone();
    deduped.dedup();
    assert_eq!(roots, deduped);
  }
}
