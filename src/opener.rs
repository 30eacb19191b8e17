use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub fn open_default(path: &Path) -> Result<(), String> {
  open::that_detached(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))
}

/// Runs `command` (program plus optional arguments) with `path` appended.
pub fn open_with_command(path: &Path, command: &str) -> Result<(), String> {
  let mut parts = command.split_whitespace();
  let program = parts.next().ok_or_else(|| "Editor command is empty".to_string())?;
  Command::new(program)
    .args(parts)
    .arg(path)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map(|_| ())
    .map_err(|e| format!("Failed to open {} with {program}: {e}", path.display()))
}

/// Directory to show for "reveal": the path itself when it is a directory,
/// otherwise its containing directory.
pub fn reveal_target(path: &Path) -> Option<PathBuf> {
  if path.as_os_str().is_empty() {
    return None;
  }
  if path.is_dir() {
    return Some(path.to_path_buf());
  }
  if path.exists() {
    return path.parent().map(Path::to_path_buf);
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_open_with_empty_command_fails() {
    assert!(open_with_command(Path::new("/tmp"), "   ").is_err());
  }

  #[test]
  fn test_open_with_missing_program_fails() {
    let err = open_with_command(Path::new("/tmp/x.txt"), "nonexistent_editor_xyz --wait").unwrap_err();
    assert!(err.contains("nonexistent_editor_xyz"));
  }

  #[test]
  fn test_reveal_target() {
    let dir = std::env::temp_dir().join(format!("twinpane_reveal_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("a.txt");
    std::fs::write(&file, "a").unwrap();

    assert_eq!(reveal_target(&dir), Some(dir.clone()));
    assert_eq!(reveal_target(&file), Some(dir.clone()));
    assert_eq!(reveal_target(&dir.join("missing")), None);
    assert_eq!(reveal_target(Path::new("")), None);

    let _ = std::fs::remove_dir_all(&dir);
  }
}
