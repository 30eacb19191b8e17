use std::cmp::Ordering;

use serde::Deserialize;

use crate::fs::FileSystemEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
  #[default]
  Name,
  Extension,
  DateModified,
  Size,
  FileVersion,
}

impl SortColumn {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().replace('-', "_").as_str() {
      "name" => Some(Self::Name),
      "extension" | "ext" => Some(Self::Extension),
      "date_modified" | "date" | "modified" => Some(Self::DateModified),
      "size" => Some(Self::Size),
      "file_version" | "version" => Some(Self::FileVersion),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Name => "name",
      Self::Extension => "extension",
      Self::DateModified => "date_modified",
      Self::Size => "size",
      Self::FileVersion => "file_version",
    }
  }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
  a.chars()
    .flat_map(char::to_lowercase)
    .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Directories always come before files; `ascending` only flips the
/// ordering inside each group.
pub fn compare_entries(
  a: &FileSystemEntry,
  b: &FileSystemEntry,
  column: SortColumn,
  ascending: bool,
) -> Ordering {
  let group = b.is_dir().cmp(&a.is_dir());
  if group != Ordering::Equal {
    return group;
  }

  let ord = match column {
    SortColumn::Name => cmp_ignore_case(&a.name, &b.name),
    SortColumn::Extension => cmp_ignore_case(&a.extension, &b.extension),
    SortColumn::FileVersion => cmp_ignore_case(
      a.file_version.as_deref().unwrap_or(""),
      b.file_version.as_deref().unwrap_or(""),
    ),
    SortColumn::DateModified => a.last_modified.cmp(&b.last_modified),
    SortColumn::Size => a.size.cmp(&b.size),
  };

  if ascending { ord } else { ord.reverse() }
}

/// Stable in-place sort; equal keys keep their relative order.
pub fn sort_entries(entries: &mut [FileSystemEntry], column: SortColumn, ascending: bool) {
  entries.sort_by(|a, b| compare_entries(a, b, column, ascending));
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;
  use std::time::{Duration, SystemTime};

  fn file(name: &str, size: u64, age_secs: u64) -> FileSystemEntry {
    FileSystemEntry::file(
      PathBuf::from("/t").join(name),
      name.to_string(),
      SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs),
      size,
      None,
    )
  }

  fn dir(name: &str) -> FileSystemEntry {
    FileSystemEntry::directory(PathBuf::from("/t").join(name), name.to_string(), SystemTime::UNIX_EPOCH)
  }

  fn names(entries: &[FileSystemEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
  }

  #[test]
  fn test_from_name() {
    assert_eq!(SortColumn::from_name("Name"), Some(SortColumn::Name));
    assert_eq!(SortColumn::from_name("date-modified"), Some(SortColumn::DateModified));
    assert_eq!(SortColumn::from_name("version"), Some(SortColumn::FileVersion));
    assert_eq!(SortColumn::from_name("colour"), None);
    for column in [
      SortColumn::Name,
      SortColumn::Extension,
      SortColumn::DateModified,
      SortColumn::Size,
      SortColumn::FileVersion,
    ] {
      assert_eq!(SortColumn::from_name(column.as_str()), Some(column));
    }
  }

  #[test]
  fn test_name_is_case_insensitive() {
    let mut entries = vec![file("beta.txt", 1, 0), file("Alpha.txt", 1, 0), file("gamma.txt", 1, 0)];
    sort_entries(&mut entries, SortColumn::Name, true);
    assert_eq!(names(&entries), vec!["Alpha.txt", "beta.txt", "gamma.txt"]);
  }

  #[test]
  fn test_directories_first_even_descending() {
    let mut entries = vec![file("a.txt", 1, 0), dir("zeta"), file("z.txt", 1, 0), dir("alpha")];
    sort_entries(&mut entries, SortColumn::Name, false);
    assert_eq!(names(&entries), vec!["zeta", "alpha", "z.txt", "a.txt"]);
    sort_entries(&mut entries, SortColumn::Size, true);
    assert!(entries[0].is_dir() && entries[1].is_dir());
  }

  #[test]
  fn test_size_and_date_are_numeric() {
    let mut entries = vec![file("a", 100, 5), file("b", 9, 1), file("c", 20, 3)];
    sort_entries(&mut entries, SortColumn::Size, true);
    assert_eq!(names(&entries), vec!["b", "c", "a"]);
    sort_entries(&mut entries, SortColumn::DateModified, true);
    assert_eq!(names(&entries), vec!["a", "c", "b"]);
    sort_entries(&mut entries, SortColumn::DateModified, false);
    assert_eq!(names(&entries), vec!["b", "c", "a"]);
  }

  #[test]
  fn test_stable_and_idempotent() {
    let mut entries = vec![
      file("one.TXT", 1, 0),
      file("two.rs", 1, 0),
      file("three.txt", 1, 0),
      file("four.rs", 1, 0),
    ];
    sort_entries(&mut entries, SortColumn::Extension, true);
    assert_eq!(names(&entries), vec!["two.rs", "four.rs", "one.TXT", "three.txt"]);
    let snapshot = entries.clone();
    sort_entries(&mut entries, SortColumn::Extension, true);
    assert_eq!(entries, snapshot);
  }

  #[test]
  fn test_file_version_missing_sorts_first() {
    let mut with_version = file("app.exe", 1, 0);
    with_version.file_version = Some("1.2.0.0".into());
    let mut entries = vec![with_version, file("lib.dll", 1, 0)];
    sort_entries(&mut entries, SortColumn::FileVersion, true);
    assert_eq!(names(&entries), vec!["lib.dll", "app.exe"]);
  }
}
