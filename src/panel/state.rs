use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::sort::{SortColumn, sort_entries};
use crate::fs::FileSystemEntry;

/// How `select_item` combines the clicked entry with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOptions {
  pub clear_existing: bool,
  pub toggle: bool,
  pub range: bool,
}

impl Default for SelectOptions {
  fn default() -> Self {
    Self::single()
  }
}

impl SelectOptions {
  /// Plain click: the entry becomes the whole selection.
  pub fn single() -> Self {
    Self { clear_existing: true, toggle: false, range: false }
  }

  /// Ctrl+click.
  pub fn toggle() -> Self {
    Self { clear_existing: false, toggle: true, range: false }
  }

  /// Shift+click.
  pub fn range() -> Self {
    Self { clear_existing: true, toggle: false, range: true }
  }

  /// Add to the selection without clearing it.
  pub fn add() -> Self {
    Self { clear_existing: false, toggle: false, range: false }
  }
}

/// Selection and ordering state of one pane. Entries are tracked by path, so
/// anything that refers to an entry stays meaningful across a refresh.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
  current_path: PathBuf,
  items: Vec<FileSystemEntry>,
  selected: HashSet<PathBuf>,
  selected_item: Option<PathBuf>,
  pivot: Option<PathBuf>,
  sort_column: SortColumn,
  sort_ascending: bool,
}

impl PanelState {
  pub fn new() -> Self {
    Self { sort_ascending: true, ..Self::default() }
  }

  pub fn with_sort(column: SortColumn, ascending: bool) -> Self {
    Self { sort_column: column, sort_ascending: ascending, ..Self::default() }
  }

  /// Empty means the drives pseudo-directory.
  pub fn current_path(&self) -> &Path {
    &self.current_path
  }

  pub fn items(&self) -> &[FileSystemEntry] {
    &self.items
  }

  pub fn sort_column(&self) -> SortColumn {
    self.sort_column
  }

  pub fn sort_ascending(&self) -> bool {
    self.sort_ascending
  }

  pub fn is_selected(&self, path: &Path) -> bool {
    self.selected.contains(path)
  }

  pub fn selected_count(&self) -> usize {
    self.selected.len()
  }

  pub fn index_of(&self, path: &Path) -> Option<usize> {
    self.items.iter().position(|e| e.path == path)
  }

  /// The focused entry, if it is still part of the listing.
  pub fn selected_entry(&self) -> Option<&FileSystemEntry> {
    let path = self.selected_item.as_deref()?;
    self.items.iter().find(|e| e.path == path)
  }

  /// Selected entries in listing order.
  pub fn selected_entries(&self) -> Vec<&FileSystemEntry> {
    self.items.iter().filter(|e| self.selected.contains(&e.path)).collect()
  }

  pub fn selected_paths(&self) -> Vec<PathBuf> {
    self.selected_entries().into_iter().map(|e| e.path.clone()).collect()
  }

  pub fn pivot_index(&self) -> Option<usize> {
    self.pivot.as_deref().and_then(|p| self.index_of(p))
  }

  pub fn selected_total_size(&self) -> u64 {
    self.selected_entries().iter().map(|e| e.size).sum()
  }

  /// Replaces the listing, drops selection state that no longer matches an
  /// entry by path, and re-applies the current ordering.
  pub fn set_listing(&mut self, path: PathBuf, items: Vec<FileSystemEntry>) {
    let navigated = path != self.current_path;
    self.current_path = path;
    self.items = items;
    if navigated {
      self.clear_selection();
    } else {
      let present: HashSet<&Path> = self.items.iter().map(|e| e.path.as_path()).collect();
      self.selected.retain(|p| present.contains(p.as_path()));
      if self.selected_item.as_deref().is_some_and(|p| !present.contains(p)) {
        self.selected_item = None;
      }
      if self.pivot.as_deref().is_some_and(|p| !present.contains(p)) {
        self.pivot = None;
      }
    }
    self.sort(None);
  }

  /// Same column toggles direction, a new column starts ascending, `None`
  /// re-applies the current ordering.
  pub fn sort(&mut self, column: Option<SortColumn>) {
    match column {
      Some(c) if c == self.sort_column => self.sort_ascending = !self.sort_ascending,
      Some(c) => {
        self.sort_column = c;
        self.sort_ascending = true;
      }
      None => {}
    }
    sort_entries(&mut self.items, self.sort_column, self.sort_ascending);
  }

  /// `None` clears everything. A path that is not in the listing is ignored.
  pub fn select_item(&mut self, path: Option<&Path>, options: SelectOptions) {
    let Some(path) = path else {
      self.clear_selection();
      return;
    };
    let Some(index) = self.index_of(path) else {
      log::debug!("ignoring selection of {} outside the listing", path.display());
      return;
    };
    let path = self.items[index].path.clone();

    if options.range
      && let Some(pivot) = self.pivot_index()
    {
      let (lo, hi) = if pivot <= index { (pivot, index) } else { (index, pivot) };
      self.selected = self.items[lo..=hi].iter().map(|e| e.path.clone()).collect();
    } else if options.toggle {
      if !self.selected.remove(&path) {
        self.selected.insert(path.clone());
      }
      self.pivot = Some(path.clone());
    } else {
      if options.clear_existing {
        self.selected.clear();
      }
      self.selected.insert(path.clone());
      self.pivot = Some(path.clone());
    }
    self.selected_item = Some(path);
  }

  /// Keyboard up/down. Starts at the first entry when nothing is focused and
  /// clamps at both ends.
  pub fn move_selection(&mut self, steps: isize, range: bool) {
    if self.items.is_empty() {
      return;
    }
    let current = self.selected_item.as_deref().and_then(|p| self.index_of(p));
    let (target, options) = match current {
      None => (0, SelectOptions::single()),
      Some(index) => {
        let last = self.items.len() - 1;
        let target = index.saturating_add_signed(steps).min(last);
        let options = if range { SelectOptions::range() } else { SelectOptions::single() };
        (target, options)
      }
    };
    let path = self.items[target].path.clone();
    self.select_item(Some(&path), options);
  }

  /// Type-ahead: focuses the next entry whose name starts with `prefix`
  /// (case-insensitive), cycling through the matches on repeated calls.
  pub fn seek(&mut self, prefix: &str) {
    if self.items.is_empty() || prefix.is_empty() {
      return;
    }
    let prefix = prefix.to_lowercase();
    let matches: Vec<usize> = self
      .items
      .iter()
      .enumerate()
      .filter(|(_, e)| e.name.to_lowercase().starts_with(&prefix))
      .map(|(i, _)| i)
      .collect();
    if matches.is_empty() {
      return;
    }

    let focused = self.selected_item.as_deref().and_then(|p| self.index_of(p));
    let next = match focused.and_then(|f| matches.iter().position(|&m| m == f)) {
      Some(pos) => matches[(pos + 1) % matches.len()],
      None => matches[0],
    };
    let path = self.items[next].path.clone();
    self.select_item(Some(&path), SelectOptions::single());
  }

  pub fn select_all(&mut self) {
    self.selected = self.items.iter().map(|e| e.path.clone()).collect();
    if self.selected_item.is_none() {
      self.selected_item = self.items.first().map(|e| e.path.clone());
    }
  }

  /// Applies a rubber-band selection by listing index. Out-of-range indices
  /// are skipped.
  pub fn select_indices(&mut self, indices: &[usize], append: bool) {
    if !append {
      self.selected.clear();
    }
    let mut last = None;
    for &index in indices {
      if let Some(entry) = self.items.get(index) {
        self.selected.insert(entry.path.clone());
        last = Some(entry.path.clone());
      }
    }
    if let Some(path) = last {
      self.pivot = Some(path.clone());
      self.selected_item = Some(path);
    }
  }

  pub fn clear_selection(&mut self) {
    self.selected.clear();
    self.selected_item = None;
    self.pivot = None;
  }
}
