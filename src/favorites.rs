use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::APP_DIR;

/// A bookmarked directory, or a named folder grouping other favorites.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FavoriteItem {
  pub name: String,
  #[serde(default)]
  pub path: PathBuf,
  #[serde(default)]
  pub is_folder: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<FavoriteItem>,
}

impl FavoriteItem {
  pub fn link(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self { name: name.into(), path: path.into(), ..Self::default() }
  }

  pub fn folder(name: impl Into<String>) -> Self {
    Self { name: name.into(), is_folder: true, ..Self::default() }
  }
}

fn find_in<'a>(items: &'a [FavoriteItem], name: &str) -> Option<&'a FavoriteItem> {
  items.iter().find_map(|item| {
    if item.name == name {
      Some(item)
    } else {
      find_in(&item.children, name)
    }
  })
}

fn find_folder_mut<'a>(items: &'a mut [FavoriteItem], name: &str) -> Option<&'a mut FavoriteItem> {
  for item in items {
    if item.is_folder && item.name == name {
      return Some(item);
    }
    if let Some(found) = find_folder_mut(&mut item.children, name) {
      return Some(found);
    }
  }
  None
}

fn remove_in(items: &mut Vec<FavoriteItem>, name: &str) -> usize {
  let before = items.len();
  items.retain(|item| item.name != name);
  let mut removed = before - items.len();
  for item in items.iter_mut() {
    removed += remove_in(&mut item.children, name);
  }
  removed
}

pub struct Favorites {
  path: PathBuf,
  items: Vec<FavoriteItem>,
}

impl Favorites {
  pub fn load() -> Self {
    Self::load_from(Self::favorites_path())
  }

  /// A missing or unreadable file gives an empty list.
  pub fn load_from(path: PathBuf) -> Self {
    let items = match std::fs::read_to_string(&path) {
      Ok(json) if !json.trim().is_empty() => serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("ignoring malformed favorites {}: {e}", path.display());
        Vec::new()
      }),
      _ => Vec::new(),
    };
    Self { path, items }
  }

  pub fn save(&self) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&self.items)?;
    std::fs::write(&self.path, json)
      .with_context(|| format!("failed to write {}", self.path.display()))?;
    Ok(())
  }

  /// Adds a top-level link unless one already points at `path`.
  pub fn add(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
    let path = path.into();
    if !self.contains(&path) {
      self.items.push(FavoriteItem::link(name, path));
    }
  }

  pub fn add_folder(&mut self, name: impl Into<String>) {
    self.items.push(FavoriteItem::folder(name));
  }

  /// Adds a link inside the folder called `folder`. Returns false when no
  /// such folder exists.
  pub fn add_to_folder(&mut self, folder: &str, name: impl Into<String>, path: impl Into<PathBuf>) -> bool {
    match find_folder_mut(&mut self.items, folder) {
      Some(parent) => {
        parent.children.push(FavoriteItem::link(name, path));
        true
      }
      None => false,
    }
  }

  /// Removes every item called `name` at any depth.
  pub fn remove(&mut self, name: &str) -> usize {
    remove_in(&mut self.items, name)
  }

  pub fn list(&self) -> &[FavoriteItem] {
    &self.items
  }

  pub fn find(&self, name: &str) -> Option<&FavoriteItem> {
    find_in(&self.items, name)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn contains(&self, path: &Path) -> bool {
    fn walk(items: &[FavoriteItem], path: &Path) -> bool {
      items.iter().any(|i| (!i.is_folder && i.path == path) || walk(&i.children, path))
    }
    walk(&self.items, path)
  }

  fn favorites_path() -> PathBuf {
    dirs::config_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join(APP_DIR)
      .join("favorites.json")
  }
}
