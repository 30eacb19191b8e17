use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::action::Action;
use crate::clipboard::{Clipboard, ClipboardOp};
use crate::config::Config;
use crate::fs::FileSystemGateway;
use crate::keymap::KeyInput;
use crate::operation::{Operation, ProgressTracker};
use crate::panel::{PanelState, SelectOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  Left,
  Right,
}

impl Pane {
  pub fn other(self) -> Pane {
    match self {
      Pane::Left => Pane::Right,
      Pane::Right => Pane::Left,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePrompt {
  Rename { current: String },
  MakeDir,
}

/// What the UI has to do after an action was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
  None,
  /// Hand to `operation::spawn`, then call `App::finish_operation`.
  Run(Operation),
  /// Ask for a name, then call `rename_selected` or `make_directory`.
  AskName(NamePrompt),
}

/// Both panes plus everything shared between them.
pub struct App {
  pub left: PanelState,
  pub right: PanelState,
  active: Pane,
  gateway: Arc<dyn FileSystemGateway>,
  pub clipboard: Clipboard,
  pub config: Config,
  pub progress: ProgressTracker,
  pub status_message: Option<String>,
}

impl App {
  pub fn new(gateway: Arc<dyn FileSystemGateway>, config: Config) -> Self {
    let panel = PanelState::with_sort(config.sort_column, config.sort_ascending);
    Self {
      left: panel.clone(),
      right: panel,
      active: Pane::Left,
      gateway,
      clipboard: Clipboard::default(),
      config,
      progress: ProgressTracker::default(),
      status_message: None,
    }
  }

  pub fn gateway(&self) -> Arc<dyn FileSystemGateway> {
    Arc::clone(&self.gateway)
  }

  pub fn active_pane(&self) -> Pane {
    self.active
  }

  pub fn panel(&self, pane: Pane) -> &PanelState {
    match pane {
      Pane::Left => &self.left,
      Pane::Right => &self.right,
    }
  }

  pub fn panel_mut(&mut self, pane: Pane) -> &mut PanelState {
    match pane {
      Pane::Left => &mut self.left,
      Pane::Right => &mut self.right,
    }
  }

  pub fn active(&self) -> &PanelState {
    self.panel(self.active)
  }

  pub fn active_mut(&mut self) -> &mut PanelState {
    self.panel_mut(self.active)
  }

  pub fn inactive(&self) -> &PanelState {
    self.panel(self.active.other())
  }

  /// Shows `path` in `pane`. An empty or missing path shows the drives.
  pub fn navigate(&mut self, pane: Pane, path: impl Into<PathBuf>) {
    let mut path = path.into();
    if !path.as_os_str().is_empty() && !self.gateway.exists(&path) {
      log::debug!("{} is gone, showing drives", path.display());
      path = PathBuf::new();
    }
    let mut items = self.gateway.list_directory(&path);
    if !self.config.show_hidden {
      items.retain(|e| !e.is_hidden());
    }
    self.panel_mut(pane).set_listing(path, items);
  }

  pub fn refresh(&mut self, pane: Pane) {
    let path = self.panel(pane).current_path().to_path_buf();
    self.navigate(pane, path);
  }

  pub fn refresh_all(&mut self) {
    self.refresh(Pane::Left);
    self.refresh(Pane::Right);
  }

  /// Moves the active pane up one level and focuses the directory it came from.
  pub fn go_parent(&mut self) {
    let current = self.active().current_path().to_path_buf();
    if current.as_os_str().is_empty() {
      return;
    }
    let parent = self.gateway.parent_path(&current);
    let pane = self.active;
    self.navigate(pane, parent);
    self.active_mut().select_item(Some(&current), SelectOptions::single());
  }

  /// Directories are entered, files are handed to the opener.
  pub fn open_selected(&mut self) {
    let Some(entry) = self.active().selected_entry() else {
      return;
    };
    let path = entry.path.clone();
    if entry.is_dir() {
      let pane = self.active;
      self.navigate(pane, path);
    } else {
      self.gateway.open_file(&path);
    }
  }

  pub fn switch_pane(&mut self) {
    self.active = self.active.other();
  }

  pub fn handle_key(&mut self, input: &KeyInput) -> Result<Effect> {
    match self.config.keymap.translate(input) {
      Some(action) => self.apply(action),
      None => Ok(Effect::None),
    }
  }

  pub fn apply(&mut self, action: Action) -> Result<Effect> {
    match action {
      Action::MoveUp => self.active_mut().move_selection(-1, false),
      Action::MoveDown => self.active_mut().move_selection(1, false),
      Action::ExtendUp => self.active_mut().move_selection(-1, true),
      Action::ExtendDown => self.active_mut().move_selection(1, true),
      Action::SwitchPane => self.switch_pane(),
      Action::Open => self.open_selected(),
      Action::GoParent => self.go_parent(),
      Action::SelectAll => self.active_mut().select_all(),
      Action::Seek(c) => self.active_mut().seek(&c.to_string()),
      Action::Refresh => self.refresh_all(),
      Action::SortBy(column) => self.active_mut().sort(Some(column)),
      Action::View | Action::Edit => {
        if let Some(entry) = self.active().selected_entry()
          && !entry.is_dir()
        {
          self.gateway.open_file(&entry.path);
        }
      }
      Action::Reveal => {
        let target = match self.active().selected_entry() {
          Some(entry) => entry.path.clone(),
          None => self.active().current_path().to_path_buf(),
        };
        self.gateway.reveal_in_file_manager(&target);
      }
      Action::Rename => {
        if let Some(entry) = self.active().selected_entry() {
          return Ok(Effect::AskName(NamePrompt::Rename { current: entry.name.clone() }));
        }
      }
      Action::MakeDir => {
        if !self.active().current_path().as_os_str().is_empty() {
          return Ok(Effect::AskName(NamePrompt::MakeDir));
        }
      }
      Action::Copy => return Ok(self.transfer_operation(ClipboardOp::Copy).map_or(Effect::None, Effect::Run)),
      Action::Move => return Ok(self.transfer_operation(ClipboardOp::Cut).map_or(Effect::None, Effect::Run)),
      Action::Delete => return Ok(self.delete_operation().map_or(Effect::None, Effect::Run)),
      Action::Zip => return Ok(self.zip_operation().map_or(Effect::None, Effect::Run)),
      Action::Unzip => return Ok(self.unzip_operation().map_or(Effect::None, Effect::Run)),
    }
    Ok(Effect::None)
  }

  /// Selected paths of the active pane, or the focused entry when nothing is
  /// selected.
  pub fn targets(&self) -> Vec<PathBuf> {
    let panel = self.active();
    let selected = panel.selected_paths();
    if !selected.is_empty() {
      return selected;
    }
    panel.selected_entry().map(|e| vec![e.path.clone()]).unwrap_or_default()
  }

  /// F5/F6: copy or move the targets into the other pane's directory.
  pub fn transfer_operation(&self, op: ClipboardOp) -> Option<Operation> {
    let sources = self.targets();
    let dest_dir = self.inactive().current_path().to_path_buf();
    if sources.is_empty() || dest_dir.as_os_str().is_empty() {
      return None;
    }
    Some(match op {
      ClipboardOp::Copy => Operation::Copy { sources, dest_dir },
      ClipboardOp::Cut => Operation::Move { sources, dest_dir },
    })
  }

  pub fn copy_selected(&mut self) {
    let targets = self.targets();
    self.status_message = Some(format!("Copied {} item(s)", targets.len()));
    self.clipboard.copy(targets);
  }

  pub fn cut_selected(&mut self) {
    let targets = self.targets();
    self.status_message = Some(format!("Cut {} item(s)", targets.len()));
    self.clipboard.cut(targets);
  }

  /// Builds the paste into the active pane's directory. A cut is consumed by
  /// this call; a copy stays on the clipboard.
  pub fn paste_operation(&mut self) -> Option<Operation> {
    let op = self.clipboard.op?;
    let dest_dir = self.active().current_path().to_path_buf();
    if self.clipboard.is_empty() || dest_dir.as_os_str().is_empty() {
      return None;
    }
    let sources = self.clipboard.paths.clone();
    Some(match op {
      ClipboardOp::Copy => Operation::Copy { sources, dest_dir },
      ClipboardOp::Cut => {
        self.clipboard.clear();
        Operation::Move { sources, dest_dir }
      }
    })
  }

  pub fn delete_operation(&mut self) -> Option<Operation> {
    let paths = self.targets();
    if paths.is_empty() {
      return None;
    }
    for path in &paths {
      self.clipboard.forget(path);
    }
    Some(Operation::Delete { paths })
  }

  /// Archives the targets into `<other pane>/<first target>.zip`.
  pub fn zip_operation(&self) -> Option<Operation> {
    let sources = self.targets();
    let first = sources.first()?;
    let dest_dir = self.inactive().current_path();
    if dest_dir.as_os_str().is_empty() {
      return None;
    }
    let stem = first.file_stem()?.to_string_lossy().to_string();
    Some(Operation::Zip {
      dest: dest_dir.join(format!("{stem}.zip")),
      sources,
      level: self.config.compression_level,
    })
  }

  /// Extracts the focused archive into a directory named after it in the
  /// other pane.
  pub fn unzip_operation(&self) -> Option<Operation> {
    let entry = self.active().selected_entry()?;
    if entry.is_dir() || !entry.extension.eq_ignore_ascii_case(".zip") {
      return None;
    }
    let dest_dir = self.inactive().current_path();
    if dest_dir.as_os_str().is_empty() {
      return None;
    }
    let stem = entry.path.file_stem()?;
    Some(Operation::Unzip { archive: entry.path.clone(), dest_dir: dest_dir.join(stem) })
  }

  pub fn rename_selected(&mut self, new_name: &str) -> Result<()> {
    let new_name = new_name.trim();
    if new_name.is_empty() || new_name.contains(['/', '\\']) {
      bail!("invalid name: {new_name:?}");
    }
    let Some(entry) = self.active().selected_entry() else {
      return Ok(());
    };
    let old_path = entry.path.clone();
    let new_path = old_path.with_file_name(new_name);
    if new_path == old_path {
      return Ok(());
    }
    self.gateway.rename_entry(&old_path, &new_path)?;
    for p in &mut self.clipboard.paths {
      if *p == old_path {
        *p = new_path.clone();
      }
    }
    self.refresh_all();
    self.active_mut().select_item(Some(&new_path), SelectOptions::single());
    self.status_message = Some(format!("Renamed to {new_name}"));
    Ok(())
  }

  pub fn make_directory(&mut self, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) {
      bail!("invalid name: {name:?}");
    }
    let current = self.active().current_path().to_path_buf();
    if current.as_os_str().is_empty() {
      bail!("cannot create a directory in the drives list");
    }
    let path = current.join(name);
    self.gateway.create_directory(&path)?;
    self.refresh_all();
    self.active_mut().select_item(Some(&path), SelectOptions::single());
    Ok(())
  }

  /// Call once a spawned operation reported `Finished`.
  pub fn finish_operation(&mut self, result: Result<(), String>) {
    self.progress.stop();
    self.status_message = Some(match result {
      Ok(()) => "Done".to_string(),
      Err(e) => format!("Failed: {e}"),
    });
    self.refresh_all();
  }

  pub fn is_selected(&self, pane: Pane, path: &Path) -> bool {
    self.panel(pane).is_selected(path)
  }
}
