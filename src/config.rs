use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::CompressionLevel;
use crate::keymap::Keymap;
use crate::panel::SortColumn;

pub const APP_DIR: &str = "twinpane";

pub struct Config {
  pub sort_column: SortColumn,
  pub sort_ascending: bool,
  pub show_hidden: bool,
  pub compression_level: CompressionLevel,
  /// Program used to open files instead of the platform default.
  pub editor: Option<String>,
  pub keymap: Keymap,
}

#[derive(Deserialize, Default)]
struct TomlConfig {
  general: Option<GeneralConfig>,
  editor: Option<EditorConfig>,
  keys: Option<HashMap<String, String>>,
}

#[derive(Deserialize, Default)]
struct GeneralConfig {
  sort_column: Option<String>,
  sort_ascending: Option<bool>,
  show_hidden: Option<bool>,
  compression_level: Option<String>,
}

#[derive(Deserialize, Default)]
struct EditorConfig {
  command: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    let mut config = Config::empty();
    let mut errors = Vec::new();
    config.apply_toml_str(Config::default_toml(), &mut errors);
    config
  }
}

impl Config {
  fn empty() -> Self {
    Config {
      sort_column: SortColumn::Name,
      sort_ascending: true,
      show_hidden: true,
      compression_level: CompressionLevel::Optimal,
      editor: None,
      keymap: Keymap::default(),
    }
  }

  fn apply_toml_str(&mut self, s: &str, errors: &mut Vec<String>) {
    let toml_config: TomlConfig = match toml::from_str(s) {
      Ok(c) => c,
      Err(e) => {
        errors.push(format!("failed to parse config.toml: {e}"));
        return;
      }
    };

    if let Some(general) = toml_config.general {
      if let Some(name) = general.sort_column {
        match SortColumn::from_name(&name) {
          Some(column) => self.sort_column = column,
          None => errors.push(format!("invalid sort_column: {name:?}")),
        }
      }
      if let Some(ascending) = general.sort_ascending {
        self.sort_ascending = ascending;
      }
      if let Some(show) = general.show_hidden {
        self.show_hidden = show;
      }
      if let Some(name) = general.compression_level {
        match CompressionLevel::from_name(&name) {
          Some(level) => self.compression_level = level,
          None => errors.push(format!("invalid compression_level: {name:?}")),
        }
      }
    }

    if let Some(editor) = toml_config.editor {
      self.editor = editor.command.filter(|c| !c.trim().is_empty());
    }

    // A user [keys] table replaces the defaults wholesale.
    if let Some(keys) = toml_config.keys {
      self.keymap = Keymap::default();
      self.keymap.apply_table(&keys, errors);
    }
  }

  pub fn default_toml() -> &'static str {
    r#"[general]
sort_column = "name"          # name | extension | date_modified | size | file_version
sort_ascending = true
show_hidden = true
compression_level = "optimal" # optimal | fastest | no_compression | smallest_size

[editor]
# command = "code --wait"     # used by F4/open instead of the system default

[keys]
up = "move_up"
down = "move_down"
"shift+up" = "extend_up"
"shift+down" = "extend_down"
tab = "switch_pane"
enter = "open"
backspace = "go_parent"
"ctrl+a" = "select_all"
"ctrl+r" = "refresh"
"ctrl+e" = "reveal"
f2 = "rename"
f3 = "view"
f4 = "edit"
f5 = "copy"
f6 = "move"
f7 = "make_dir"
f8 = "delete"
delete = "delete"
"alt+f5" = "zip"
"alt+f9" = "unzip"
"ctrl+f3" = "sort_by_name"
"ctrl+f4" = "sort_by_extension"
"ctrl+f5" = "sort_by_date_modified"
"ctrl+f6" = "sort_by_size"
"#
  }

  pub fn config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
      .map(|d| d.join(APP_DIR).join("config.toml"))
      .ok_or_else(|| "could not determine config directory".to_string())
  }

  pub fn dump_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    }

    std::fs::write(path, Self::default_toml())
      .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    Ok(())
  }

  /// Reads the user config. A missing file yields defaults; problems are
  /// returned as messages rather than failing.
  pub fn load() -> (Config, Vec<String>) {
    let mut errors = Vec::new();
    let content = Self::config_path().ok().and_then(|p| std::fs::read_to_string(p).ok());
    let config = match content {
      Some(s) => Self::load_from_str_with_errors(&s, &mut errors),
      None => Config::default(),
    };
    (config, errors)
  }

  pub fn load_from_str(s: &str) -> Config {
    let mut errors = Vec::new();
    Self::load_from_str_with_errors(s, &mut errors)
  }

  pub fn load_from_str_with_errors(s: &str, errors: &mut Vec<String>) -> Config {
    let mut config = Config::default();
    config.apply_toml_str(s, errors);
    config
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::action::Action;
  use crate::keymap::{KeyBinding, KeyInput, parse_key_binding};

  fn bound(config: &Config, key: &str) -> Option<Action> {
    config.keymap.get(&parse_key_binding(key).unwrap())
  }

  #[test]
  fn test_default_general_values() {
    let config = Config::default();
    assert_eq!(config.sort_column, SortColumn::Name);
    assert!(config.sort_ascending);
    assert!(config.show_hidden);
    assert_eq!(config.compression_level, CompressionLevel::Optimal);
    assert!(config.editor.is_none());
  }

  #[test]
  fn test_default_has_all_bindings() {
    let config = Config::default();
    let expected = vec![
      ("up", Action::MoveUp),
      ("down", Action::MoveDown),
      ("shift+up", Action::ExtendUp),
      ("shift+down", Action::ExtendDown),
      ("tab", Action::SwitchPane),
      ("enter", Action::Open),
      ("backspace", Action::GoParent),
      ("ctrl+a", Action::SelectAll),
      ("ctrl+r", Action::Refresh),
      ("f2", Action::Rename),
      ("f3", Action::View),
      ("f4", Action::Edit),
      ("f5", Action::Copy),
      ("f6", Action::Move),
      ("f7", Action::MakeDir),
      ("f8", Action::Delete),
      ("ctrl+f3", Action::SortBy(SortColumn::Name)),
      ("ctrl+f4", Action::SortBy(SortColumn::Extension)),
      ("ctrl+f5", Action::SortBy(SortColumn::DateModified)),
      ("ctrl+f6", Action::SortBy(SortColumn::Size)),
    ];
    for (key, action) in expected {
      assert_eq!(bound(&config, key), Some(action), "missing binding for {key}");
    }
  }

  #[test]
  fn test_load_empty_string() {
    let config = Config::load_from_str("");
    assert_eq!(config.sort_column, SortColumn::Name);
    assert_eq!(config.keymap.len(), Config::default().keymap.len());
  }

  #[test]
  fn test_load_general_overrides() {
    let toml = r#"
[general]
sort_column = "size"
sort_ascending = false
show_hidden = false
compression_level = "smallest_size"

[editor]
command = "vim"
"#;
    let config = Config::load_from_str(toml);
    assert_eq!(config.sort_column, SortColumn::Size);
    assert!(!config.sort_ascending);
    assert!(!config.show_hidden);
    assert_eq!(config.compression_level, CompressionLevel::SmallestSize);
    assert_eq!(config.editor.as_deref(), Some("vim"));
  }

  #[test]
  fn test_invalid_general_values_reported() {
    let toml = r#"
[general]
sort_column = "colour"
compression_level = "maximum"
"#;
    let mut errors = Vec::new();
    let config = Config::load_from_str_with_errors(toml, &mut errors);
    assert_eq!(errors.len(), 2);
    assert_eq!(config.sort_column, SortColumn::Name);
    assert_eq!(config.compression_level, CompressionLevel::Optimal);
  }

  #[test]
  fn test_user_keys_section_replaces_defaults() {
    let toml = r#"
[keys]
j = "move_down"
k = "move_up"
"#;
    let config = Config::load_from_str(toml);
    assert_eq!(config.keymap.len(), 2);
    assert_eq!(bound(&config, "j"), Some(Action::MoveDown));
    assert_eq!(bound(&config, "f5"), None);
    assert_eq!(config.keymap.translate(&KeyInput::new("x")), Some(Action::Seek('x')));
  }

  #[test]
  fn test_load_invalid_entries_skipped() {
    let toml = r#"
[keys]
j = "invalid_action"
"" = "move_up"
k = "move_up"
"#;
    let mut errors = Vec::new();
    let config = Config::load_from_str_with_errors(toml, &mut errors);
    assert_eq!(errors.len(), 2);
    assert_eq!(config.keymap.len(), 1);
    assert_eq!(bound(&config, "k"), Some(Action::MoveUp));
  }

  #[test]
  fn test_empty_editor_command_ignored() {
    let config = Config::load_from_str("[editor]\ncommand = \"  \"\n");
    assert!(config.editor.is_none());
  }

  #[test]
  fn test_default_toml_is_valid_toml() {
    let result: Result<TomlConfig, _> = toml::from_str(Config::default_toml());
    assert!(result.is_ok(), "default_toml() is not valid TOML: {:?}", result.err());
  }

  #[test]
  fn test_default_derives_from_toml_not_hardcoded() {
    assert!(Config::empty().keymap.is_empty());
    assert!(!Config::default().keymap.is_empty());
  }

  #[test]
  fn test_load_malformed_toml_returns_default() {
    let mut errors = Vec::new();
    let config = Config::load_from_str_with_errors("this is not [valid toml", &mut errors);
    assert_eq!(errors.len(), 1);
    assert_eq!(config.sort_column, SortColumn::Name);
    assert!(config.keymap.get(&KeyBinding::plain(crate::keymap::Key::Enter)).is_some());
  }

  #[test]
  fn test_dump_default_config_round_trips() {
    let dir = std::env::temp_dir().join(format!("twinpane_config_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("nested").join("config.toml");
    Config::dump_default_config(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, Config::default_toml());
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_config_path_ends_with_app_dir() {
    if let Ok(path) = Config::config_path() {
      assert!(path.ends_with(Path::new(APP_DIR).join("config.toml")));
    }
  }
}
