use std::collections::HashMap;

use serde::Deserialize;

use crate::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
  Char(char),
  Up,
  Down,
  Left,
  Right,
  Tab,
  Enter,
  Backspace,
  Delete,
  Escape,
  Home,
  End,
  PageUp,
  PageDown,
  F(u8),
}

impl Key {
  /// Accepts config names (`up`, `f5`) as well as browser key names
  /// (`ArrowUp`, `F5`).
  pub fn from_name(s: &str) -> Option<Key> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
      return Some(Key::Char(c.to_lowercase().next().unwrap_or(c)));
    }
    match s.to_lowercase().as_str() {
      "up" | "arrowup" => Some(Key::Up),
      "down" | "arrowdown" => Some(Key::Down),
      "left" | "arrowleft" => Some(Key::Left),
      "right" | "arrowright" => Some(Key::Right),
      "tab" => Some(Key::Tab),
      "enter" => Some(Key::Enter),
      "backspace" => Some(Key::Backspace),
      "delete" | "del" => Some(Key::Delete),
      "esc" | "escape" => Some(Key::Escape),
      "home" => Some(Key::Home),
      "end" => Some(Key::End),
      "pageup" => Some(Key::PageUp),
      "pagedown" => Some(Key::PageDown),
      "space" => Some(Key::Char(' ')),
      s if s.starts_with('f') && s.len() > 1 => {
        s[1..].parse::<u8>().ok().filter(|&n| (1..=24).contains(&n)).map(Key::F)
      }
      _ => None,
    }
  }
}

/// A key event as the UI layer delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct KeyInput {
  pub key: String,
  #[serde(default, alias = "shiftKey")]
  pub shift: bool,
  #[serde(default, alias = "ctrlKey")]
  pub ctrl: bool,
  #[serde(default, alias = "altKey")]
  pub alt: bool,
}

impl KeyInput {
  pub fn new(key: impl Into<String>) -> Self {
    Self { key: key.into(), ..Self::default() }
  }

  pub fn shift(mut self) -> Self {
    self.shift = true;
    self
  }

  pub fn ctrl(mut self) -> Self {
    self.ctrl = true;
    self
  }

  pub fn alt(mut self) -> Self {
    self.alt = true;
    self
  }

  /// The typed character, for keys that produce exactly one.
  fn printable(&self) -> Option<char> {
    let mut chars = self.key.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) if !c.is_control() => Some(c),
      _ => None,
    }
  }
}

/// Character keys match case-insensitively and ignore Shift, since the
/// character itself already carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
  pub key: Key,
  pub ctrl: bool,
  pub shift: bool,
  pub alt: bool,
}

impl KeyBinding {
  pub fn plain(key: Key) -> Self {
    Self { key, ctrl: false, shift: false, alt: false }
  }

  pub fn from_input(input: &KeyInput) -> Option<Self> {
    let key = Key::from_name(&input.key)?;
    let shift = input.shift && !matches!(key, Key::Char(_));
    Some(Self { key, ctrl: input.ctrl, shift, alt: input.alt })
  }

  pub fn display_key(&self) -> String {
    let key_name = match self.key {
      Key::Char(' ') => "Space".to_string(),
      Key::Char(c) => c.to_uppercase().to_string(),
      Key::F(n) => format!("F{n}"),
      other => format!("{other:?}"),
    };
    let mut out = String::new();
    if self.ctrl {
      out.push_str("Ctrl+");
    }
    if self.alt {
      out.push_str("Alt+");
    }
    if self.shift {
      out.push_str("Shift+");
    }
    out.push_str(&key_name);
    out
  }
}

/// Parses `ctrl+a`, `shift+up`, `alt+f5`, `f2`, `+`. Modifiers may be combined.
pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
  if s.is_empty() {
    return None;
  }
  if s.chars().count() == 1 {
    return Key::from_name(s).map(KeyBinding::plain);
  }

  let parts: Vec<&str> = s.split('+').collect();
  let (key_str, modifiers) = parts.split_last()?;
  let key = Key::from_name(key_str)?;
  let mut binding = KeyBinding::plain(key);
  for modifier in modifiers {
    match modifier.to_lowercase().as_str() {
      "ctrl" | "control" => binding.ctrl = true,
      "alt" => binding.alt = true,
      "shift" => binding.shift = !matches!(key, Key::Char(_)),
      _ => return None,
    }
  }
  Some(binding)
}

/// Maps key input to panel actions.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
  bindings: HashMap<KeyBinding, Action>,
}

impl Keymap {
  pub fn bind(&mut self, binding: KeyBinding, action: Action) {
    self.bindings.insert(binding, action);
  }

  pub fn unbind(&mut self, binding: &KeyBinding) {
    self.bindings.remove(binding);
  }

  pub fn get(&self, binding: &KeyBinding) -> Option<Action> {
    self.bindings.get(binding).copied()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  /// Applies a `key = "action"` table on top of the current bindings. The
  /// action `none` removes a binding. Bad entries are reported and skipped.
  pub fn apply_table(&mut self, table: &HashMap<String, String>, errors: &mut Vec<String>) {
    for (key_str, action_str) in table {
      let Some(binding) = parse_key_binding(key_str) else {
        errors.push(format!("invalid key binding: {key_str:?}"));
        continue;
      };
      if action_str == "none" {
        self.unbind(&binding);
        continue;
      }
      let Some(action) = Action::from_name(action_str) else {
        errors.push(format!("invalid action: {action_str:?}"));
        continue;
      };
      self.bind(binding, action);
    }
  }

  /// Bound keys win. Otherwise a single printable character typed without
  /// Ctrl or Alt becomes a seek.
  pub fn translate(&self, input: &KeyInput) -> Option<Action> {
    if let Some(action) = KeyBinding::from_input(input).and_then(|b| self.get(&b)) {
      return Some(action);
    }
    if input.ctrl || input.alt {
      return None;
    }
    input.printable().map(Action::Seek)
  }

  pub fn reverse_lookup(&self) -> HashMap<Action, Vec<String>> {
    let mut map: HashMap<Action, Vec<String>> = HashMap::new();
    for (binding, action) in &self.bindings {
      map.entry(*action).or_default().push(binding.display_key());
    }
    for keys in map.values_mut() {
      keys.sort();
    }
    map
  }

  /// Every bound action by config name, each with its keys, for help output.
  pub fn listing(&self) -> Vec<(String, Vec<String>)> {
    let mut rows: Vec<(String, Vec<String>)> =
      self.reverse_lookup().into_iter().map(|(action, keys)| (action.name(), keys)).collect();
    rows.sort();
    rows
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::panel::SortColumn;

  #[test]
  fn test_parse_single_char() {
    let kb = parse_key_binding("a").unwrap();
    assert_eq!(kb, KeyBinding::plain(Key::Char('a')));
    assert_eq!(parse_key_binding("A").unwrap(), kb);
    assert_eq!(parse_key_binding("+").unwrap().key, Key::Char('+'));
  }

  #[test]
  fn test_parse_modifiers() {
    let kb = parse_key_binding("ctrl+a").unwrap();
    assert!(kb.ctrl && !kb.alt && !kb.shift);
    let kb = parse_key_binding("shift+up").unwrap();
    assert_eq!(kb.key, Key::Up);
    assert!(kb.shift);
    let kb = parse_key_binding("ctrl+shift+f5").unwrap();
    assert_eq!(kb.key, Key::F(5));
    assert!(kb.ctrl && kb.shift);
    assert!(!parse_key_binding("shift+a").unwrap().shift);
  }

  #[test]
  fn test_parse_named_keys() {
    assert_eq!(parse_key_binding("enter").unwrap().key, Key::Enter);
    assert_eq!(parse_key_binding("space").unwrap().key, Key::Char(' '));
    assert_eq!(parse_key_binding("backspace").unwrap().key, Key::Backspace);
    assert_eq!(parse_key_binding("f12").unwrap().key, Key::F(12));
    assert_eq!(parse_key_binding("ArrowDown").unwrap().key, Key::Down);
  }

  #[test]
  fn test_parse_invalid() {
    assert!(parse_key_binding("").is_none());
    assert!(parse_key_binding("foobar").is_none());
    assert!(parse_key_binding("hyper+a").is_none());
    assert!(parse_key_binding("f99").is_none());
  }

  #[test]
  fn test_key_input_from_browser_json() {
    let input: KeyInput =
      serde_json::from_str(r#"{"key":"ArrowUp","shiftKey":true,"ctrlKey":false}"#).unwrap();
    assert_eq!(input, KeyInput::new("ArrowUp").shift());
    let input: KeyInput = serde_json::from_str(r#"{"key":"a","ctrl":true}"#).unwrap();
    assert!(input.ctrl && !input.alt);
  }

  fn sample() -> Keymap {
    let mut keymap = Keymap::default();
    keymap.bind(KeyBinding::plain(Key::Down), Action::MoveDown);
    keymap.bind(parse_key_binding("shift+down").unwrap(), Action::ExtendDown);
    keymap.bind(parse_key_binding("ctrl+a").unwrap(), Action::SelectAll);
    keymap.bind(parse_key_binding("ctrl+f3").unwrap(), Action::SortBy(SortColumn::Name));
    keymap
  }

  #[test]
  fn test_translate_bound_keys() {
    let keymap = sample();
    assert_eq!(keymap.translate(&KeyInput::new("ArrowDown")), Some(Action::MoveDown));
    assert_eq!(keymap.translate(&KeyInput::new("ArrowDown").shift()), Some(Action::ExtendDown));
    assert_eq!(keymap.translate(&KeyInput::new("A").ctrl()), Some(Action::SelectAll));
    assert_eq!(
      keymap.translate(&KeyInput::new("F3").ctrl()),
      Some(Action::SortBy(SortColumn::Name))
    );
  }

  #[test]
  fn test_translate_unbound_chars_seek() {
    let keymap = sample();
    assert_eq!(keymap.translate(&KeyInput::new("b")), Some(Action::Seek('b')));
    assert_eq!(keymap.translate(&KeyInput::new("B").shift()), Some(Action::Seek('B')));
    assert_eq!(keymap.translate(&KeyInput::new("b").ctrl()), None);
    assert_eq!(keymap.translate(&KeyInput::new("b").alt()), None);
    assert_eq!(keymap.translate(&KeyInput::new("Escape")), None);
    assert_eq!(keymap.translate(&KeyInput::new("")), None);
  }

  #[test]
  fn test_apply_table_overrides_and_unbinds() {
    let mut keymap = sample();
    let table: HashMap<String, String> = [
      ("down", "move_up"),
      ("ctrl+a", "none"),
      ("bogus+key", "move_up"),
      ("f9", "explode"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let mut errors = Vec::new();
    keymap.apply_table(&table, &mut errors);
    assert_eq!(errors.len(), 2);
    assert_eq!(keymap.translate(&KeyInput::new("ArrowDown")), Some(Action::MoveUp));
    assert_eq!(keymap.translate(&KeyInput::new("a").ctrl()), None);
    assert_eq!(keymap.len(), 3);
  }

  #[test]
  fn test_reverse_lookup_display() {
    let keymap = sample();
    let map = keymap.reverse_lookup();
    assert_eq!(map[&Action::SelectAll], vec!["Ctrl+A".to_string()]);
    assert_eq!(map[&Action::ExtendDown], vec!["Shift+Down".to_string()]);
    assert_eq!(map[&Action::SortBy(SortColumn::Name)], vec!["Ctrl+F3".to_string()]);
  }

  #[test]
  fn test_listing_sorted_by_action_name() {
    let mut keymap = sample();
    keymap.bind(KeyBinding::plain(Key::F(2)), Action::MoveDown);
    let rows = keymap.listing();
    let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["extend_down", "move_down", "select_all", "sort_by_name"]);
    assert_eq!(rows[1].1, vec!["Down".to_string(), "F2".to_string()]);
  }
}
