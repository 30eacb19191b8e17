use crate::panel::SortColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  MoveUp,
  MoveDown,
  ExtendUp,
  ExtendDown,
  SwitchPane,
  Open,
  GoParent,
  SelectAll,
  Seek(char),
  Refresh,
  Rename,
  View,
  Edit,
  Copy,
  Move,
  MakeDir,
  Delete,
  Zip,
  Unzip,
  Reveal,
  SortBy(SortColumn),
}

impl Action {
  pub fn from_name(name: &str) -> Option<Action> {
    match name {
      "move_up" => Some(Action::MoveUp),
      "move_down" => Some(Action::MoveDown),
      "extend_up" => Some(Action::ExtendUp),
      "extend_down" => Some(Action::ExtendDown),
      "switch_pane" => Some(Action::SwitchPane),
      "open" => Some(Action::Open),
      "go_parent" => Some(Action::GoParent),
      "select_all" => Some(Action::SelectAll),
      "refresh" => Some(Action::Refresh),
      "rename" => Some(Action::Rename),
      "view" => Some(Action::View),
      "edit" => Some(Action::Edit),
      "copy" => Some(Action::Copy),
      "move" => Some(Action::Move),
      "make_dir" => Some(Action::MakeDir),
      "delete" => Some(Action::Delete),
      "zip" => Some(Action::Zip),
      "unzip" => Some(Action::Unzip),
      "reveal" => Some(Action::Reveal),
      _ => name
        .strip_prefix("sort_by_")
        .and_then(SortColumn::from_name)
        .map(Action::SortBy),
    }
  }

  /// Config name of the action, as accepted by `from_name`. Seeks have no
  /// config name and show the character instead.
  pub fn name(&self) -> String {
    let name = match self {
      Action::MoveUp => "move_up",
      Action::MoveDown => "move_down",
      Action::ExtendUp => "extend_up",
      Action::ExtendDown => "extend_down",
      Action::SwitchPane => "switch_pane",
      Action::Open => "open",
      Action::GoParent => "go_parent",
      Action::SelectAll => "select_all",
      Action::Refresh => "refresh",
      Action::Rename => "rename",
      Action::View => "view",
      Action::Edit => "edit",
      Action::Copy => "copy",
      Action::Move => "move",
      Action::MakeDir => "make_dir",
      Action::Delete => "delete",
      Action::Zip => "zip",
      Action::Unzip => "unzip",
      Action::Reveal => "reveal",
      Action::Seek(c) => return format!("seek '{c}'"),
      Action::SortBy(column) => return format!("sort_by_{}", column.as_str()),
    };
    name.to_string()
  }
}
