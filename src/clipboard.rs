use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOp {
  Cut,
  Copy,
}

/// Paths waiting to be pasted into the other pane (or the same one).
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
  pub paths: Vec<PathBuf>,
  pub op: Option<ClipboardOp>,
}

impl Clipboard {
  pub fn copy(&mut self, paths: Vec<PathBuf>) {
    self.set(paths, ClipboardOp::Copy);
  }

  pub fn cut(&mut self, paths: Vec<PathBuf>) {
    self.set(paths, ClipboardOp::Cut);
  }

  fn set(&mut self, paths: Vec<PathBuf>, op: ClipboardOp) {
    if paths.is_empty() {
      self.clear();
      return;
    }
    self.paths = paths;
    self.op = Some(op);
  }

  pub fn clear(&mut self) {
    self.paths.clear();
    self.op = None;
  }

  pub fn is_cut(&self) -> bool {
    self.op == Some(ClipboardOp::Cut)
  }

  pub fn is_empty(&self) -> bool {
    self.op.is_none() || self.paths.is_empty()
  }

  /// Drops every path at or below `removed`.
  pub fn forget(&mut self, removed: &Path) {
    self.paths.retain(|p| !p.starts_with(removed));
    if self.paths.is_empty() {
      self.op = None;
    }
  }
}
