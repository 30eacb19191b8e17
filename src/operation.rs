use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::error::{FsError, FsResult};
use crate::fs::ops::{self, Progress};
use crate::fs::{CompressionLevel, FileSystemGateway};

/// A long-running mutation, built by the controller and executed on a worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
  Copy { sources: Vec<PathBuf>, dest_dir: PathBuf },
  Move { sources: Vec<PathBuf>, dest_dir: PathBuf },
  Delete { paths: Vec<PathBuf> },
  Zip { sources: Vec<PathBuf>, dest: PathBuf, level: CompressionLevel },
  Unzip { archive: PathBuf, dest_dir: PathBuf },
}

fn plural(count: usize) -> &'static str {
  if count == 1 { "item" } else { "items" }
}

fn target_in(dest_dir: &Path, source: &Path) -> FsResult<PathBuf> {
  let name = source
    .file_name()
    .ok_or_else(|| FsError::InvalidPath { path: source.to_path_buf() })?;
  Ok(dest_dir.join(name))
}

/// Runs `step` once per item, scaling each item's 0..=100 into its share of
/// the overall range. Every step must report its own 100.
fn run_each<F>(count: usize, progress: &mut Progress, mut step: F) -> FsResult<()>
where
  F: FnMut(usize, &mut dyn FnMut(f64)) -> FsResult<()>,
{
  for index in 0..count {
    let mut item = |percent: f64| {
      progress.report((index as f64 + percent / 100.0) / count as f64 * 100.0);
    };
    step(index, &mut item)?;
  }
  progress.finish();
  Ok(())
}

impl Operation {
  pub fn title(&self) -> String {
    match self {
      Operation::Copy { sources, .. } => format!("Copying {} {}", sources.len(), plural(sources.len())),
      Operation::Move { sources, .. } => format!("Moving {} {}", sources.len(), plural(sources.len())),
      Operation::Delete { paths } => format!("Deleting {} {}", paths.len(), plural(paths.len())),
      Operation::Zip { dest, .. } => format!("Compressing to {}", dest.display()),
      Operation::Unzip { archive, .. } => format!("Extracting {}", archive.display()),
    }
  }

  /// Executes on the calling thread. Stops at the first failing item.
  pub fn run(
    &self,
    gateway: &dyn FileSystemGateway,
    on_progress: Option<&mut dyn FnMut(f64)>,
  ) -> FsResult<()> {
    let mut progress = Progress::new(on_progress);
    match self {
      Operation::Copy { sources, dest_dir } => run_each(sources.len(), &mut progress, |i, sink| {
        let source = &sources[i];
        let mut dest = target_in(dest_dir, source)?;
        if dest == *source || ops::same_file(source, &dest) {
          dest = ops::unique_dest_path(&dest);
        }
        gateway.copy_entry(source, &dest, Some(sink))
      }),
      Operation::Move { sources, dest_dir } => run_each(sources.len(), &mut progress, |i, sink| {
        let source = &sources[i];
        let dest = target_in(dest_dir, source)?;
        if dest == *source || ops::same_file(source, &dest) {
          log::debug!("{} is already in {}", source.display(), dest_dir.display());
          sink(100.0);
          return Ok(());
        }
        gateway.move_entry(source, &dest, Some(sink))
      }),
      Operation::Delete { paths } => run_each(paths.len(), &mut progress, |i, sink| {
        gateway.delete_entry(&paths[i])?;
        sink(100.0);
        Ok(())
      }),
      Operation::Zip { sources, dest, level } => {
        gateway.zip_entries(sources, dest, *level)?;
        progress.finish();
        Ok(())
      }
      Operation::Unzip { archive, dest_dir } => {
        gateway.unzip_entry(archive, dest_dir)?;
        progress.finish();
        Ok(())
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationEvent {
  Progress(f64),
  Finished(Result<(), String>),
}

/// Receiving end of an operation running on a worker thread.
pub struct OperationHandle {
  receiver: Receiver<OperationEvent>,
  worker: Option<JoinHandle<()>>,
}

impl OperationHandle {
  pub fn next(&self) -> Option<OperationEvent> {
    self.receiver.recv().ok()
  }

  /// Blocks until the operation finishes, forwarding progress along the way.
  pub fn wait(mut self, mut on_progress: impl FnMut(f64)) -> Result<(), String> {
    let mut outcome = Err("operation worker exited without a result".to_string());
    while let Some(event) = self.next() {
      match event {
        OperationEvent::Progress(percent) => on_progress(percent),
        OperationEvent::Finished(result) => {
          outcome = result;
          break;
        }
      }
    }
    if let Some(worker) = self.worker.take()
      && worker.join().is_err()
    {
      return Err("operation worker panicked".to_string());
    }
    outcome
  }
}

/// Runs `operation` on a dedicated thread. Progress and the final result
/// arrive through the returned handle, so whoever owns UI state applies them.
pub fn spawn(gateway: Arc<dyn FileSystemGateway>, operation: Operation) -> OperationHandle {
  let (tx, rx) = mpsc::channel();
  let worker = thread::spawn(move || {
    log::info!("{}", operation.title());
    let mut send = |percent: f64| {
      let _ = tx.send(OperationEvent::Progress(percent));
    };
    let result = operation.run(gateway.as_ref(), Some(&mut send)).map_err(|e| e.to_string());
    if let Err(e) = &result {
      log::warn!("{} failed: {e}", operation.title());
    }
    let _ = tx.send(OperationEvent::Finished(result));
  });
  OperationHandle { receiver: rx, worker: Some(worker) }
}

/// What a progress indicator shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressTracker {
  pub visible: bool,
  pub title: String,
  pub percent: f64,
  pub message: Option<String>,
}

impl ProgressTracker {
  pub fn start(&mut self, title: impl Into<String>) {
    self.visible = true;
    self.title = title.into();
    self.percent = 0.0;
    self.message = None;
  }

  pub fn update(&mut self, percent: f64, message: Option<String>) {
    self.percent = percent.clamp(0.0, 100.0);
    if message.is_some() {
      self.message = message;
    }
  }

  pub fn stop(&mut self) {
    self.visible = false;
  }

  /// Returns false once the operation has finished. A failure is kept in
  /// `message`.
  pub fn apply(&mut self, event: OperationEvent) -> bool {
    match event {
      OperationEvent::Progress(percent) => {
        self.update(percent, None);
        true
      }
      OperationEvent::Finished(Ok(())) => {
        self.update(100.0, None);
        self.stop();
        false
      }
      OperationEvent::Finished(Err(e)) => {
        self.message = Some(e);
        self.stop();
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fs::LocalFileSystem;
  use std::fs;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn setup() -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("twinpane_operation_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("src").join("folder")).unwrap();
    fs::create_dir_all(dir.join("dst")).unwrap();
    fs::write(dir.join("src").join("a.txt"), "aaa").unwrap();
    fs::write(dir.join("src").join("b.txt"), "bb").unwrap();
    fs::write(dir.join("src").join("folder").join("c.txt"), "c").unwrap();
    dir
  }

  fn collect(op: &Operation) -> (FsResult<()>, Vec<f64>) {
    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    let result = op.run(&LocalFileSystem::new(), Some(&mut sink));
    (result, seen)
  }

  #[test]
  fn test_copy_aggregates_progress() {
    let dir = setup();
    let op = Operation::Copy {
      sources: vec![dir.join("src").join("a.txt"), dir.join("src").join("b.txt")],
      dest_dir: dir.join("dst"),
    };
    let (result, seen) = collect(&op);
    result.unwrap();
    assert_eq!(seen, vec![50.0, 100.0]);
    assert_eq!(fs::read_to_string(dir.join("dst").join("a.txt")).unwrap(), "aaa");
    assert!(dir.join("src").join("a.txt").exists());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_copy_into_same_directory_makes_copy() {
    let dir = setup();
    let op = Operation::Copy {
      sources: vec![dir.join("src").join("a.txt")],
      dest_dir: dir.join("src"),
    };
    let (result, _) = collect(&op);
    result.unwrap();
    assert_eq!(fs::read_to_string(dir.join("src").join("a_copy.txt")).unwrap(), "aaa");
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_move_directory_and_file() {
    let dir = setup();
    let op = Operation::Move {
      sources: vec![dir.join("src").join("folder"), dir.join("src").join("b.txt")],
      dest_dir: dir.join("dst"),
    };
    let (result, seen) = collect(&op);
    result.unwrap();
    assert_eq!(seen.last(), Some(&100.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(!dir.join("src").join("folder").exists());
    assert!(dir.join("dst").join("folder").join("c.txt").exists());
    assert!(dir.join("dst").join("b.txt").exists());
    let _ = fs::remove_dir_all(&dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_copy_between_symlinked_panes_makes_copy() {
    let dir = setup();
    std::os::unix::fs::symlink(dir.join("src"), dir.join("link")).unwrap();
    let op = Operation::Copy {
      sources: vec![dir.join("link").join("a.txt")],
      dest_dir: dir.join("src"),
    };
    let (result, _) = collect(&op);
    result.unwrap();
    assert_eq!(fs::read_to_string(dir.join("src").join("a.txt")).unwrap(), "aaa");
    assert_eq!(fs::read_to_string(dir.join("src").join("a_copy.txt")).unwrap(), "aaa");
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_move_onto_itself_is_noop() {
    let dir = setup();
    let op = Operation::Move {
      sources: vec![dir.join("src").join("a.txt")],
      dest_dir: dir.join("src"),
    };
    let (result, seen) = collect(&op);
    result.unwrap();
    assert_eq!(seen, vec![100.0]);
    assert!(dir.join("src").join("a.txt").exists());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_delete_and_rootless_source() {
    let dir = setup();
    let op = Operation::Delete {
      paths: vec![dir.join("src").join("a.txt"), dir.join("src").join("folder")],
    };
    let (result, seen) = collect(&op);
    result.unwrap();
    assert_eq!(seen, vec![50.0, 100.0]);
    assert!(!dir.join("src").join("folder").exists());

    let op = Operation::Copy { sources: vec![PathBuf::from("/")], dest_dir: dir.join("dst") };
    let (result, _) = collect(&op);
    assert!(matches!(result, Err(FsError::InvalidPath { .. })));
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_empty_operation_reports_done() {
    let (result, seen) = collect(&Operation::Delete { paths: Vec::new() });
    result.unwrap();
    assert_eq!(seen, vec![100.0]);
  }

  #[test]
  fn test_spawn_zip_and_unzip() {
    let dir = setup();
    let gateway: Arc<dyn FileSystemGateway> = Arc::new(LocalFileSystem::new());
    let archive = dir.join("dst").join("out.zip");

    let zip = Operation::Zip {
      sources: vec![dir.join("src").join("a.txt"), dir.join("src").join("folder")],
      dest: archive.clone(),
      level: CompressionLevel::Optimal,
    };
    let mut ticks = Vec::new();
    spawn(gateway.clone(), zip).wait(|p| ticks.push(p)).unwrap();
    assert_eq!(ticks, vec![100.0]);

    let unzip = Operation::Unzip { archive, dest_dir: dir.join("out") };
    spawn(gateway, unzip).wait(|_| {}).unwrap();
    assert_eq!(fs::read_to_string(dir.join("out").join("a.txt")).unwrap(), "aaa");
    assert_eq!(fs::read_to_string(dir.join("out").join("folder").join("c.txt")).unwrap(), "c");
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_spawn_reports_failure() {
    let dir = setup();
    let gateway: Arc<dyn FileSystemGateway> = Arc::new(LocalFileSystem::new());
    let op = Operation::Unzip {
      archive: dir.join("missing.zip"),
      dest_dir: dir.join("out"),
    };
    let handle = spawn(gateway, op);
    let mut tracker = ProgressTracker::default();
    tracker.start("Extracting");
    while let Some(event) = handle.next() {
      if !tracker.apply(event) {
        break;
      }
    }
    assert!(!tracker.visible);
    assert!(tracker.message.is_some());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_tracker_lifecycle() {
    let mut tracker = ProgressTracker::default();
    tracker.start("Copying 2 items");
    assert!(tracker.visible);
    assert!(tracker.apply(OperationEvent::Progress(40.0)));
    assert_eq!(tracker.percent, 40.0);
    tracker.update(150.0, Some("almost".into()));
    assert_eq!(tracker.percent, 100.0);
    assert_eq!(tracker.message.as_deref(), Some("almost"));
    assert!(!tracker.apply(OperationEvent::Finished(Ok(()))));
    assert!(!tracker.visible);
  }

  #[test]
  fn test_titles() {
    let op = Operation::Delete { paths: vec![PathBuf::from("/x")] };
    assert_eq!(op.title(), "Deleting 1 item");
    let op = Operation::Copy { sources: vec![PathBuf::new(), PathBuf::new()], dest_dir: PathBuf::new() };
    assert_eq!(op.title(), "Copying 2 items");
  }
}
