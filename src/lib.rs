pub mod action;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fs;
pub mod keymap;
pub mod opener;
pub mod operation;
pub mod panel;

pub use error::{FsError, FsResult};
