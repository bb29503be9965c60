//! Command implementations for labext-cli

pub mod action;
pub mod build;
pub mod list;

pub use action::{run_action, run_install, run_update};
pub use build::run_build;
pub use list::{run_list, run_search};
