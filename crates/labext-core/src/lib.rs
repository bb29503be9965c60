//! Extension manager model.
//!
//! This crate keeps the installed-extension and registry-search views of an
//! extension manager consistent while install, uninstall, enable, disable and
//! build actions run against a local extension server. All I/O goes through
//! the collaborator traits in [`backend`].

pub mod backend;
pub mod companion;
pub mod entry;
pub mod error;
pub mod listing;
pub mod merge;
pub mod model;
pub mod observer;
pub mod pending;
pub mod schema;
pub mod version;

pub use backend::{
    BuildService, CompanionPrompt, ErrorReporter, ExtensionServer, KernelSpecSource, NoBuild,
    RegistrySearch, Services, TracingReporter,
};
pub use companion::{CompanionRequest, KernelCompanion};
pub use entry::{Entry, EntryMap, EntryStatus, PackageType, entry_has_update};
pub use error::{Error, Result};
pub use listing::{ListMode, ListingEntry, Listings};
pub use model::{ListModel, ModelOptions};
pub use observer::{Listener, ModelEvent, SubscriptionId};
pub use schema::{Action, ActionOutcome, ActionStatus, BuildState, BuildStatus, KernelSpec};
