//! Orchestration layer between an editor host and the version-control
//! backends: command preparation and execution, diff presentation, external
//! tool launch, and the revert flow.

pub mod services;

pub use services::compare::{compare_sources, SourceText};
pub use services::host::EditorHost;
pub use services::vcs_commands::{DiffSettings, PrepareError, PreparedOperation, VcsAction, VcsCommands};
