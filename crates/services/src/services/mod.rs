pub mod compare;
pub mod host;
pub mod vcs_commands;
