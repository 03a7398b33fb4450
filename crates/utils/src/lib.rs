//! Shared leaf utilities for the diff core: subprocess invocation,
//! repository-tree discovery, and unified-diff text rendering.

pub mod diff;
pub mod path;
pub mod process;
