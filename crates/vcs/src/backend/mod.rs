//! Concrete backend clients, one per supported version-control tool.

pub mod git;
pub mod hg;
pub mod svn;
