//! Domain model shared by the practice engine and the VCS facade.

pub mod practice;
pub mod project;
pub mod vcs;

pub use practice::*;
pub use project::*;
pub use vcs::*;
