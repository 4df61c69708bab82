//! CLI commands

pub mod compare;
pub mod list;
pub mod plan;
pub mod tree;
