//! CLI command implementations

pub mod catalog;
pub mod init;
pub mod level;
pub mod replay;
