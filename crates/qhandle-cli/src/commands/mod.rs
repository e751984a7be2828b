//! CLI command implementations.

pub mod common;
pub mod get;
pub mod platforms;
pub mod show;
pub mod submit;
pub mod version;
