//! Platform definitions for the crawled device families.
//!
//! This module holds the per-family tables: type indicators, hostname
//! patterns and discovery command lists, plus the primer transcript
//! detection that picks a family for a new NE.

mod definition;
pub mod detect;
mod registry;
pub mod vendors;

pub use definition::{PlatformDefinition, TypeIndicator};
pub use detect::{UNDETERMINED, detect_hostname, detect_type};
pub use registry::PlatformRegistry;
