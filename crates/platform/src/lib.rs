//! Platform detection for libsmith
//!
//! This crate provides the small cross-platform surface the build pipelines
//! need: operating system and CPU architecture detection, bundled into a
//! `Platform` value that is threaded explicitly through the rest of the tool
//! (so path planning and flag assembly stay testable for every platform on
//! any host).

mod error;
mod platform;

pub use error::PlatformError;
pub use platform::{Arch, Os, Platform};
