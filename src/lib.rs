//! Workspace facade crate.
//!
//! Re-exports the crates a host needs to run a database update
//! (`core-update`, `core-library`, `core-runtime`) so it can depend on
//! `tunedb` alone. The `desktop-shims` feature (on by default) adds the
//! local-filesystem bridges from `bridge-desktop` and lets
//! `UpdateConfig::builder()` fall back to them.

pub use bridge_traits as bridge;
pub use core_library as library;
pub use core_runtime as runtime;
pub use core_update as update;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
