//! Helpers shared by the crdform binaries: logging setup and build version.

pub mod logging;
pub mod version;
