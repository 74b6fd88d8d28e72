//! Shared plumbing of the `buscar-cfr` and `rellenar-cfr` binaries.

pub mod commands;
pub mod context;
pub mod logging;
