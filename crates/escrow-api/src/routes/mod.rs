//! # Route Modules
//!
//! Each module exposes a `router()` returning `Router<AppState>`.

pub mod accounts;
pub mod escrows;
