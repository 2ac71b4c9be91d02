//! Workspace root package.
//!
//! Hosts development tooling (pre-commit hooks) only; the crates live under
//! `crates/`.
