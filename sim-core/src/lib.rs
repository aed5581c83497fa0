//! Core discrete-time ecological grid simulation library.
//!
//! Main components:
//! - [`grid`] — the authoritative 2-D cell matrix and spatial queries.
//! - [`energy`] — per-tick top-down light propagation.
//! - [`water`] — procedural river/lake generation and moisture flow.
//! - [`plant`] — the per-organism branching-growth automaton.
//! - [`manager`] — population scheduling, spawning, and germination.
//! - [`engine`] — the external control surface and tick driver.
//! - [`config`] — configuration and boundary validation.
//! - [`types`] — shared type aliases and IDs.

pub mod config;
pub mod energy;
pub mod engine;
pub mod grid;
pub mod manager;
pub mod plant;
pub mod types;
pub mod water;
