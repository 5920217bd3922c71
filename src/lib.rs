//! roguelike-lineage - Layout engine for a roguelike lineage chart.
//!
//! This crate positions games on a force-directed graph from their relations
//! and maps release years to the shared x positions and hues used by the
//! timeline arc chart. Drawing is left to external renderers.

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod mapping;
pub mod scheduler;
pub mod session;
pub mod timeline;
