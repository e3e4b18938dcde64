//! Tenancy assignment and occupancy consistency engine for property
//! management: atomic tenant/property state transitions, drift repair,
//! and advisory qualification checks, behind a small HTTP surface.

pub mod config;
pub mod error;
pub mod occupancy;
pub mod telemetry;
