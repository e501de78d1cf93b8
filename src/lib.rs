//! Lumina
//!
//! Tracks an hourly power-outage schedule per group and tells how long the
//! current state will last.

pub mod bulletin;
pub mod config;
pub mod groups;
pub mod monitor;
pub mod schedule;
pub mod store;
pub mod view;
