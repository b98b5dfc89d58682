//! Skin Routine Engine - Ingredient conflict detection and routine scheduling
//!
//! Given skincare products (decomposed into ingredients) and a skin profile,
//! the engine detects ingredient conflicts and sensitivities, aggregates them
//! into an overall risk and lays the products out into morning and evening
//! routines with waits that respect the conflicts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
