//! Core rust implementation of lpkit, helpers for inspecting and editing linear programs
//! through the names of their variables and constraints.
//!
//! Variables named `set[i1,...,iN]` and constraints named `set(i1,...,iN)` are grouped
//! into sets, which can be listed, filtered by index value, edited in bulk, aggregated by
//! index and exported.

pub mod configuration;
pub mod inspect;
pub mod io;
pub mod model;
pub mod naming;
pub mod optimize;
pub mod sample;
