//! Pokecatalog - paginated Pokemon catalog with stat comparison
//!
//! The binary wires these modules into a tui-dispatch runtime; the library
//! exposes them for tests.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod reducer;
pub mod state;
pub mod stats;
