//! Test utilities: data factories and an AppState builder backed by the
//! in-memory stores.

mod app_state_builder;
mod factories;

pub use app_state_builder::*;
pub use factories::*;
