//! Offset ("flexi") loan simulation.
//!
//! The simulator threads a [`state::FlexiState`] value through a pure
//! transition function, one due date at a time, and records what happened in
//! an append-only [`events::EventLog`].

pub mod events;
pub mod simulator;
pub mod state;
