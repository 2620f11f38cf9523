//! # kitchen-sim
//!
//! A ghost-kitchen dispatch simulation. Cooked orders stream in at a
//! configured pace, land on temperature-appropriate shelves, lose value in
//! real time, and leave the rack through one of three terminal outcomes:
//! picked up by a courier (`DELIVERED`), timed out on a shelf (`SPOILED`),
//! or evicted under overflow pressure (`WASTED`).
//!
//! ## Architecture
//!
//! The simulation is a small actor system:
//!
//! - [`rack::ShelfRack`] is the single-writer dispatcher. It owns every
//!   shelf and is the only task that mutates shelf contents, so capacity
//!   invariants hold without locks. Events reach it through a cloneable
//!   [`rack::RackHandle`] in strict FIFO order.
//! - [`order::Order`] is the per-order lifecycle machine: piecewise-linear
//!   value decay across shelf migrations, plus the spoil and delivery
//!   deadline waiters. Timers report back as id-carrying events, never as
//!   cross-task callbacks.
//! - [`producer::Producer`] paces `Created` events from the fixture list.
//! - [`stats::Stats`] accumulates terminal outcomes and renders the final
//!   report.
//! - [`runtime::Simulation`] wires everything and waits for completion;
//!   [`config`] loads and validates the YAML/JSON inputs it needs.

pub mod config;
pub mod model;
pub mod order;
pub mod producer;
pub mod rack;
pub mod runtime;
pub mod stats;
