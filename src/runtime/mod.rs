//! Simulation orchestration: wires the dispatcher and producer together and
//! waits for the run to finish.

pub mod tracing;

use crate::config::OrdersConfig;
use crate::model::{OrderSpec, Shelf};
use crate::producer::Producer;
use crate::rack::{CourierWindow, ShelfRack};
use crate::stats::Stats;
use thiserror::Error;
use tokio::task::JoinHandle;

/// A simulation task failed or panicked.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A running simulation.
///
/// [`Simulation::start`] spawns the rack dispatcher and the producer;
/// [`Simulation::wait`] joins both and yields the final statistics. The
/// dispatcher finishes on its own once every order reached a terminal
/// outcome, so there is no separate shutdown signal.
pub struct Simulation {
    rack: JoinHandle<Stats>,
    producer: JoinHandle<()>,
}

impl Simulation {
    pub fn start(shelves: Vec<Shelf>, specs: Vec<OrderSpec>, orders_cfg: &OrdersConfig) -> Self {
        let (rack, handle) = ShelfRack::new(shelves, courier_window(orders_cfg), specs.len());
        let producer = Producer::new(specs, orders_cfg.orders_per_second as usize, handle);
        Self {
            rack: tokio::spawn(rack.run()),
            producer: tokio::spawn(producer.run()),
        }
    }

    /// Seeded variant: courier delays, jitter and eviction draws reproduce
    /// exactly for a given seed.
    pub fn start_seeded(
        shelves: Vec<Shelf>,
        specs: Vec<OrderSpec>,
        orders_cfg: &OrdersConfig,
        seed: u64,
    ) -> Self {
        let (rack, handle) =
            ShelfRack::with_seed(shelves, courier_window(orders_cfg), specs.len(), seed);
        let producer =
            Producer::with_seed(specs, orders_cfg.orders_per_second as usize, handle, seed);
        Self {
            rack: tokio::spawn(rack.run()),
            producer: tokio::spawn(producer.run()),
        }
    }

    pub async fn wait(self) -> Result<Stats, RuntimeError> {
        self.producer.await?;
        Ok(self.rack.await?)
    }
}

fn courier_window(orders_cfg: &OrdersConfig) -> CourierWindow {
    CourierWindow {
        min_seconds: orders_cfg.delivery_min_seconds,
        max_seconds: orders_cfg.delivery_max_seconds,
    }
}
