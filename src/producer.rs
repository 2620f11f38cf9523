//! Paced ingress: turns the finite order list into `Created` events.
//!
//! One batch of `orders_per_second` specs is released per tick of a 1-second
//! clock, and each submission is offset by a sub-second jitter in its own
//! task. The producer never waits for acknowledgement beyond the channel
//! send itself.

use crate::model::OrderSpec;
use crate::rack::{OrderEvent, RackHandle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{self, interval};
use tracing::{debug, warn};

pub struct Producer {
    specs: Vec<OrderSpec>,
    orders_per_second: usize,
    rack: RackHandle,
    rng: StdRng,
}

impl Producer {
    pub fn new(specs: Vec<OrderSpec>, orders_per_second: usize, rack: RackHandle) -> Self {
        Self::with_rng(specs, orders_per_second, rack, StdRng::from_entropy())
    }

    /// Seeded variant for reproducible jitter in tests.
    pub fn with_seed(
        specs: Vec<OrderSpec>,
        orders_per_second: usize,
        rack: RackHandle,
        seed: u64,
    ) -> Self {
        Self::with_rng(specs, orders_per_second, rack, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        specs: Vec<OrderSpec>,
        orders_per_second: usize,
        rack: RackHandle,
        rng: StdRng,
    ) -> Self {
        Self {
            specs,
            orders_per_second,
            rack,
            rng,
        }
    }

    /// Emit every spec, then return. A closed rack ends the run early.
    pub async fn run(mut self) {
        debug!(
            orders = self.specs.len(),
            per_second = self.orders_per_second,
            "producer started"
        );
        let specs = std::mem::take(&mut self.specs);
        let mut ticker = interval(Duration::from_secs(1));
        // A tokio interval's first tick completes immediately; drain it so
        // the first batch waits out a full period like every other.
        ticker.tick().await;
        for batch in specs.chunks(self.orders_per_second.max(1)) {
            ticker.tick().await;
            for spec in batch {
                let jitter = Duration::from_secs_f64(self.rng.gen::<f64>());
                let rack = self.rack.clone();
                let spec = spec.clone();
                tokio::spawn(async move {
                    time::sleep(jitter).await;
                    let id = spec.id.clone();
                    if rack.submit(OrderEvent::Created { spec }).await.is_err() {
                        warn!(order_id = %id, "rack closed before order could be submitted");
                    }
                });
            }
        }
        debug!("producer finished");
    }
}
