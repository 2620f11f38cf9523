//! The rack dispatcher: single-writer authority over all shelves.
//!
//! [`ShelfRack`] is the server half of the actor pair — it owns every shelf
//! set and the inbox receiver, and processes events strictly in FIFO order.
//! All placement decisions, migrations, evictions and terminal bookkeeping
//! happen inside [`ShelfRack::run`], so capacity checks always observe a
//! consistent snapshot and no two placements can race. [`RackHandle`] is the
//! client half, shared by the producer and every order's timers.

mod event;

pub use event::{OrderEvent, RackClosed, RackHandle};

use crate::model::{Shelf, OVERFLOW_SHELF_TEMP};
use crate::order::Order;
use crate::stats::Stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 64;

/// Courier readiness bounds in seconds; the delivery delay for each order is
/// drawn uniformly from this window at first placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourierWindow {
    pub min_seconds: f64,
    pub max_seconds: f64,
}

/// A shelf descriptor together with the orders currently sitting on it.
struct ShelfSet {
    shelf: Shelf,
    orders: HashMap<String, Order>,
}

impl ShelfSet {
    fn has_room(&self) -> bool {
        self.orders.len() < self.shelf.capacity
    }

    /// Deterministic snapshot of resident ids, for relief scans, eviction
    /// draws and rendering.
    fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.orders.keys().cloned().collect();
        ids.sort();
        ids
    }
}

enum Terminal {
    Delivered,
    Spoiled,
}

/// The dispatcher actor. Create with [`ShelfRack::new`], then `tokio::spawn`
/// its [`run`](ShelfRack::run) loop and submit events through the returned
/// [`RackHandle`].
pub struct ShelfRack {
    inbox: mpsc::Receiver<OrderEvent>,
    /// Cloned into every order so its timer tasks can reach the inbox.
    events: mpsc::Sender<OrderEvent>,
    rack: HashMap<String, ShelfSet>,
    /// Shelf temps in load order, for stable rendering and lookups.
    shelf_order: Vec<String>,
    stats: Stats,
    remaining: usize,
    courier: CourierWindow,
    rng: StdRng,
}

impl ShelfRack {
    /// Build a dispatcher over the given shelves, expecting
    /// `expected_to_process` terminal outcomes before completion.
    ///
    /// # Panics
    ///
    /// Panics if the shelf set does not include the overflow shelf; fixture
    /// validation guarantees it for any loaded configuration.
    pub fn new(
        shelves: Vec<Shelf>,
        courier: CourierWindow,
        expected_to_process: usize,
    ) -> (Self, RackHandle) {
        Self::build(shelves, courier, expected_to_process, StdRng::from_entropy())
    }

    /// Like [`ShelfRack::new`] with a fixed RNG seed, so the courier delays
    /// and eviction draws of a run reproduce exactly.
    pub fn with_seed(
        shelves: Vec<Shelf>,
        courier: CourierWindow,
        expected_to_process: usize,
        seed: u64,
    ) -> (Self, RackHandle) {
        Self::build(
            shelves,
            courier,
            expected_to_process,
            StdRng::seed_from_u64(seed),
        )
    }

    fn build(
        shelves: Vec<Shelf>,
        courier: CourierWindow,
        expected_to_process: usize,
        rng: StdRng,
    ) -> (Self, RackHandle) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let mut rack = HashMap::new();
        let mut shelf_order = Vec::new();
        for shelf in shelves {
            shelf_order.push(shelf.temp.clone());
            rack.insert(
                shelf.temp.clone(),
                ShelfSet {
                    shelf,
                    orders: HashMap::new(),
                },
            );
        }
        assert!(
            rack.contains_key(OVERFLOW_SHELF_TEMP),
            "shelf set must include the overflow shelf"
        );
        let dispatcher = Self {
            inbox: rx,
            events: tx.clone(),
            rack,
            shelf_order,
            stats: Stats::new(expected_to_process),
            remaining: expected_to_process,
            courier,
            rng,
        };
        (dispatcher, RackHandle::new(tx))
    }

    /// The event loop. Runs until every expected order reached a terminal
    /// outcome, then renders the final report once and returns the stats.
    pub async fn run(mut self) -> Stats {
        info!(
            shelves = self.shelf_order.len(),
            expected = self.remaining,
            "rack dispatcher started"
        );
        while self.remaining > 0 {
            let Some(event) = self.inbox.recv().await else {
                warn!(outstanding = self.remaining, "event channel closed early");
                break;
            };
            self.handle_event(event);
        }
        info!("{}", self.stats);
        self.stats
    }

    fn handle_event(&mut self, event: OrderEvent) {
        match event {
            OrderEvent::Created { spec } => self.place_new(Order::new(spec, self.events.clone())),
            OrderEvent::Delivered { id } => self.finish(&id, Terminal::Delivered),
            OrderEvent::Spoiled { id, generation } => self.finish_spoiled(&id, generation),
        }
    }

    /// Spoil events are honored only when their generation matches the
    /// order's current placement. A migration that raced its old deadline may
    /// leave a superseded waiter's event in the inbox; matching generations
    /// keeps such an event from spoiling an order whose fresh deadline has
    /// not expired.
    fn finish_spoiled(&mut self, id: &str, generation: u64) {
        if self.find_order(id).and_then(Order::spoil_generation) != Some(generation) {
            debug!(order_id = %id, generation, "stale spoil event, dropped");
            return;
        }
        self.finish(id, Terminal::Spoiled);
    }

    /// Placement for a newly created order: native fit, overflow fit, relief
    /// migration, then random eviction.
    fn place_new(&mut self, order: Order) {
        let delivery_delay = self.draw_delivery_delay();
        let native_temp = order.spec().temp.clone();

        if self.shelf_has_room(&native_temp) {
            self.place(order, &native_temp, delivery_delay);
            return;
        }
        if self.shelf_has_room(OVERFLOW_SHELF_TEMP) {
            self.place(order, OVERFLOW_SHELF_TEMP, delivery_delay);
            return;
        }
        if self.relieve_overflow() || self.evict_random() {
            self.place(order, OVERFLOW_SHELF_TEMP, delivery_delay);
            return;
        }

        // Overflow shelf with zero capacity: nothing to evict and nowhere to
        // park the new order. Count it as wasted so the run still completes.
        let id = order.id().to_string();
        let value = order.current_value(Instant::now());
        warn!(order_id = %id, "no shelf can hold the order");
        self.stats.wasted(value);
        self.remaining -= 1;
        self.log_state(&id, "WASTED", value);
    }

    /// Initialize `order` on the shelf keyed by `temp` and record it there.
    ///
    /// Capacity was established by the caller; a full shelf here is a
    /// placement-algorithm bug and aborts the simulation.
    fn place(&mut self, mut order: Order, temp: &str, delivery_delay: Duration) {
        let Some(set) = self.rack.get_mut(temp) else {
            unreachable!("placement targets unknown shelf {temp}");
        };
        assert!(
            set.has_room(),
            "capacity invariant violated on shelf {temp}"
        );
        order.init(&set.shelf, delivery_delay);
        let id = order.id().to_string();
        let value = order.current_value(Instant::now());
        set.orders.insert(id.clone(), order);
        self.log_state(&id, "CREATED", value);
    }

    /// Scan overflow residents (sorted snapshot) and move the first one whose
    /// native shelf has spare capacity back home, freeing one overflow slot.
    fn relieve_overflow(&mut self) -> bool {
        for id in self.overflow().sorted_ids() {
            let Some(native_temp) = self
                .overflow()
                .orders
                .get(&id)
                .map(|o| o.spec().temp.clone())
            else {
                continue;
            };
            if !self.shelf_has_room(&native_temp) {
                continue;
            }
            let Some(mut moved) = self.overflow_mut().orders.remove(&id) else {
                continue;
            };
            let Some(native) = self.rack.get_mut(&native_temp) else {
                unreachable!("native shelf {native_temp} vanished mid-migration");
            };
            moved.change_shelf(&native.shelf);
            let value = moved.current_value(Instant::now());
            native.orders.insert(id.clone(), moved);
            self.log_state(&id, "SHELF_CHANGE", value);
            return true;
        }
        false
    }

    /// Evict one uniformly drawn overflow resident, recording it as wasted.
    /// Returns false when the overflow shelf holds nothing to evict.
    fn evict_random(&mut self) -> bool {
        let ids = self.overflow().sorted_ids();
        if ids.is_empty() {
            return false;
        }
        let victim_id = ids[self.rng.gen_range(0..ids.len())].clone();
        let Some(mut victim) = self.overflow_mut().orders.remove(&victim_id) else {
            return false;
        };
        let value = victim.current_value(Instant::now());
        victim.done();
        self.stats.wasted(value);
        self.remaining -= 1;
        self.log_state(&victim_id, "WASTED", value);
        true
    }

    /// Terminal handling for timer-driven outcomes. The value is snapshotted
    /// before `done()` so the recorded number reflects the instant of the
    /// event, and events for ids no longer on any shelf are dropped.
    fn finish(&mut self, id: &str, terminal: Terminal) {
        let Some(mut order) = self.take_order(id) else {
            debug!(order_id = %id, "event for order no longer on the rack, dropped");
            return;
        };
        let value = order.current_value(Instant::now());
        order.done();
        let state = match terminal {
            Terminal::Delivered => {
                self.stats.delivered(value);
                "DELIVERED"
            }
            Terminal::Spoiled => {
                self.stats.spoiled();
                "SPOILED"
            }
        };
        self.remaining -= 1;
        self.log_state(id, state, value);
    }

    fn find_order(&self, id: &str) -> Option<&Order> {
        self.shelf_order
            .iter()
            .find_map(|temp| self.rack.get(temp).and_then(|set| set.orders.get(id)))
    }

    /// Remove the order from whichever shelf holds it. An order can sit on
    /// its native shelf or on overflow; scanning the rack covers both without
    /// trusting the event to know where it last was.
    fn take_order(&mut self, id: &str) -> Option<Order> {
        for temp in &self.shelf_order {
            if let Some(set) = self.rack.get_mut(temp) {
                if let Some(order) = set.orders.remove(id) {
                    return Some(order);
                }
            }
        }
        None
    }

    fn shelf_has_room(&self, temp: &str) -> bool {
        self.rack.get(temp).is_some_and(ShelfSet::has_room)
    }

    fn overflow(&self) -> &ShelfSet {
        self.rack
            .get(OVERFLOW_SHELF_TEMP)
            .expect("rack built without an overflow shelf")
    }

    fn overflow_mut(&mut self) -> &mut ShelfSet {
        self.rack
            .get_mut(OVERFLOW_SHELF_TEMP)
            .expect("rack built without an overflow shelf")
    }

    fn draw_delivery_delay(&mut self) -> Duration {
        let CourierWindow {
            min_seconds,
            max_seconds,
        } = self.courier;
        Duration::from_secs_f64(min_seconds + self.rng.gen::<f64>() * (max_seconds - min_seconds))
    }

    fn log_state(&self, id: &str, state: &str, value: f64) {
        info!(order_id = %id, state, value, "order state");
        debug!("{}", self.render_contents());
    }

    fn render_contents(&self) -> String {
        let mut out = String::from("rack state:");
        for temp in &self.shelf_order {
            let Some(set) = self.rack.get(temp) else {
                continue;
            };
            let _ = write!(
                out,
                "\n  shelf {} {}/{}",
                temp,
                set.orders.len(),
                set.shelf.capacity
            );
            for id in set.sorted_ids() {
                let _ = write!(out, "\n    {id}");
            }
        }
        out
    }
}
