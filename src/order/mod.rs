//! The per-order lifecycle machine.
//!
//! An [`Order`] tracks its decaying value as a piecewise-linear function
//! across the shelves it visits and owns the two deadline waiters (spoil,
//! delivery) that drive its terminal outcome. The waiters never call back
//! into the order: on expiry they submit an id-carrying event to the rack
//! dispatcher's inbox and exit, so all mutation stays on the dispatcher task.
//!
//! Timekeeping is monotonic throughout ([`tokio::time::Instant`]); wall-clock
//! time never enters the value math.

use crate::model::{OrderSpec, Shelf};
use crate::rack::OrderEvent;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

/// A one-shot deadline waiter task.
///
/// Dropping the guard closes the cancellation channel, which is observed by
/// the parked task on its next poll. Cancellation therefore cannot be lost:
/// either the deadline branch already won (the event is in the inbox, where
/// the dispatcher filters it against the live table) or the waiter exits
/// without submitting anything.
struct DeadlineTimer {
    _cancel: oneshot::Sender<()>,
}

impl DeadlineTimer {
    fn spawn(deadline: Instant, events: mpsc::Sender<OrderEvent>, event: OrderEvent) -> Self {
        let (cancel, mut cancelled) = oneshot::channel::<()>();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline) => {
                    // Inbox closed means the dispatcher already finished.
                    let _ = events.send(event).await;
                }
                _ = &mut cancelled => {}
            }
        });
        Self { _cancel: cancel }
    }
}

/// State that exists only while the order sits on some shelf.
struct Placement {
    shelf: Shelf,
    start: Instant,
    shelf_switch: Instant,
    /// Baseline value accumulated up to the most recent shelf switch.
    value: f64,
    /// Bumped on every spoil reschedule; echoed in the spoil event so the
    /// dispatcher can discard a deadline that a migration superseded. A
    /// cancelled waiter whose deadline was already due may win the select
    /// race and submit anyway, so cancellation alone is not enough.
    generation: u64,
    spoil_timer: DeadlineTimer,
    delivery_timer: DeadlineTimer,
}

/// A live order on the rack.
///
/// Constructed unplaced, initialized exactly once by the dispatcher when a
/// shelf is chosen, optionally migrated any number of times, and torn down
/// exactly once via [`Order::done`]. The dispatcher is the single writer for
/// all of these transitions.
pub struct Order {
    spec: OrderSpec,
    events: mpsc::Sender<OrderEvent>,
    placement: Option<Placement>,
}

impl Order {
    pub fn new(spec: OrderSpec, events: mpsc::Sender<OrderEvent>) -> Self {
        Self {
            spec,
            events,
            placement: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn spec(&self) -> &OrderSpec {
        &self.spec
    }

    /// The shelf currently holding this order, if it has been placed.
    pub fn shelf(&self) -> Option<&Shelf> {
        self.placement.as_ref().map(|p| &p.shelf)
    }

    /// Generation of the currently scheduled spoil deadline, if placed.
    /// Spoil events carrying any other generation are stale.
    pub fn spoil_generation(&self) -> Option<u64> {
        self.placement.as_ref().map(|p| p.generation)
    }

    /// First placement. Starts the clock, schedules the spoil deadline for
    /// this shelf and the absolute delivery deadline. Must be called exactly
    /// once; the delivery deadline is never touched again.
    pub fn init(&mut self, shelf: &Shelf, delivery_delay: Duration) {
        debug_assert!(self.placement.is_none(), "order {} placed twice", self.spec.id);
        let now = Instant::now();
        let spoil_after = Duration::from_secs_f64(self.spec.max_order_age(shelf.decay_modifier));
        let spoil_timer = DeadlineTimer::spawn(
            now + spoil_after,
            self.events.clone(),
            OrderEvent::Spoiled {
                id: self.spec.id.clone(),
                generation: 0,
            },
        );
        let delivery_timer = DeadlineTimer::spawn(
            now + delivery_delay,
            self.events.clone(),
            OrderEvent::Delivered {
                id: self.spec.id.clone(),
            },
        );
        self.placement = Some(Placement {
            shelf: shelf.clone(),
            start: now,
            shelf_switch: now,
            value: 1.0,
            generation: 0,
            spoil_timer,
            delivery_timer,
        });
    }

    /// Migrate to another shelf.
    ///
    /// The value consumed on the outgoing shelf is folded into the baseline
    /// before the switch, which keeps [`Order::current_value`] continuous
    /// across the migration. The spoil deadline is re-derived for the new
    /// shelf; a non-positive remainder fires immediately. No-op on an order
    /// that was never placed or is already done.
    pub fn change_shelf(&mut self, shelf: &Shelf) {
        let now = Instant::now();
        let id = self.spec.id.clone();
        let events = self.events.clone();
        let Some(p) = self.placement.as_mut() else {
            return;
        };
        let elapsed_total = (now - p.start).as_secs_f64();
        let elapsed_prev = (p.shelf_switch - p.start).as_secs_f64();
        p.value += self.spec.shelf_value(elapsed_total, p.shelf.decay_modifier)
            - self.spec.shelf_value(elapsed_prev, p.shelf.decay_modifier);

        let time_to_spoil =
            (self.spec.max_order_age(shelf.decay_modifier) - elapsed_total).max(0.0);
        p.shelf = shelf.clone();
        p.shelf_switch = now;
        p.generation += 1;
        // Replacing the guard drops the previous waiter's cancel sender; the
        // new generation outdates anything the old waiter still submits.
        p.spoil_timer = DeadlineTimer::spawn(
            now + Duration::from_secs_f64(time_to_spoil),
            events,
            OrderEvent::Spoiled {
                id,
                generation: p.generation,
            },
        );
    }

    /// Instantaneous value at `now` given the shelf trajectory so far.
    ///
    /// Non-increasing within a shelf segment and continuous across switches.
    /// An order that has not been placed yet is at full value.
    pub fn current_value(&self, now: Instant) -> f64 {
        let Some(p) = self.placement.as_ref() else {
            return 1.0;
        };
        let elapsed_total = (now - p.start).as_secs_f64();
        let elapsed_prev = (p.shelf_switch - p.start).as_secs_f64();
        p.value + self.spec.shelf_value(elapsed_total, p.shelf.decay_modifier)
            - self.spec.shelf_value(elapsed_prev, p.shelf.decay_modifier)
    }

    /// Cancel both deadline waiters. Idempotent.
    ///
    /// Dropping the timer guards releases the waiter tasks within one poll.
    /// A deadline that already expired may have an event in flight; the
    /// dispatcher discards it because this order leaves the live table
    /// before `done` is called.
    pub fn done(&mut self) {
        self.placement.take();
    }
}
