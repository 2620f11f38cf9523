//! Pure domain descriptors: shelves and order parameters.
//!
//! Everything here is immutable after load time. The decay math lives next to
//! the parameters it is a function of, so both the order lifecycle and the
//! dispatcher compute values through one definition.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Temperature label of the single overflow shelf. An order whose native
/// shelf is full may be parked here regardless of its own temperature.
pub const OVERFLOW_SHELF_TEMP: &str = "any";

/// A fixed-capacity holder for orders at one temperature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub name: String,
    /// Acts as the shelf's key within the rack.
    pub temp: String,
    pub capacity: usize,
    /// Per-shelf deterioration multiplier applied to the order's decay rate.
    #[serde(rename = "shelfDecayModifier")]
    pub decay_modifier: u32,
}

impl Shelf {
    /// Whether this is the distinguished overflow shelf.
    pub fn is_overflow(&self) -> bool {
        self.temp == OVERFLOW_SHELF_TEMP
    }
}

impl Display for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.temp)
    }
}

/// Immutable per-order input, as delivered by the orders fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub id: String,
    pub name: String,
    /// Preferred storage temperature; must match a non-overflow shelf.
    pub temp: String,
    /// Nominal lifetime in seconds on a decay-neutral shelf.
    #[serde(rename = "shelfLife")]
    pub shelf_life: u64,
    /// Per-order deterioration multiplier.
    #[serde(rename = "decayRate")]
    pub decay_rate: f64,
}

impl OrderSpec {
    /// Instantaneous value after `elapsed` seconds on a shelf with decay
    /// modifier `m`, as a fraction of the initial value:
    /// `(L - e - d*e*m) / L`.
    pub fn shelf_value(&self, elapsed: f64, m: u32) -> f64 {
        let life = self.shelf_life as f64;
        (life - elapsed - self.decay_rate * elapsed * f64::from(m)) / life
    }

    /// Age in seconds at which the value reaches zero on a shelf with decay
    /// modifier `m`: `L / (1 + d*m)`.
    pub fn max_order_age(&self, m: u32) -> f64 {
        self.shelf_life as f64 / (1.0 + self.decay_rate * f64::from(m))
    }
}
