//! End-to-end simulation runs through the full runtime wiring, on virtual
//! time with seeded randomness.

use kitchen_sim::config::OrdersConfig;
use kitchen_sim::model::{OrderSpec, Shelf, OVERFLOW_SHELF_TEMP};
use kitchen_sim::runtime::Simulation;

fn shelf(name: &str, temp: &str, capacity: usize, m: u32) -> Shelf {
    Shelf {
        name: name.to_string(),
        temp: temp.to_string(),
        capacity,
        decay_modifier: m,
    }
}

fn default_shelves() -> Vec<Shelf> {
    vec![
        shelf("Hot Shelf", "hot", 10, 1),
        shelf("Overflow Shelf", OVERFLOW_SHELF_TEMP, 10, 2),
    ]
}

fn spec(id: &str, shelf_life: u64, decay_rate: f64) -> OrderSpec {
    OrderSpec {
        id: id.to_string(),
        name: format!("order {id}"),
        temp: "hot".to_string(),
        shelf_life,
        decay_rate,
    }
}

fn orders_cfg(per_second: u32, min: f64, max: f64) -> OrdersConfig {
    OrdersConfig {
        orders_per_second: per_second,
        delivery_min_seconds: min,
        delivery_max_seconds: max,
    }
}

#[tokio::test(start_paused = true)]
async fn prompt_courier_delivers_at_nearly_full_value() {
    let sim = Simulation::start_seeded(
        default_shelves(),
        vec![spec("solo", 100, 0.01)],
        &orders_cfg(1, 0.0, 0.1),
        42,
    );
    let stats = sim.wait().await.expect("simulation should complete");
    assert_eq!(stats.delivered_count(), 1);
    assert_eq!(stats.spoiled_count(), 0);
    assert_eq!(stats.wasted_count(), 0);
    assert!(
        (stats.avg_delivered() - 1.0).abs() < 0.01,
        "value at pickup should be close to 1.0, got {}",
        stats.avg_delivered()
    );
}

#[tokio::test(start_paused = true)]
async fn slow_courier_loses_the_order_to_spoilage() {
    let sim = Simulation::start_seeded(
        default_shelves(),
        vec![spec("doomed", 1, 1.0)],
        &orders_cfg(1, 10.0, 11.0),
        42,
    );
    let stats = sim.wait().await.expect("simulation should complete");
    assert_eq!(stats.spoiled_count(), 1);
    assert_eq!(stats.delivered_count(), 0);
    assert_eq!(stats.wasted_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn overflow_pressure_wastes_but_conserves_every_order() {
    let shelves = vec![
        shelf("Hot Shelf", "hot", 1, 1),
        shelf("Overflow Shelf", OVERFLOW_SHELF_TEMP, 1, 2),
    ];
    let specs: Vec<OrderSpec> = (0..4).map(|i| spec(&format!("o{i}"), 1000, 0.0)).collect();
    // couriers arrive long after all four orders landed, so two evictions
    // are forced before any pickup
    let sim = Simulation::start_seeded(shelves, specs, &orders_cfg(4, 50.0, 60.0), 42);
    let stats = sim.wait().await.expect("simulation should complete");
    assert_eq!(stats.processed(), 4);
    assert_eq!(stats.wasted_count(), 2);
    assert_eq!(stats.delivered_count(), 2);
    assert_eq!(stats.spoiled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn mixed_run_accounts_for_every_order() {
    let shelves = vec![
        shelf("Hot Shelf", "hot", 2, 1),
        shelf("Cold Shelf", "cold", 2, 1),
        shelf("Overflow Shelf", OVERFLOW_SHELF_TEMP, 2, 2),
    ];
    let mut specs = Vec::new();
    for i in 0..4 {
        specs.push(spec(&format!("h{i}"), 40, 0.5));
    }
    for i in 0..4 {
        let mut s = spec(&format!("c{i}"), 3, 1.0);
        s.temp = "cold".to_string();
        specs.push(s);
    }
    let total = specs.len();
    let sim = Simulation::start_seeded(shelves, specs, &orders_cfg(3, 2.0, 8.0), 1234);
    let stats = sim.wait().await.expect("simulation should complete");
    assert_eq!(
        stats.delivered_count() + stats.wasted_count() + stats.spoiled_count(),
        total,
        "every order must reach exactly one terminal outcome"
    );
    assert_eq!(stats.expected(), total);
}
