//! Loading and validating the simulation config and its fixtures from disk.

use kitchen_sim::config::{self, SimulationConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture file should be writable");
    path
}

fn config_yaml(shelves: &str, orders: &str) -> String {
    format!(
        "shelves-path: {shelves}\n\
         orders-path: {orders}\n\
         orders-config:\n\
         \x20 orders-per-second: 2\n\
         \x20 delivery-min-seconds: 2\n\
         \x20 delivery-max-seconds: 6\n"
    )
}

const SHELVES_JSON: &str = r#"[
  {"name": "Hot Shelf", "temp": "hot", "capacity": 10, "shelfDecayModifier": 1},
  {"name": "Overflow Shelf", "temp": "any", "capacity": 15, "shelfDecayModifier": 2}
]"#;

const ORDERS_JSON: &str = r#"[
  {"id": "o-1", "name": "Beef Stew", "temp": "hot", "shelfLife": 206, "decayRate": 0.69},
  {"id": "o-2", "name": "Kebab", "temp": "hot", "shelfLife": 325, "decayRate": 0.36}
]"#;

#[test]
fn loads_a_complete_config() {
    let dir = TempDir::new().expect("tempdir");
    let shelves_path = write(&dir, "shelves.json", SHELVES_JSON);
    let orders_path = write(&dir, "orders.json", ORDERS_JSON);
    let config_path = write(
        &dir,
        "kitchen.yaml",
        &config_yaml(
            &shelves_path.display().to_string(),
            &orders_path.display().to_string(),
        ),
    );

    let cfg = SimulationConfig::load(&config_path).expect("config should load");
    assert_eq!(cfg.orders.orders_per_second, 2);

    let shelves = config::fetch_shelves(&cfg.shelves_path).expect("shelves should load");
    config::validate_shelves(&shelves).expect("shelves should validate");
    assert_eq!(shelves.len(), 2);
    assert_eq!(shelves[1].decay_modifier, 2);
}

#[tokio::test]
async fn loads_and_validates_local_orders() {
    let dir = TempDir::new().expect("tempdir");
    let orders_path = write(&dir, "orders.json", ORDERS_JSON);
    let shelves: Vec<_> = serde_json::from_str(SHELVES_JSON).expect("shelves json");

    let specs = config::fetch_orders(&orders_path.display().to_string())
        .await
        .expect("orders should load");
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].name, "Beef Stew");
    config::validate_orders(&specs, &shelves).expect("orders should validate");
}

#[test]
fn missing_config_file_is_an_error() {
    let err = SimulationConfig::load(&PathBuf::from("/nonexistent/kitchen.yaml")).unwrap_err();
    assert!(err.to_string().contains("unable to read"));
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "kitchen.yaml", "shelves-path: [unterminated");
    assert!(SimulationConfig::load(&path).is_err());
}

#[test]
fn invalid_delivery_window_is_rejected_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "kitchen.yaml",
        "shelves-path: ./shelves.json\n\
         orders-path: ./orders.json\n\
         orders-config:\n\
         \x20 orders-per-second: 2\n\
         \x20 delivery-min-seconds: 6\n\
         \x20 delivery-max-seconds: 2\n",
    );
    let err = SimulationConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("delivery-max-seconds"));
}

#[test]
fn negative_shelf_capacity_fails_to_parse() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "shelves.json",
        r#"[{"name": "Hot Shelf", "temp": "hot", "capacity": -1, "shelfDecayModifier": 1}]"#,
    );
    let err = config::fetch_shelves(&path.display().to_string()).unwrap_err();
    assert!(err.to_string().contains("shelves json"));
}

#[tokio::test]
async fn malformed_orders_json_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "orders.json", "{not json");
    let err = config::fetch_orders(&path.display().to_string())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("orders json"));
}
