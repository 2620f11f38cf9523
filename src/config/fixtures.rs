//! Shelves and orders fixtures: JSON from a local file, or for orders also
//! from a plain HTTP GET, plus the load-time validation rules.

use super::ConfigError;
use crate::model::{OrderSpec, Shelf, OVERFLOW_SHELF_TEMP};
use std::collections::HashSet;

/// Read the shelves definition from a local JSON file.
pub fn fetch_shelves(path: &str) -> Result<Vec<Shelf>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        what: "shelves",
        source,
    })
}

/// Read the orders definition from a local file or a remote URL.
///
/// Paths containing `http` are fetched over the network with a plain GET;
/// anything else is treated as a local file. The body is JSON either way.
pub async fn fetch_orders(path: &str) -> Result<Vec<OrderSpec>, ConfigError> {
    let raw = if is_remote(path) {
        let response = reqwest::get(path).await.map_err(|source| ConfigError::Fetch {
            url: path.to_string(),
            source,
        })?;
        response.text().await.map_err(|source| ConfigError::Fetch {
            url: path.to_string(),
            source,
        })?
    } else {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?
    };
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        what: "orders",
        source,
    })
}

fn is_remote(path: &str) -> bool {
    path.contains("http")
}

/// Validate the shelf set: nonempty names, unique names and temps, and
/// exactly one overflow shelf.
pub fn validate_shelves(shelves: &[Shelf]) -> Result<(), ConfigError> {
    let mut temps = HashSet::new();
    let mut names = HashSet::new();
    let mut overflow_count = 0usize;

    for shelf in shelves {
        if shelf.name.is_empty() {
            return Err(ConfigError::InvalidShelf(
                "name of shelf can't be empty".to_string(),
            ));
        }
        if !temps.insert(shelf.temp.clone()) {
            return Err(ConfigError::InvalidShelf(format!(
                "shelf {}: shelf with temp {} was already defined",
                shelf.name, shelf.temp
            )));
        }
        if !names.insert(shelf.name.clone()) {
            return Err(ConfigError::InvalidShelf(format!(
                "shelf {}: shelf with this name was already defined",
                shelf.name
            )));
        }
        if shelf.is_overflow() {
            overflow_count += 1;
        }
    }

    if overflow_count != 1 {
        return Err(ConfigError::InvalidShelf(format!(
            "exactly one shelf with temp \"{OVERFLOW_SHELF_TEMP}\" is required, found {overflow_count}"
        )));
    }
    Ok(())
}

/// Validate the order list against the (already validated) shelf set:
/// nonempty ids and names, unique ids, positive shelf life, non-negative
/// decay rate, and a temp served by some non-overflow shelf.
pub fn validate_orders(specs: &[OrderSpec], shelves: &[Shelf]) -> Result<(), ConfigError> {
    let served_temps: HashSet<&str> = shelves
        .iter()
        .filter(|s| !s.is_overflow())
        .map(|s| s.temp.as_str())
        .collect();
    let mut ids = HashSet::new();

    for spec in specs {
        if spec.id.is_empty() {
            return Err(ConfigError::InvalidOrder(
                "id of order can't be empty".to_string(),
            ));
        }
        if spec.name.is_empty() {
            return Err(ConfigError::InvalidOrder(format!(
                "order {}: name can't be empty",
                spec.id
            )));
        }
        if spec.shelf_life == 0 {
            return Err(ConfigError::InvalidOrder(format!(
                "order {}: shelf life has to be > 0",
                spec.id
            )));
        }
        if spec.decay_rate < 0.0 {
            return Err(ConfigError::InvalidOrder(format!(
                "order {}: decay rate has to be >= 0",
                spec.id
            )));
        }
        if !served_temps.contains(spec.temp.as_str()) {
            return Err(ConfigError::InvalidOrder(format!(
                "order {}: no shelf serves temp {}",
                spec.id, spec.temp
            )));
        }
        if !ids.insert(spec.id.clone()) {
            return Err(ConfigError::InvalidOrder(format!(
                "order with id {} was previously defined",
                spec.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf(name: &str, temp: &str) -> Shelf {
        Shelf {
            name: name.to_string(),
            temp: temp.to_string(),
            capacity: 10,
            decay_modifier: 1,
        }
    }

    fn shelf_set() -> Vec<Shelf> {
        vec![shelf("hot shelf", "hot"), shelf("overflow", OVERFLOW_SHELF_TEMP)]
    }

    fn spec(id: &str) -> OrderSpec {
        OrderSpec {
            id: id.to_string(),
            name: format!("order {id}"),
            temp: "hot".to_string(),
            shelf_life: 200,
            decay_rate: 0.1,
        }
    }

    #[test]
    fn remote_detection_is_a_substring_check() {
        assert!(is_remote("https://example.com/orders.json"));
        assert!(is_remote("http://example.com/orders.json"));
        assert!(!is_remote("./fixtures/orders.json"));
    }

    #[test]
    fn accepts_a_valid_shelf_set() {
        assert!(validate_shelves(&shelf_set()).is_ok());
    }

    #[test]
    fn rejects_duplicate_shelf_temp() {
        let shelves = vec![
            shelf("hot shelf", "hot"),
            shelf("second hot", "hot"),
            shelf("overflow", OVERFLOW_SHELF_TEMP),
        ];
        let err = validate_shelves(&shelves).unwrap_err();
        assert!(err.to_string().contains("temp hot was already defined"));
    }

    #[test]
    fn rejects_duplicate_shelf_name() {
        let shelves = vec![
            shelf("shelf", "hot"),
            shelf("shelf", "cold"),
            shelf("overflow", OVERFLOW_SHELF_TEMP),
        ];
        assert!(validate_shelves(&shelves).is_err());
    }

    #[test]
    fn rejects_missing_overflow_shelf() {
        let err = validate_shelves(&[shelf("hot shelf", "hot")]).unwrap_err();
        assert!(err.to_string().contains("exactly one shelf"));
    }

    #[test]
    fn rejects_empty_shelf_name() {
        let shelves = vec![shelf("", "hot"), shelf("overflow", OVERFLOW_SHELF_TEMP)];
        assert!(validate_shelves(&shelves).is_err());
    }

    #[test]
    fn accepts_valid_orders() {
        assert!(validate_orders(&[spec("a"), spec("b")], &shelf_set()).is_ok());
    }

    #[test]
    fn rejects_duplicate_order_id() {
        let err = validate_orders(&[spec("a"), spec("a")], &shelf_set()).unwrap_err();
        assert!(err.to_string().contains("previously defined"));
    }

    #[test]
    fn rejects_zero_shelf_life() {
        let mut bad = spec("a");
        bad.shelf_life = 0;
        let err = validate_orders(&[bad], &shelf_set()).unwrap_err();
        assert!(err.to_string().contains("shelf life"));
    }

    #[test]
    fn rejects_negative_decay_rate() {
        let mut bad = spec("a");
        bad.decay_rate = -0.5;
        assert!(validate_orders(&[bad], &shelf_set()).is_err());
    }

    #[test]
    fn rejects_unserved_temperature() {
        let mut bad = spec("a");
        bad.temp = "frozen".to_string();
        let err = validate_orders(&[bad], &shelf_set()).unwrap_err();
        assert!(err.to_string().contains("no shelf serves temp frozen"));
    }

    #[test]
    fn overflow_does_not_count_as_a_served_temperature() {
        let mut bad = spec("a");
        bad.temp = OVERFLOW_SHELF_TEMP.to_string();
        assert!(validate_orders(&[bad], &shelf_set()).is_err());
    }

    #[test]
    fn rejects_empty_order_id_and_name() {
        let mut no_id = spec("a");
        no_id.id = String::new();
        assert!(validate_orders(&[no_id], &shelf_set()).is_err());

        let mut no_name = spec("a");
        no_name.name = String::new();
        assert!(validate_orders(&[no_name], &shelf_set()).is_err());
    }
}
