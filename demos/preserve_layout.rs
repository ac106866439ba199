//! Editing a hand-written file without losing its comments and order.
//!
//! Run with: cargo run --example preserve_layout

use plain_config::{from_str, to_string_with_options, ConfigOptions, Value};
use std::error::Error;

const HAND_WRITTEN: &str = "\
# Database connection
host=db.internal
port/i=5432

# Replicas, tried in order
replicas/r=['db1', 'db2']

# Left over from the old setup
legacy_pool/i=4
";

fn main() -> Result<(), Box<dyn Error>> {
    let (mut map, structure) = from_str(HAND_WRITTEN)?;
    println!("Loaded {} keys from {} lines\n", map.len(), structure.len());

    map.insert("port".to_string(), Value::from(6432));
    map.insert(
        "replicas".to_string(),
        Value::List(vec![Value::from("db1"), Value::from("db3")]),
    );
    map.remove("legacy_pool");
    map.insert("sslmode".to_string(), Value::from("require"));

    let updated = to_string_with_options(&map, &structure, &ConfigOptions::new())?;
    println!("Updated:\n{}", updated);

    // Keep entries that were removed from the map
    let options = ConfigOptions::new().with_rewrite_old(true);
    let kept = to_string_with_options(&map, &structure, &options)?;
    println!("With rewrite_old:\n{}", kept);

    Ok(())
}
