//! Writing and reading back a configuration file.
//!
//! Run with: cargo run --example simple

use plain_config::{from_str, to_string, ConfMap, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut map = ConfMap::new();
    map.insert("host".to_string(), Value::from("example.com"));
    map.insert("port".to_string(), Value::from(8080));
    map.insert("timeout".to_string(), Value::from(2.5));
    map.insert("debug".to_string(), Value::from(false));
    map.insert(
        "peers".to_string(),
        Value::List(vec![Value::from("10.0.0.1"), Value::from("10.0.0.2")]),
    );
    map.insert("secret".to_string(), Value::from(b"s3cr3t".as_slice()));
    map.insert("motd".to_string(), Value::from("Welcome!\nHave fun."));

    // Write the configuration
    let text = to_string(&map)?;
    println!("Configuration:\n{}", text);

    // Read it back
    let (map_back, _) = from_str(&text)?;
    assert_eq!(map, map_back);
    println!("✓ Round-trip successful");

    Ok(())
}
