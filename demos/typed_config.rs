//! Loading a configuration file into a typed struct.
//!
//! Run with: cargo run --example typed_config

use plain_config::{from_map, from_str, to_map, to_string};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum Level {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Limits {
    cpu: u32,
    memory: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    name: String,
    port: u16,
    level: Level,
    limits: Limits,
    peers: Vec<String>,
    token: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        name: "worker".to_string(),
        port: 8080,
        level: Level::Info,
        limits: Limits {
            cpu: 2,
            memory: 512,
        },
        peers: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
        token: None,
    };

    let text = to_string(&to_map(&config)?)?;
    println!("Configuration:\n{}", text);

    let (map, _) = from_str(&text)?;
    let config_back: Config = from_map(map)?;
    assert_eq!(config, config_back);
    println!("✓ Round-trip successful");

    Ok(())
}
