//! Building values and maps with the conf! and conf_map! macros.
//!
//! Run with: cargo run --example macro

use plain_config::{conf, conf_map, to_string, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let limits = conf!({"cpu": 2, "memory": 512});
    println!("limits = {}", limits);
    assert_eq!(limits.get("cpu"), Some(&Value::Int(2)));

    let workers = 4;
    let map = conf_map!({
        "name": "worker",
        "workers": workers,
        "limits": limits,
        "queues": ["high", "default", ["low", None]],
        "enabled": true,
    });

    println!("\nConfiguration:\n{}", to_string(&map)?);

    Ok(())
}
