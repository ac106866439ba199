//! Width, continuation glyphs, bytes encoding and trust.
//!
//! Run with: cargo run --example custom_options

use plain_config::{
    from_str_with_options, to_string, to_string_with_options, BytesEncoding, ConfMap,
    ConfigOptions, Structure, Value,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut map = ConfMap::new();
    map.insert(
        "banner".to_string(),
        Value::from("A long banner that does not fit on a narrow line and has to be wrapped."),
    );
    map.insert("key".to_string(), Value::from(b"plain text key".as_slice()));

    // Default options (72 characters, base32 bytes)
    println!("Default:");
    println!("{}", to_string(&map)?);

    // Narrow lines
    println!("Width 32:");
    let narrow = ConfigOptions::new().with_width(32);
    println!("{}", to_string_with_options(&map, &Structure::new(), &narrow)?);

    // Custom continuation glyphs
    println!("Glyphs ~^, width 32:");
    let glyphs = ConfigOptions::new().with_width(32).with_glyphs("~^");
    println!("{}", to_string_with_options(&map, &Structure::new(), &glyphs)?);

    // Shortest bytes encoding
    println!("Shortest bytes:");
    let shortest = ConfigOptions::new().with_bytes_encoding(BytesEncoding::Shortest);
    println!("{}", to_string_with_options(&map, &Structure::new(), &shortest)?);

    // Opaque objects need permissive trust
    let mut objects = ConfMap::new();
    objects.insert("session".to_string(), Value::object(&("user", 42, [1.5, 2.5]))?);
    println!("Restrictive: {}", to_string(&objects).unwrap_err());

    let permissive = ConfigOptions::permissive();
    let text = to_string_with_options(&objects, &Structure::new(), &permissive)?;
    println!("Permissive:\n{}", text);

    let (back, _) = from_str_with_options(&text, &permissive)?;
    let session: (String, u32, [f64; 2]) = back
        .get("session")
        .ok_or("session missing")?
        .to_object()?;
    println!("Restored: {:?}", session);

    Ok(())
}
