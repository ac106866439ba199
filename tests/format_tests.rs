//! Format-level tests: tag table, tag choice, continuation lines and trivia,
//! checked through the text a caller actually reads and writes.

use plain_config::codec::{choose_chain, decode_value, encode_value, TagChain};
use plain_config::line::{classify, unwrap, wrap, Line, LineReader, LogicalKind};
use plain_config::{
    from_str, to_string, to_string_with_options, BytesEncoding, ConfMap, ConfigOptions, Error,
    Record, Structure, TrustMode, Value,
};

fn one(key: &str, value: Value) -> ConfMap {
    let mut map = ConfMap::new();
    map.insert(key.to_string(), value);
    map
}

fn read_one(line: &str) -> Option<Value> {
    let (map, _) = from_str(line).unwrap();
    map.get("k").cloned()
}

// Tags

#[test]
fn test_tag_table() {
    assert_eq!(read_one("k=plain text"), Some(Value::from("plain text")));
    assert_eq!(read_one("k/i=-42"), Some(Value::Int(-42)));
    assert_eq!(read_one("k/f=2.75"), Some(Value::Float(2.75)));
    assert_eq!(read_one("k/f=NaN").and_then(|v| v.as_f64()).map(f64::is_nan), Some(true));
    assert_eq!(read_one("k/r=['a', 1, None]"), Some(Value::List(vec![
        Value::from("a"),
        Value::Int(1),
        Value::None,
    ])));
    assert_eq!(read_one("k/b=text"), Some(Value::Bytes(b"text".to_vec())));
    assert_eq!(read_one("k/32=ORSXQ5A="), Some(Value::Bytes(b"text".to_vec())));
    assert_eq!(read_one("k/64=dGV4dA=="), Some(Value::Bytes(b"text".to_vec())));
    assert_eq!(read_one("k/64s=dGV4dA=="), Some(Value::from("text")));
}

#[test]
fn test_tags_apply_left_to_right() {
    // i then s: integer, then its decimal string
    assert_eq!(read_one("k/is=0042"), Some(Value::from("42")));
    // b then s: bytes of the payload, then back to text
    assert_eq!(read_one("k/bs=héllo"), Some(Value::from("héllo")));
    // s on a string and b on bytes leave the value alone
    assert_eq!(read_one("k/s=x"), Some(Value::from("x")));
    assert_eq!(read_one("k/64b=aGk="), Some(Value::Bytes(b"hi".to_vec())));
}

#[test]
fn test_tag_chain_parsing() {
    let chain: TagChain = "C|64s".parse().unwrap();
    assert_eq!(chain.continuation(), Some('|'));
    assert_eq!(chain.without_continuation().to_string(), "64s");
    assert_eq!(chain.to_string(), "C|64s");
    assert!("64p".parse::<TagChain>().unwrap().requires_trust());

    assert!("x".parse::<TagChain>().is_err());
    assert!("6".parse::<TagChain>().is_err());
    assert!("iC|".parse::<TagChain>().is_err());
    assert!("C".parse::<TagChain>().is_err());
}

#[test]
fn test_malformed_payloads_become_invalid_records() {
    for line in [
        "k/i=12a",
        "k/i=",
        "k/f=one",
        "k/r=[1, 2",
        "k/r=name",
        "k/32=not base32!",
        "k/64=@@@",
        "k/64s=/w==",
        "k/x=unknown",
    ] {
        let (map, structure) = from_str(line).unwrap();
        assert!(map.is_empty(), "{}", line);
        assert_eq!(structure.len(), 1);
        let record = &structure.records()[0];
        assert!(record.is_invalid(), "{}", line);
        assert_eq!(record.key(), Some("k"), "{}", line);
        assert_eq!(record.raw(), line);
    }
}

#[test]
fn test_lines_off_the_grammar() {
    for line in ["no equals", "=value", "/i=1", " k=1"] {
        let (map, structure) = from_str(line).unwrap();
        assert!(map.is_empty(), "{:?}", line);
        assert_eq!(structure.records()[0], Record::Invalid {
            key: None,
            raw: line.to_string(),
        });
    }
}

#[test]
fn test_payload_keeps_spaces_and_equals() {
    assert_eq!(read_one("k=  a = b  "), Some(Value::from("  a = b  ")));
    assert_eq!(read_one("k="), Some(Value::from("")));
    assert_eq!(read_one("k=#not a comment"), Some(Value::from("#not a comment")));
}

#[test]
fn test_trivia() {
    let text = "\n   \n# one\n\t# two\n#\n";
    let (map, structure) = from_str(text).unwrap();
    assert!(map.is_empty());
    assert_eq!(structure.len(), 5);
    assert!(structure.iter().all(Record::is_trivia));
    assert_eq!(
        to_string_with_options(&map, &structure, &ConfigOptions::new()).unwrap(),
        text
    );
}

// Tag choice

#[test]
fn test_choose_chain_rules() {
    let options = ConfigOptions::new();
    let chain = |v: Value| choose_chain("k", &v, &options).unwrap().to_string();

    assert_eq!(chain(Value::from("with spaces and = signs")), "");
    assert_eq!(chain(Value::from("tab\there")), "64s");
    assert_eq!(chain(Value::from(7)), "i");
    assert_eq!(chain(Value::from(f64::NAN)), "f");
    assert_eq!(chain(Value::None), "r");
    assert_eq!(chain(Value::from(false)), "r");
    assert_eq!(chain(Value::Tuple(vec![Value::from("a\nb")])), "r");
    assert_eq!(chain(Value::from(b"raw".as_slice())), "32");
}

#[test]
fn test_unhashable_keys_need_pickling() {
    let dict = Value::Dict(vec![(Value::List(vec![]), Value::None)]);
    let err = choose_chain("k", &dict, &ConfigOptions::new()).unwrap_err();
    assert!(matches!(err, Error::UnencodableValue { .. }));

    let chain = choose_chain("k", &dict, &ConfigOptions::permissive()).unwrap();
    assert_eq!(chain.to_string(), "64p");
}

#[test]
fn test_shortest_bytes_choice() {
    let options = ConfigOptions::new().with_bytes_encoding(BytesEncoding::Shortest);
    let chain = |b: &[u8]| {
        choose_chain("k", &Value::from(b), &options)
            .unwrap()
            .to_string()
    };
    assert_eq!(chain(b"readable"), "b");
    assert_eq!(chain(b"line\n"), "32");
    assert_eq!(chain(&[0xff; 12]), "64");
    assert_eq!(chain(b""), "b");
}

#[test]
fn test_encode_decode_value() {
    let options = ConfigOptions::new();
    for value in [
        Value::from("a\nb"),
        Value::from(-3),
        Value::from(0.1),
        Value::from(vec![0u8, 255]),
        Value::Set(vec![Value::from(1), Value::from(2)]),
    ] {
        let (chain, payload) = encode_value("k", &value, &options).unwrap();
        assert!(!payload.chars().any(char::is_control));
        let back = decode_value(&chain, &payload, TrustMode::Restrictive).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn test_pickle_decoding_is_gated() {
    let object = Value::object(&["a", "b"]).unwrap();
    let (chain, payload) = encode_value("k", &object, &ConfigOptions::permissive()).unwrap();
    assert_eq!(chain.to_string(), "64p");

    assert!(matches!(
        decode_value(&chain, &payload, TrustMode::Restrictive),
        Err(Error::UnsafeObject(_))
    ));
    assert_eq!(
        decode_value(&chain, &payload, TrustMode::Permissive).unwrap(),
        object
    );
}

// Continuation

#[test]
fn test_continuation_boundary() {
    let fits = "x".repeat(70);
    let text = to_string(&one("k", Value::from(fits.as_str()))).unwrap();
    assert_eq!(text, format!("k={}\n", fits));

    let over = "x".repeat(71);
    let text = to_string(&one("k", Value::from(over.as_str()))).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("k/C\\={}\\", "x".repeat(66)));
    assert_eq!(lines[1], "x".repeat(5));
    assert_eq!(lines[0].chars().count(), 72);

    let (map, _) = from_str(&text).unwrap();
    assert_eq!(map.get("k"), Some(&Value::from(over)));
}

#[test]
fn test_continuation_keeps_tags() {
    let motd = "Welcome to the staging cluster.\nMaintenance window: Sunday 02:00-04:00 UTC.\n";
    let text = to_string(&one("motd", Value::from(motd))).unwrap();
    assert_eq!(
        text,
        "motd/C\\64s=V2VsY29tZSB0byB0aGUgc3RhZ2luZyBjbHVzdGVyLgpNYWludGVuYW5jZSB3\\\n\
         aW5kb3c6IFN1bmRheSAwMjowMC0wNDowMCBVVEMuCg==\n"
    );
    let (map, _) = from_str(&text).unwrap();
    assert_eq!(map.get("motd"), Some(&Value::from(motd)));
}

#[test]
fn test_hand_wrapped_lines() {
    // Any glyph works on read, and a continuation may carry other tags.
    let text = "k/C@i=12@\n34@\n5\nnext=1\n";
    let (map, structure) = from_str(text).unwrap();
    assert_eq!(map.get("k"), Some(&Value::Int(12345)));
    assert_eq!(map.get("next"), Some(&Value::from("1")));
    assert_eq!(structure.len(), 2);
    assert_eq!(structure.records()[0].raw(), "k/C@i=12@\n34@\n5");

    // A continuation line is taken verbatim, even if it looks like an entry.
    let (map, _) = from_str("k/C\\=a=\\\n#b\n").unwrap();
    assert_eq!(map.get("k"), Some(&Value::from("a=#b")));
}

#[test]
fn test_unchanged_wrapped_entry_is_rewritten_identically() {
    let text = "k/C@i=12@\n34@\n5\n";
    let (map, structure) = from_str(text).unwrap();
    assert_eq!(
        to_string_with_options(&map, &structure, &ConfigOptions::new()).unwrap(),
        "k/i=12345\n"
    );
}

#[test]
fn test_wrap_and_unwrap_functions() {
    let chain: TagChain = "64s".parse().unwrap();
    let payload = "QUJD".repeat(30);
    let lines = wrap("k", &chain, &payload, 40, &['\\', '|']).unwrap();
    assert!(lines.len() > 1);
    assert!(lines[0].starts_with("k/C\\64s="));
    assert!(lines.iter().all(|l| l.chars().count() <= 40));

    let joined = lines.join("\n");
    let mut reader = LineReader::new(joined.as_bytes());
    let logical = unwrap(&mut reader).unwrap().unwrap();
    assert_eq!(logical.line, 1);
    match logical.kind {
        LogicalKind::Entry {
            key,
            chain,
            payload: back,
        } => {
            assert_eq!(key, "k");
            assert_eq!(chain.to_string(), "64s");
            assert_eq!(back, payload);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(unwrap(&mut reader).unwrap().is_none());
}

#[test]
fn test_classify() {
    assert_eq!(classify("   "), Line::Trivia);
    assert!(matches!(
        classify("k/C|r=[1,|"),
        Line::Entry { key: "k", payload: "[1,|", .. }
    ));
    assert!(matches!(classify("k/ii=1"), Line::Entry { .. }));
    assert!(matches!(classify("k/q=1"), Line::Invalid { key: Some("k"), .. }));
}

#[test]
fn test_custom_width_and_glyphs() {
    let map = one("k", Value::from("a|b|c|d|e|f|g|h|i|j|k|l|m|n"));
    let options = ConfigOptions::new().with_width(12).with_glyphs("|~");
    let text = to_string_with_options(&map, &Structure::new(), &options).unwrap();
    assert!(text.starts_with("k/C~="));
    assert!(text.lines().all(|l| l.chars().count() <= 12));
    let (back, _) = from_str(&text).unwrap();
    assert_eq!(back, map);
}
