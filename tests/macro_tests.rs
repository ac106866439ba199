use plain_config::{conf, conf_map, to_string, ConfMap, Value};

#[test]
fn test_conf_macro_none() {
    let value = conf!(None);
    assert_eq!(value, Value::None);
}

#[test]
fn test_conf_macro_booleans() {
    assert_eq!(conf!(true), Value::Bool(true));
    assert_eq!(conf!(false), Value::Bool(false));
}

#[test]
fn test_conf_macro_numbers() {
    assert_eq!(conf!(42), Value::Int(42));
    assert_eq!(conf!(3.5), Value::Float(3.5));
    assert_eq!(conf!(-123), Value::Int(-123));
    assert!(matches!(conf!(u64::MAX), Value::BigInt(_)));
}

#[test]
fn test_conf_macro_strings() {
    assert_eq!(conf!("hello world"), Value::Str("hello world".to_string()));
    assert_eq!(conf!(""), Value::Str(String::new()));
}

#[test]
fn test_conf_macro_lists() {
    assert_eq!(conf!([]), Value::List(vec![]));
    assert_eq!(
        conf!([1, 2, 3]),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(
        conf!([1, "two", true, None]),
        Value::List(vec![
            Value::Int(1),
            Value::from("two"),
            Value::Bool(true),
            Value::None,
        ])
    );
}

#[test]
fn test_conf_macro_dicts() {
    assert_eq!(conf!({}), Value::Dict(vec![]));

    let dict = conf!({"name": "Alice", "age": 30, "admin": false});
    assert_eq!(dict.get("name"), Some(&Value::from("Alice")));
    assert_eq!(dict.get("age"), Some(&Value::Int(30)));
    assert_eq!(dict.get("admin"), Some(&Value::Bool(false)));
    assert_eq!(dict.to_string(), "{'name': 'Alice', 'age': 30, 'admin': False}");
}

#[test]
fn test_conf_macro_nested() {
    let value = conf!({
        "service": {
            "hosts": ["a", "b"],
            "limits": {"cpu": 2, "memory": 512}
        },
        "replicas": [1, [2, 3]]
    });

    let service = value.get("service").unwrap();
    assert_eq!(service.get("hosts"), Some(&conf!(["a", "b"])));
    assert_eq!(
        service.get("limits").and_then(|l| l.get("memory")),
        Some(&Value::Int(512))
    );
    assert_eq!(
        value.get("replicas"),
        Some(&Value::List(vec![
            Value::Int(1),
            Value::List(vec![Value::Int(2), Value::Int(3)]),
        ]))
    );
}

#[test]
fn test_conf_macro_expressions() {
    let port = 8080;
    let hosts = vec!["a", "b"];
    assert_eq!(conf!(port), Value::Int(8080));
    assert_eq!(conf!(hosts), conf!(["a", "b"]));
    assert_eq!(
        conf!((1, "x")),
        Value::Tuple(vec![Value::Int(1), Value::from("x")])
    );
    assert_eq!(conf!((Some(2))), Value::Int(2));
}

#[test]
fn test_conf_map_macro() {
    assert_eq!(conf_map!({}), ConfMap::new());

    let map = conf_map!({
        "host": "example.com",
        "port": 8080,
        "peers": ["10.0.0.1", "10.0.0.2"],
        "debug": false,
    });
    assert_eq!(
        map.keys().map(String::as_str).collect::<Vec<_>>(),
        ["host", "port", "peers", "debug"]
    );
    assert_eq!(
        to_string(&map).unwrap(),
        "host=example.com\nport/i=8080\npeers/r=['10.0.0.1', '10.0.0.2']\ndebug/r=False\n"
    );
}
