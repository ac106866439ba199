/// Builds a [`Value`](crate::Value) from a literal-like syntax.
///
/// Lists use `[...]`, dicts use `{"key": value}`, and `None`, `true` and
/// `false` map to themselves. Any other expression is converted with
/// [`to_value`](crate::to_value), so Rust tuples become tuples and numbers
/// become `Int` or `Float`.
///
/// ```rust
/// use plain_config::{conf, Value};
///
/// let value = conf!({"hosts": ["a", "b"], "port": 8080, "tls": None});
/// assert_eq!(value.to_string(), "{'hosts': ['a', 'b'], 'port': 8080, 'tls': None}");
/// assert_eq!(conf!((1, "x")), Value::Tuple(vec![Value::Int(1), Value::from("x")]));
/// ```
#[macro_export]
macro_rules! conf {
    (None) => {
        $crate::Value::None
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::conf!($elem)),*])
    };

    ({}) => {
        $crate::Value::Dict(vec![])
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {
        $crate::Value::Dict(vec![
            $(($crate::Value::from($key), $crate::conf!($value))),*
        ])
    };

    ($s:expr) => {{
        $crate::to_value(&$s).unwrap_or_default()
    }};
}

/// Builds a [`ConfMap`](crate::ConfMap) ready for [`encode`](crate::encode).
///
/// ```rust
/// use plain_config::{conf_map, to_string};
///
/// let map = conf_map!({"port": 8080, "debug": true});
/// assert_eq!(to_string(&map).unwrap(), "port/i=8080\ndebug/r=True\n");
/// ```
#[macro_export]
macro_rules! conf_map {
    ({}) => {
        $crate::ConfMap::new()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ConfMap::new();
        $(
            map.insert($key.to_string(), $crate::conf!($value));
        )*
        map
    }};
}

#[cfg(test)]
mod tests {
    use crate::{ConfMap, Value};

    #[test]
    fn test_conf_macro_primitives() {
        assert_eq!(conf!(None), Value::None);
        assert_eq!(conf!(true), Value::Bool(true));
        assert_eq!(conf!(false), Value::Bool(false));
        assert_eq!(conf!(42), Value::Int(42));
        assert_eq!(conf!(3.5), Value::Float(3.5));
        assert_eq!(conf!("hello"), Value::from("hello"));
    }

    #[test]
    fn test_conf_macro_containers() {
        assert_eq!(conf!([]), Value::List(vec![]));
        assert_eq!(
            conf!([1, "two", [None]]),
            Value::List(vec![
                Value::Int(1),
                Value::from("two"),
                Value::List(vec![Value::None]),
            ])
        );
        assert_eq!(conf!({}), Value::Dict(vec![]));
        let dict = conf!({"name": "Alice", "age": 30});
        assert_eq!(dict.get("name"), Some(&Value::from("Alice")));
        assert_eq!(dict.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_conf_map_macro() {
        assert_eq!(conf_map!({}), ConfMap::new());
        let map = conf_map!({"b": 1, "a": [true]});
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(map.get("a"), Some(&Value::List(vec![Value::Bool(true)])));
    }
}
