#[macro_export]
macro_rules! btoon {
    // Handle nil
    (nil) => {
        $crate::Value::Nil
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::btoon!($elem)),*])
    };

    // Handle empty map
    ({}) => {
        $crate::Value::Map($crate::BtoonMap::new())
    };

    // Handle non-empty map; keys land in sorted order regardless of the
    // order written here
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::BtoonMap::new();
        $(
            map.insert($key.to_string(), $crate::btoon!($value));
        )*
        $crate::Value::Map(map)
    }};

    // Fallback for any expression with a Value conversion
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
