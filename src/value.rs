//! Defines the [`Value`] enum, a quick way to build template data without
//! deriving [`serde::Serialize`].

use std::mem;

pub use std::collections::BTreeMap as Map;
pub use std::vec::Vec as List;

/// Data to be rendered represented as a recursive enum.
///
/// Maps become Lua tables with string keys, lists become sequences starting at
/// index one and [`Value::None`] becomes `nil`.
///
/// ```
/// use fmpl::Value;
///
/// let data = Value::from([
///     ("name", Value::from("World")),
///     ("items", Value::from([1, 2, 3])),
/// ]);
///
/// let result = fmpl::render("Hello {{ name }} {{ #items }}", data)?;
/// assert_eq!(result, "Hello World 3");
/// # Ok::<(), fmpl::Error>(())
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Map(Map::new())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(string) => serializer.serialize_str(string),
            Value::List(list) => serializer.collect_seq(list),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident($conv:expr)),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant($conv(v))
                }
            }
        )+
    };
}

impl_from_scalar! {
    bool => Bool(bool::from),
    u8 => Integer(i64::from),
    u32 => Integer(i64::from),
    i32 => Integer(i64::from),
    i64 => Integer(i64::from),
    f64 => Float(f64::from),
    String => String(String::from),
    &str => String(String::from),
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl<V> From<Option<V>> for Value
where
    V: Into<Value>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}

impl<V> From<Vec<V>> for Value
where
    V: Into<Value>,
{
    fn from(list: Vec<V>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

impl<V, const N: usize> From<[V; N]> for Value
where
    V: Into<Value>,
{
    fn from(list: [V; N]) -> Self {
        Self::from(Vec::from(list))
    }
}

/// Builds a map from key value pairs, later keys overwrite earlier ones.
impl<K, V, const N: usize> From<[(K, V); N]> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
