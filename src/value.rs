use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Represents a value passed to, or returned from, a function under test.
///
/// # Examples
///
/// ```rust
/// use veritas::value::Value;
/// let n = Value::Float(3.14);
/// assert_eq!(n.type_name(), "float");
/// let s = Value::String("hello".to_string());
/// assert_eq!(s.type_name(), "string");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the type name of the value as it is spelled in test descriptors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use veritas::value::Value;
    /// let v = Value::Bool(true);
    /// assert_eq!(v.type_name(), "bool");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the value as a float, widening integers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use veritas::value::Value;
    /// assert_eq!(Value::Int(2).as_float(), Some(2.0));
    /// assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
    /// assert_eq!(Value::String("nope".to_string()).as_float(), None);
    /// ```
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a descriptor literal into a value of the declared type.
    ///
    /// The only widening accepted is an integral number for a `float` slot.
    /// Everything else must already have the declared shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use veritas::value::{Value, ValueType};
    /// let v = Value::from_json(&serde_json::json!(0), ValueType::Float).unwrap();
    /// assert_eq!(v, Value::Float(0.0));
    /// assert!(Value::from_json(&serde_json::json!("0"), ValueType::Int).is_err());
    /// ```
    pub fn from_json(literal: &serde_json::Value, ty: ValueType) -> Result<Value, String> {
        let converted = match (ty, literal) {
            (ValueType::Int, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
            (ValueType::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
            (ValueType::String, serde_json::Value::String(s)) => Some(Value::String(s.clone())),
            (ValueType::Bool, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
            _ => None,
        };
        converted.ok_or_else(|| json_kind(literal).to_string())
    }

    /// Converts an untyped literal, keeping whatever shape it has. Integers that do
    /// not fit `i64` become floats.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use veritas::value::Value;
    /// let v = Value::from_json_any(&serde_json::json!({"age": 30, "tags": ["a"]}));
    /// assert_eq!(v.get("age"), Some(&Value::Int(30)));
    /// ```
    pub fn from_json_any(literal: &serde_json::Value) -> Value {
        match literal {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json_any).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json_any(v)))
                    .collect(),
            ),
        }
    }

    /// Looks up a key of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &BTreeMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => Self::fmt_list(f, items),
            Value::Map(map) => Self::fmt_map(f, map),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// The declared `type` of a parameter or expected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    String,
    Bool,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Bool => "bool",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Coerces a produced value into this type for comparison.
    ///
    /// Returns `None` when the value cannot stand for this type; integers are
    /// accepted where floats are declared.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::String, Value::String(_))
            | (ValueType::Bool, Value::Bool(_)) => Some(value.clone()),
            (ValueType::Float, Value::Int(n)) => Some(Value::Float(*n as f64)),
            _ => None,
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(ValueType::Int),
            "float" | "double" => Ok(ValueType::Float),
            "string" | "str" => Ok(ValueType::String),
            "bool" | "boolean" => Ok(ValueType::Bool),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn json_kind(literal: &serde_json::Value) -> &'static str {
    match literal {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
