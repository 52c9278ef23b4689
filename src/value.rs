//! The tagged value model.
//!
//! Every entry holds a [`Value`]; the active variant is the source of truth
//! for type checks. [`CVarType`] maps the Rust types a caller can ask for onto
//! the variants, so typed access is one tag compare at the boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type Vec2 = [f64; 2];
pub type Vec3 = [f64; 3];
pub type Vec4 = [f64; 4];

/// The variant tag of a [`Value`]; an entry's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    String,
    Vec2,
    Vec3,
    Vec4,
}

impl TypeTag {
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "Bool",
            TypeTag::Int => "Int",
            TypeTag::Float => "Float",
            TypeTag::String => "String",
            TypeTag::Vec2 => "Vec2",
            TypeTag::Vec3 => "Vec3",
            TypeTag::Vec4 => "Vec4",
        }
    }

    /// Whether bounds of this type are expressed as floats.
    pub const fn is_float_like(self) -> bool {
        matches!(
            self,
            TypeTag::Float | TypeTag::Vec2 | TypeTag::Vec3 | TypeTag::Vec4
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
            Value::Vec2(_) => TypeTag::Vec2,
            Value::Vec3(_) => TypeTag::Vec3,
            Value::Vec4(_) => TypeTag::Vec4,
        }
    }

    /// Float components of a vector variant, `None` for scalars and strings.
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Value::Vec2(v) => Some(v),
            Value::Vec3(v) => Some(v),
            Value::Vec4(v) => Some(v),
            _ => None,
        }
    }

    /// Builds a vector variant from 2, 3 or 4 components.
    pub fn from_components(components: &[f64]) -> Option<Value> {
        match *components {
            [x, y] => Some(Value::Vec2([x, y])),
            [x, y, z] => Some(Value::Vec3([x, y, z])),
            [x, y, z, w] => Some(Value::Vec4([x, y, z, w])),
            _ => None,
        }
    }

    /// Human readable form used by debug output, e.g. `Vec3(1, 2, 3)`.
    pub fn describe(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => x.to_string(),
            Value::String(s) => s.clone(),
            Value::Vec2(_) | Value::Vec3(_) | Value::Vec4(_) => {
                let parts: Vec<String> = self
                    .components()
                    .unwrap_or_default()
                    .iter()
                    .map(f64::to_string)
                    .collect();
                format!("{}({})", self.type_tag(), parts.join(", "))
            }
        }
    }
}

/// Text form used by the ini codec. Floats always carry a fraction or
/// exponent so they re-read as floats; vectors are comma joined.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => f.write_str(s),
            Value::Vec2(_) | Value::Vec3(_) | Value::Vec4(_) => {
                for (i, c) in self.components().unwrap_or_default().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c:?}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Value::Vec4(v)
    }
}

/// A Rust type stored in exactly one [`Value`] variant.
pub trait CVarType: Clone + Send + Sync + 'static {
    const TAG: TypeTag;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
    fn from_value_mut(value: &mut Value) -> Option<&mut Self>;
}

macro_rules! impl_cvar_type {
    ($ty:ty, $variant:ident) => {
        impl CVarType for $ty {
            const TAG: TypeTag = TypeTag::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut Value) -> Option<&mut Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_cvar_type!(bool, Bool);
impl_cvar_type!(i64, Int);
impl_cvar_type!(f64, Float);
impl_cvar_type!(String, String);
impl_cvar_type!(Vec2, Vec2);
impl_cvar_type!(Vec3, Vec3);
impl_cvar_type!(Vec4, Vec4);

/// Advisory numeric bound. Stored with the descriptor, never enforced by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(f64),
}

impl Bound {
    /// Re-expresses the bound in the numeric kind matching `tag`.
    pub fn for_type(self, tag: TypeTag) -> Bound {
        match (self, tag) {
            (Bound::Int(i), t) if t.is_float_like() => Bound::Float(i as f64),
            (bound, _) => bound,
        }
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Bound::Int(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Bound::Int(v.into())
    }
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        Bound::Float(v)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(i) => write!(f, "{i}"),
            Bound::Float(x) => write!(f, "{x}"),
        }
    }
}
