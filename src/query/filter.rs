//! # Values and Filtering Primitives
//!
//! -   _Value_: the unit of data.
//!     A wrapper ([`Value`]) that allows heterogeneous scalar types (Integers, Floats,
//!     Strings, Booleans) to be bound to queries and returned from them uniformly.
//!
//! -   _Operation_ ([`Op`]): the logical predicate.
//!     An [`Op`] defines *how* to compare data: equality (`Eq`), inequality (`Neq`) or
//!     set membership (`In`).
//!
//! -   _Filter_ ([`FacetFilter`]): the composite predicate over search facets and their
//!     joined field. All parts are optional; [`None`] implies no filtering on that part.

use serde::{Deserialize, Serialize};

use super::Error;
use crate::types;

/// Floating point value type alias
pub type Float = f64;
/// Integer value type alias
pub type Integer = i64;
/// Literal type alias
pub type Text = String;

/// 2^63, the first float above the `BIGINT` range (`i64::MAX as f64` rounds up to it)
const BIGINT_UPPER_BOUND: Float = 9_223_372_036_854_775_808.0;

/// A wrapper enum to allow heterogeneous values to coexist in dynamic containers.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(Integer),
    Float(Float),
    Text(Text),
    Boolean(bool),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Text(_) => ValueType::Text,
            Self::Boolean(_) => ValueType::Boolean,
        }
    }

    /// Converts the value to `target` following SQL `CAST` rules.
    pub fn coerce(self, target: ValueType) -> Result<Value, Error> {
        if self.value_type() == target {
            return Ok(self);
        }

        let fail = |v: &Value| Error::Coercion {
            value: v.to_string(),
            target,
        };

        let coerced = match (&self, target) {
            (Self::Text(s), ValueType::Integer) => s.trim().parse().ok().map(Self::Integer),
            (Self::Text(s), ValueType::Float) => s.trim().parse().ok().map(Self::Float),
            (Self::Text(s), ValueType::Boolean) => parse_bool(s).map(Self::Boolean),
            (Self::Integer(v), ValueType::Float) => Some(Self::Float(*v as Float)),
            (Self::Integer(v), ValueType::Boolean) => Some(Self::Boolean(*v != 0)),
            (Self::Float(v), ValueType::Integer) => {
                let rounded = v.round_ties_even();
                if rounded.is_finite()
                    && rounded >= Integer::MIN as Float
                    && rounded < BIGINT_UPPER_BOUND
                {
                    Some(Self::Integer(rounded as Integer))
                } else {
                    None
                }
            }
            (Self::Boolean(v), ValueType::Integer) => Some(Self::Integer(Integer::from(*v))),
            (v, ValueType::Text) => Some(Self::Text(v.to_string())),
            _ => None,
        };

        coerced.ok_or_else(|| fail(&self))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Scalar type requested for values read from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// Rust types distinct field values can be materialized into.
pub trait FacetValue: Sized {
    const VALUE_TYPE: ValueType;

    fn from_value(value: Value) -> Result<Self, Error>;
}

fn mismatch(value: Value, target: ValueType) -> Error {
    Error::Coercion {
        value: value.to_string(),
        target,
    }
}

impl FacetValue for String {
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn from_value(value: Value) -> Result<Self, Error> {
        match value.coerce(Self::VALUE_TYPE)? {
            Value::Text(v) => Ok(v),
            other => Err(mismatch(other, Self::VALUE_TYPE)),
        }
    }
}

impl FacetValue for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_value(value: Value) -> Result<Self, Error> {
        match value.coerce(Self::VALUE_TYPE)? {
            Value::Integer(v) => Ok(v),
            other => Err(mismatch(other, Self::VALUE_TYPE)),
        }
    }
}

impl FacetValue for i32 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_value(value: Value) -> Result<Self, Error> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| mismatch(Value::Integer(v), Self::VALUE_TYPE))
    }
}

impl FacetValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_value(value: Value) -> Result<Self, Error> {
        match value.coerce(Self::VALUE_TYPE)? {
            Value::Float(v) => Ok(v),
            other => Err(mismatch(other, Self::VALUE_TYPE)),
        }
    }
}

impl FacetValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn from_value(value: Value) -> Result<Self, Error> {
        match value.coerce(Self::VALUE_TYPE)? {
            Value::Boolean(v) => Ok(v),
            other => Err(mismatch(other, Self::VALUE_TYPE)),
        }
    }
}

/// A trait that indicates which [`Op`]s are supported by an implementing type.
///
/// By default, all operations are unsupported (`false`).
/// These checks are performed at **runtime**.
pub trait IsSupportedOp {
    fn support_eq(&self) -> bool {
        false
    }
    fn support_in(&self) -> bool {
        false
    }
}

impl IsSupportedOp for Value {
    fn support_eq(&self) -> bool {
        true
    }

    fn support_in(&self) -> bool {
        !matches!(self, Self::Float(_))
    }
}

impl IsSupportedOp for bool {
    fn support_eq(&self) -> bool {
        true
    }
}

impl IsSupportedOp for Integer {
    fn support_eq(&self) -> bool {
        true
    }

    fn support_in(&self) -> bool {
        true
    }
}

impl IsSupportedOp for Text {
    fn support_eq(&self) -> bool {
        true
    }

    fn support_in(&self) -> bool {
        true
    }
}

/// Represents the logical operator to apply to a field for filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    /// Equal
    Eq(T),
    /// Not equal
    Neq(T),
    /// Found in a set
    In(Vec<T>),
}

impl<T> Op<T>
where
    T: IsSupportedOp,
{
    pub fn is_supported_op(&self) -> bool {
        match self {
            Self::Eq(v) => v.support_eq(),
            Self::Neq(v) => v.support_eq(),
            // an empty set matches nothing, regardless of the type
            Self::In(items) => items.first().is_none_or(|v| v.support_in()),
        }
    }
}

impl<T> Op<T>
where
    T: PartialEq,
{
    /// Evaluates the operation against `value`.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Eq(v) => v == value,
            Self::Neq(v) => v != value,
            Self::In(items) => items.contains(value),
        }
    }
}

impl<T> Op<T>
where
    T: Clone + Into<Value>,
{
    /// Values bound by the operation, in placeholder order
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Eq(v) | Self::Neq(v) => vec![v.clone().into()],
            Self::In(items) => items.iter().cloned().map(Into::into).collect(),
        }
    }
}

/// Predicate over search facets and their joined field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetFilter {
    pub show_on_search: Option<Op<bool>>,
    pub entity_type: Option<Op<Text>>,
    pub field_id: Option<Op<Integer>>,
}

impl FacetFilter {
    /// Facets flagged for search whose field applies to `entity`.
    pub fn visible_for(entity: types::FieldEntity) -> Self {
        Self {
            show_on_search: Some(Op::Eq(true)),
            entity_type: Some(Op::Eq(entity.as_type().to_owned())),
            field_id: None,
        }
    }

    /// Facets joined to the field identified by `field_id`.
    pub fn for_field(field_id: Integer) -> Self {
        Self {
            field_id: Some(Op::Eq(field_id)),
            ..Default::default()
        }
    }

    /// Returns true if there are no filters applied
    pub fn is_empty(&self) -> bool {
        self.show_on_search.is_none() && self.entity_type.is_none() && self.field_id.is_none()
    }

    pub fn matches(&self, facet: &types::SearchFacet) -> bool {
        self.show_on_search
            .as_ref()
            .is_none_or(|op| op.matches(&facet.show_on_search))
            && self
                .entity_type
                .as_ref()
                .is_none_or(|op| op.matches(&facet.field.entity_type.as_type().to_owned()))
            && self
                .field_id
                .as_ref()
                .is_none_or(|op| op.matches(&facet.field.id))
    }
}
