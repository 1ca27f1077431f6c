//! Dynamic comparison of `serde_json` documents.
//!
//! A JSON value has no fixed shape: objects compare as expando objects
//! (members may be missing on either side), arrays as collections and
//! differing value kinds as a `TypeMismatch` labelled with the JSON kind.

use crate::inspect::{Inspect, Items, Member, Scalar, Shape, ShapeKind, TypeDescriptor, ValueRef};
use serde_json::{Number, Value};
use std::any::Any;
use std::borrow::Cow;

fn number(n: &Number) -> Scalar<'static> {
    if let Some(v) = n.as_i64() {
        Scalar::Int(i128::from(v))
    } else if let Some(v) = n.as_u64() {
        Scalar::UInt(u128::from(v))
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl Inspect for Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Value>(ShapeKind::Dynamic)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(v) => Shape::Primitive(Scalar::Bool(*v)),
            Value::Number(n) => Shape::Primitive(number(n)),
            Value::String(s) => Shape::Primitive(Scalar::Str(Cow::Borrowed(s.as_str()))),
            Value::Array(items) => {
                Shape::Collection(Items::borrowed(Some(items.len()), items.iter()))
            }
            Value::Object(members) => Shape::Expando(
                members
                    .iter()
                    .map(|(name, value)| {
                        Member::keyed(
                            name.as_str(),
                            Value::type_descriptor(),
                            ValueRef::Borrowed(value),
                        )
                    })
                    .collect(),
            ),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        })
    }

    fn as_value_any(&self) -> Option<&dyn Any> {
        match self {
            Value::Null => None,
            _ => Some(self),
        }
    }
}
