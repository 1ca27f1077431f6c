//! Leaf comparers that decide equality of two values without recursing.
//!
//! Value comparers are what callers plug in as type or member overrides.
//! They receive absent values too and decide for themselves how to treat
//! them.

use crate::inspect::{render_value, Inspect, Shape};
use crate::path::short_type_name;
use objcompare_common::{ComparisonSettings, ObjCompareError, Result};
use std::any::type_name;
use std::sync::Arc;

pub trait ValueComparer: Send + Sync {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool>;

    /// Text reported in a `Difference` for `value`
    fn render(&self, value: &dyn Inspect) -> String {
        render_value(value)
    }
}

impl<C: ValueComparer + ?Sized> ValueComparer for Arc<C> {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool> {
        (**self).compare(a, b, settings)
    }

    fn render(&self, value: &dyn Inspect) -> String {
        (**self).render(value)
    }
}

/// Downcast an inspected value to `T`; `Ok(None)` when the value is absent.
pub fn downcast<T: 'static>(value: &dyn Inspect) -> Result<Option<&T>> {
    match value.as_value_any() {
        None => Ok(None),
        Some(any) => any
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| ObjCompareError::IncompatibleTypes {
                expected: short_type_name(type_name::<T>()),
                found: value.type_name().into_owned(),
            }),
    }
}

/// Scalar equality, flag bits, and textual comparison for everything else
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueComparer;

impl ValueComparer for DefaultValueComparer {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        _settings: &ComparisonSettings,
    ) -> Result<bool> {
        let equal = match (a.shape(), b.shape()) {
            (Shape::Null, Shape::Null) => true,
            (Shape::Null, _) | (_, Shape::Null) => false,
            (Shape::Primitive(x), Shape::Primitive(y)) => x.same_value(&y),
            (Shape::Flags(x), Shape::Flags(y)) => x.bits == y.bits,
            _ => render_value(a) == render_value(b),
        };
        Ok(equal)
    }
}

/// Treats every pair as equal
#[derive(Debug, Default, Clone, Copy)]
pub struct DoNotCompareValueComparer;

impl ValueComparer for DoNotCompareValueComparer {
    fn compare(
        &self,
        _a: &dyn Inspect,
        _b: &dyn Inspect,
        _settings: &ComparisonSettings,
    ) -> Result<bool> {
        Ok(true)
    }
}

/// Compares the rendered text of both values
#[derive(Debug, Default, Clone, Copy)]
pub struct ToStringComparer;

impl ValueComparer for ToStringComparer {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        _settings: &ComparisonSettings,
    ) -> Result<bool> {
        Ok(render_value(a) == render_value(b))
    }
}

fn string_or_empty(value: &dyn Inspect) -> Option<String> {
    match value.shape() {
        Shape::Null => Some(String::new()),
        Shape::Primitive(scalar) => Some(scalar.render()),
        _ => None,
    }
}

/// Case-insensitive equality for strings
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreCaseStringsValueComparer;

impl ValueComparer for IgnoreCaseStringsValueComparer {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool> {
        match (a.shape(), b.shape()) {
            (Shape::Primitive(x), Shape::Primitive(y)) => {
                Ok(x.render().to_lowercase() == y.render().to_lowercase())
            }
            _ => DefaultValueComparer.compare(a, b, settings),
        }
    }
}

/// Treats an absent string and the empty string as equal
#[derive(Debug, Default, Clone, Copy)]
pub struct NullableStringsValueComparer;

impl ValueComparer for NullableStringsValueComparer {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool> {
        match (string_or_empty(a), string_or_empty(b)) {
            (Some(x), Some(y)) => Ok(x == y),
            _ => DefaultValueComparer.compare(a, b, settings),
        }
    }
}

type CompareFn<T> = dyn Fn(Option<&T>, Option<&T>, &ComparisonSettings) -> bool + Send + Sync;
type RenderFn<T> = dyn Fn(Option<&T>) -> String + Send + Sync;

/// Closure-backed comparer for values of type `T`.
///
/// Fails with `IncompatibleTypes` when handed a value that is not a `T`.
pub struct DynamicValueComparer<T> {
    compare: Box<CompareFn<T>>,
    render: Option<Box<RenderFn<T>>>,
}

impl<T: 'static> DynamicValueComparer<T> {
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>, &ComparisonSettings) -> bool + Send + Sync + 'static,
    {
        Self {
            compare: Box::new(compare),
            render: None,
        }
    }

    pub fn with_renderer<G>(mut self, render: G) -> Self
    where
        G: Fn(Option<&T>) -> String + Send + Sync + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }
}

impl<T: 'static> ValueComparer for DynamicValueComparer<T> {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool> {
        let a = downcast::<T>(a)?;
        let b = downcast::<T>(b)?;
        Ok((self.compare)(a, b, settings))
    }

    fn render(&self, value: &dyn Inspect) -> String {
        match (&self.render, downcast::<T>(value)) {
            (Some(render), Ok(typed)) => render(typed),
            _ => render_value(value),
        }
    }
}

/// Treats `default` as equivalent to an absent value, deferring all other
/// pairs to `inner`.
pub struct DefaultValueValueComparer<T> {
    default: T,
    inner: Arc<dyn ValueComparer>,
}

impl<T: PartialEq + Send + Sync + 'static> DefaultValueValueComparer<T> {
    pub fn new(default: T, inner: Arc<dyn ValueComparer>) -> Self {
        Self { default, inner }
    }

    fn is_absent(&self, value: &dyn Inspect) -> Result<bool> {
        Ok(downcast::<T>(value)?.map_or(true, |v| *v == self.default))
    }
}

impl<T: PartialEq + Send + Sync + 'static> ValueComparer for DefaultValueValueComparer<T> {
    fn compare(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
        settings: &ComparisonSettings,
    ) -> Result<bool> {
        if self.is_absent(a)? && self.is_absent(b)? {
            return Ok(true);
        }
        self.inner.compare(a, b, settings)
    }

    fn render(&self, value: &dyn Inspect) -> String {
        match self.is_absent(value) {
            Ok(true) => String::new(),
            _ => self.inner.render(value),
        }
    }
}
