//! Structural introspection of values.
//!
//! Comparers never look at concrete types. Every comparable type implements
//! [`Inspect`], which describes the declared type once ([`TypeDescriptor`])
//! and exposes each value as a [`Shape`]: a primitive scalar, a flag set,
//! an array, a countable collection, a lazy sequence, a keyed map, or an
//! object with an ordered member list.
//!
//! Structs get their member list from [`inspect_struct!`](crate::inspect_struct),
//! field-less enums from [`inspect_enum!`](crate::inspect_enum) and
//! `bitflags` types from [`inspect_bitflags!`](crate::inspect_bitflags).

use crate::path::short_type_name;
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, LinkedList, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

/// Upcast to [`Any`], implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Structural category used to pick a comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Scalar compared by value
    Primitive,
    /// Bit-flag enumeration
    Flags,
    /// Fixed-size indexable sequence
    Array,
    /// Variable-size sequence with a cheap count
    Collection,
    /// Sequence without a cheap count
    Sequence,
    /// Entries addressed by key
    Map,
    /// Statically known ordered members
    Object,
    /// Members that vary per instance
    Expando,
    /// Shape is only known per value
    Dynamic,
}

impl ShapeKind {
    pub fn is_enumerable(self) -> bool {
        matches!(
            self,
            ShapeKind::Array | ShapeKind::Collection | ShapeKind::Sequence
        )
    }
}

/// Identity, display name and declared shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: ShapeKind,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>(kind: ShapeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
        }
    }

    /// Type name without module paths, e.g. `Vec<i32>`
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

/// A value that can be structurally compared.
pub trait Inspect: AsAny + 'static {
    /// Descriptor of the declared type.
    fn type_descriptor() -> TypeDescriptor
    where
        Self: Sized;

    /// Descriptor of the runtime type. Differs from the declared one only
    /// for wrappers such as trait objects.
    fn descriptor(&self) -> TypeDescriptor;

    fn shape(&self) -> Shape<'_>;

    /// Label reported by `TypeMismatch` differences.
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(self.descriptor().short_name())
    }

    /// The underlying value for downcasting; `None` when absent.
    fn as_value_any(&self) -> Option<&dyn Any> {
        Some(self.as_any())
    }
}

/// Scalar payload of a primitive value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    Unit,
    Bool(bool),
    Int(i128),
    UInt(u128),
    Float(f64),
    Float32(f32),
    Char(char),
    Str(Cow<'a, str>),
}

impl Scalar<'_> {
    fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Float32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Value equality; `NaN` equals `NaN`.
    ///
    /// Integers compare exactly, also against floats: an integer equals a
    /// float only when the float is finite, integral and holds exactly that
    /// integer.
    pub fn same_value(&self, other: &Scalar<'_>) -> bool {
        match (self, other) {
            (Scalar::Unit, Scalar::Unit) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Int(i), Scalar::UInt(u)) | (Scalar::UInt(u), Scalar::Int(i)) => {
                u128::try_from(*i).map_or(false, |i| i == *u)
            }
            (Scalar::Int(i), x) | (x, Scalar::Int(i)) => {
                x.as_float().map_or(false, |f| float_is_int(f, *i))
            }
            (Scalar::UInt(u), x) | (x, Scalar::UInt(u)) => {
                x.as_float().map_or(false, |f| float_is_uint(f, *u))
            }
            _ => match (self.as_float(), other.as_float()) {
                (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
                _ => false,
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            Scalar::Unit => String::from("()"),
            Scalar::Bool(v) => v.to_string(),
            Scalar::Int(v) => v.to_string(),
            Scalar::UInt(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Float32(v) => v.to_string(),
            Scalar::Char(v) => v.to_string(),
            Scalar::Str(v) => v.to_string(),
        }
    }
}

fn float_is_int(f: f64, i: i128) -> bool {
    f.is_finite() && f.fract() == 0.0 && i as f64 == f && f as i128 == i
}

fn float_is_uint(f: f64, u: u128) -> bool {
    f.is_finite() && f.fract() == 0.0 && u as f64 == f && f as u128 == u
}

/// Bits of a flag enumeration together with its named flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
    pub bits: u64,
    pub flags: Vec<(&'static str, u64)>,
}

impl FlagSet {
    pub fn new(bits: u64, flags: impl IntoIterator<Item = (&'static str, u64)>) -> Self {
        Self {
            bits,
            flags: flags.into_iter().collect(),
        }
    }

    /// Renders the set as `"A, B"` in ascending flag order.
    ///
    /// Falls back to the raw number when named flags cannot cover every bit.
    pub fn render(&self) -> String {
        if self.bits == 0 {
            return self
                .flags
                .iter()
                .find(|(name, value)| *value == 0 && !name.is_empty())
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| String::from("0"));
        }

        let mut named: Vec<&(&'static str, u64)> = self
            .flags
            .iter()
            .filter(|(name, value)| *value != 0 && !name.is_empty())
            .collect();
        named.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining = self.bits;
        let mut names = Vec::new();
        for (name, value) in named {
            if remaining & *value == *value {
                names.push(*name);
                remaining &= !*value;
            }
        }

        if remaining != 0 {
            return self.bits.to_string();
        }
        names.reverse();
        names.join(", ")
    }
}

/// A borrowed or produced value handed to comparers
pub enum ValueRef<'a> {
    Borrowed(&'a dyn Inspect),
    Owned(Box<dyn Inspect>),
}

impl<'a> Deref for ValueRef<'a> {
    type Target = dyn Inspect;

    fn deref(&self) -> &Self::Target {
        match self {
            ValueRef::Borrowed(value) => *value,
            ValueRef::Owned(value) => value.as_ref(),
        }
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueRef({})", render_value(&**self))
    }
}

/// Elements of an enumerable value
pub struct Items<'a> {
    /// Declared element type
    pub element: TypeDescriptor,
    /// Element count when it is known without enumerating
    pub len: Option<usize>,
    pub iter: Box<dyn Iterator<Item = ValueRef<'a>> + 'a>,
}

impl<'a> Items<'a> {
    pub fn new<I>(element: TypeDescriptor, len: Option<usize>, iter: I) -> Self
    where
        I: Iterator<Item = ValueRef<'a>> + 'a,
    {
        Self {
            element,
            len,
            iter: Box::new(iter),
        }
    }

    /// Items over borrowed elements of one declared type
    pub fn borrowed<T, I>(len: Option<usize>, iter: I) -> Self
    where
        T: Inspect,
        I: Iterator<Item = &'a T> + 'a,
    {
        Self::new(
            T::type_descriptor(),
            len,
            iter.map(|value| ValueRef::Borrowed(value)),
        )
    }
}

/// A named member of an object or an entry of a map
pub struct Member<'a> {
    /// Member name, or the rendered key of a map entry
    pub name: Cow<'a, str>,
    pub declared: TypeDescriptor,
    pub value: ValueRef<'a>,
    /// Key of a map entry. Entries are matched on it, since distinct keys
    /// may render to the same name.
    pub key: Option<ValueRef<'a>>,
}

impl<'a> Member<'a> {
    pub fn of<T: Inspect>(name: &'static str, value: &'a T) -> Self {
        Self {
            name: Cow::Borrowed(name),
            declared: T::type_descriptor(),
            value: ValueRef::Borrowed(value),
            key: None,
        }
    }

    pub fn keyed(
        name: impl Into<Cow<'a, str>>,
        declared: TypeDescriptor,
        value: ValueRef<'a>,
    ) -> Self {
        Self {
            name: name.into(),
            declared,
            value,
            key: None,
        }
    }

    /// A map entry named after its rendered key
    pub fn entry(key: ValueRef<'a>, declared: TypeDescriptor, value: ValueRef<'a>) -> Self {
        Self {
            name: Cow::Owned(render_value(&*key)),
            declared,
            value,
            key: Some(key),
        }
    }
}

/// Structural view of one value
pub enum Shape<'a> {
    /// Absent value
    Null,
    Primitive(Scalar<'a>),
    Flags(FlagSet),
    Array(Items<'a>),
    Collection(Items<'a>),
    Sequence(Items<'a>),
    /// Entries reported as `parent[key]`, each carrying its key
    Map(Vec<Member<'a>>),
    /// Members fixed by the type
    Object(Vec<Member<'a>>),
    /// Members present per instance, reported as `parent.name`
    Expando(Vec<Member<'a>>),
}

impl Shape<'_> {
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            Shape::Null => None,
            Shape::Primitive(_) => Some(ShapeKind::Primitive),
            Shape::Flags(_) => Some(ShapeKind::Flags),
            Shape::Array(_) => Some(ShapeKind::Array),
            Shape::Collection(_) => Some(ShapeKind::Collection),
            Shape::Sequence(_) => Some(ShapeKind::Sequence),
            Shape::Map(_) => Some(ShapeKind::Map),
            Shape::Object(_) => Some(ShapeKind::Object),
            Shape::Expando(_) => Some(ShapeKind::Expando),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Shape::Null)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Primitive(_) => "primitive",
            Shape::Flags(_) => "flags",
            Shape::Array(_) => "array",
            Shape::Collection(_) => "collection",
            Shape::Sequence(_) => "sequence",
            Shape::Map(_) => "map",
            Shape::Object(_) => "object",
            Shape::Expando(_) => "expando",
        }
    }

    /// Whether an enumerable shape holds no elements; consumes lazy items.
    pub fn is_empty_enumerable(self) -> bool {
        match self {
            Shape::Array(items) | Shape::Collection(items) | Shape::Sequence(items) => {
                let mut iter = items.iter;
                match items.len {
                    Some(len) => len == 0,
                    None => iter.next().is_none(),
                }
            }
            _ => false,
        }
    }
}

/// Deterministic text of a value: scalars and flags by content, absent as
/// `""`, anything else by its type name.
pub fn render_value(value: &dyn Inspect) -> String {
    render_shape(value, &value.shape())
}

pub(crate) fn render_shape(value: &dyn Inspect, shape: &Shape<'_>) -> String {
    match shape {
        Shape::Null => String::new(),
        Shape::Primitive(scalar) => scalar.render(),
        Shape::Flags(flags) => flags.render(),
        _ => value.type_name().into_owned(),
    }
}

macro_rules! inspect_scalar {
    ($($ty:ty => |$v:ident| $scalar:expr),* $(,)?) => {
        $(
            impl Inspect for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>(ShapeKind::Primitive)
                }

                fn descriptor(&self) -> TypeDescriptor {
                    Self::type_descriptor()
                }

                fn shape(&self) -> Shape<'_> {
                    let $v = self;
                    Shape::Primitive($scalar)
                }
            }
        )*
    };
}

inspect_scalar! {
    () => |_v| Scalar::Unit,
    bool => |v| Scalar::Bool(*v),
    i8 => |v| Scalar::Int(i128::from(*v)),
    i16 => |v| Scalar::Int(i128::from(*v)),
    i32 => |v| Scalar::Int(i128::from(*v)),
    i64 => |v| Scalar::Int(i128::from(*v)),
    i128 => |v| Scalar::Int(*v),
    isize => |v| Scalar::Int(*v as i128),
    u8 => |v| Scalar::UInt(u128::from(*v)),
    u16 => |v| Scalar::UInt(u128::from(*v)),
    u32 => |v| Scalar::UInt(u128::from(*v)),
    u64 => |v| Scalar::UInt(u128::from(*v)),
    u128 => |v| Scalar::UInt(*v),
    usize => |v| Scalar::UInt(*v as u128),
    f32 => |v| Scalar::Float32(*v),
    f64 => |v| Scalar::Float(*v),
    char => |v| Scalar::Char(*v),
    String => |v| Scalar::Str(Cow::Borrowed(v.as_str())),
    &'static str => |v| Scalar::Str(Cow::Borrowed(*v)),
}

impl<T: Inspect> Inspect for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }

    fn descriptor(&self) -> TypeDescriptor {
        match self {
            Some(value) => value.descriptor(),
            None => T::type_descriptor(),
        }
    }

    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            Some(value) => value.type_name(),
            None => Cow::Owned(T::type_descriptor().short_name()),
        }
    }

    fn as_value_any(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(|value| value.as_value_any())
    }
}

macro_rules! inspect_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Inspect> Inspect for $ptr<T> {
                fn type_descriptor() -> TypeDescriptor {
                    T::type_descriptor()
                }

                fn descriptor(&self) -> TypeDescriptor {
                    (**self).descriptor()
                }

                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }

                fn type_name(&self) -> Cow<'static, str> {
                    (**self).type_name()
                }

                fn as_value_any(&self) -> Option<&dyn Any> {
                    (**self).as_value_any()
                }
            }
        )*
    };
}

inspect_pointer!(Box, Rc, Arc);

impl Inspect for Box<dyn Inspect> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<dyn Inspect>(ShapeKind::Dynamic)
    }

    fn descriptor(&self) -> TypeDescriptor {
        (**self).descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn type_name(&self) -> Cow<'static, str> {
        (**self).type_name()
    }

    fn as_value_any(&self) -> Option<&dyn Any> {
        (**self).as_value_any()
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<[T; N]>(ShapeKind::Array)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Array(Items::borrowed(Some(N), self.iter()))
    }
}

impl<T: Inspect> Inspect for Box<[T]> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Box<[T]>>(ShapeKind::Array)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Array(Items::borrowed(Some(self.len()), self.iter()))
    }
}

macro_rules! inspect_collection {
    ($($coll:ident),*) => {
        $(
            impl<T: Inspect> Inspect for $coll<T> {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$coll<T>>(ShapeKind::Collection)
                }

                fn descriptor(&self) -> TypeDescriptor {
                    Self::type_descriptor()
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Collection(Items::borrowed(Some(self.len()), self.iter()))
                }
            }
        )*
    };
}

inspect_collection!(Vec, VecDeque, LinkedList, BTreeSet);

fn map_entries<'a, K, V, I>(entries: I) -> Vec<Member<'a>>
where
    K: Inspect,
    V: Inspect,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    entries
        .map(|(key, value)| {
            Member::entry(
                ValueRef::Borrowed(key),
                V::type_descriptor(),
                ValueRef::Borrowed(value),
            )
        })
        .collect()
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<BTreeMap<K, V>>(ShapeKind::Map)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Map(map_entries(self.iter()))
    }
}

impl<K: Inspect, V: Inspect, S: BuildHasher + 'static> Inspect for HashMap<K, V, S> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<HashMap<K, V, S>>(ShapeKind::Map)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Map(map_entries(self.iter()))
    }
}

/// A sequence without a cheap element count.
///
/// Backed by a source that produces a fresh iterator on every enumeration,
/// so the elements are computed on demand.
pub struct Enumerable<T> {
    source: Arc<dyn Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync>,
}

impl<T: 'static> Enumerable<T> {
    pub fn new<F, I>(source: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self {
            source: Arc::new(move || Box::new(source().into_iter()) as Box<dyn Iterator<Item = T>>),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.source)()
    }
}

impl<T> Clone for Enumerable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Enumerable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enumerable<{}>", short_type_name(type_name::<T>()))
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for Enumerable<T> {
    fn from(items: Vec<T>) -> Self {
        let items = Arc::new(items);
        Self::new(move || items.as_ref().clone())
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Enumerable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Inspect> Inspect for Enumerable<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Enumerable<T>>(ShapeKind::Sequence)
    }

    fn descriptor(&self) -> TypeDescriptor {
        Self::type_descriptor()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(Items::new(
            T::type_descriptor(),
            None,
            self.iter().map(|value| ValueRef::Owned(Box::new(value))),
        ))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __member_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $name:literal) => {
        $name
    };
}

/// Implements [`Inspect`](crate::Inspect) for a struct as an object whose
/// members are the listed fields, in order.
///
/// A field can be reported under another name with `field as "Name"`.
///
/// ```ignore
/// inspect_struct!(Person { first_name as "FirstName", age });
/// ```
#[macro_export]
macro_rules! inspect_struct {
    ($ty:ty { $($field:ident $(as $name:literal)?),* $(,)? }) => {
        impl $crate::Inspect for $ty {
            fn type_descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::of::<$ty>($crate::ShapeKind::Object)
            }

            fn descriptor(&self) -> $crate::TypeDescriptor {
                <Self as $crate::Inspect>::type_descriptor()
            }

            fn shape(&self) -> $crate::Shape<'_> {
                $crate::Shape::Object(vec![
                    $($crate::Member::of($crate::__member_name!($field $(, $name)?), &self.$field)),*
                ])
            }
        }
    };
}

/// Implements [`Inspect`](crate::Inspect) for a field-less enum, compared
/// and rendered by variant name.
#[macro_export]
macro_rules! inspect_enum {
    ($ty:ty { $($variant:ident),* $(,)? }) => {
        impl $crate::Inspect for $ty {
            fn type_descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::of::<$ty>($crate::ShapeKind::Primitive)
            }

            fn descriptor(&self) -> $crate::TypeDescriptor {
                <Self as $crate::Inspect>::type_descriptor()
            }

            fn shape(&self) -> $crate::Shape<'_> {
                let name: &'static str = match self {
                    $(Self::$variant => stringify!($variant)),*
                };
                $crate::Shape::Primitive($crate::Scalar::Str(::std::borrow::Cow::Borrowed(name)))
            }
        }
    };
}

/// Implements [`Inspect`](crate::Inspect) for a type declared with
/// `bitflags!`, compared as one flag set.
#[macro_export]
macro_rules! inspect_bitflags {
    ($ty:ty) => {
        impl $crate::Inspect for $ty {
            fn type_descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::of::<$ty>($crate::ShapeKind::Flags)
            }

            fn descriptor(&self) -> $crate::TypeDescriptor {
                <Self as $crate::Inspect>::type_descriptor()
            }

            fn shape(&self) -> $crate::Shape<'_> {
                let flags = <$ty as $crate::bitflags::Flags>::FLAGS
                    .iter()
                    .map(|flag| (flag.name(), flag.value().bits() as u64));
                $crate::Shape::Flags($crate::FlagSet::new(self.bits() as u64, flags))
            }
        }
    };
}
