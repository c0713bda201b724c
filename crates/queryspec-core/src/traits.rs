use crate::{
    model::{FieldKind, Row, SchemaView, Shape},
    value::{Float64, Value},
};

///
/// FieldValue
///
/// Conversion boundary between Rust field types and runtime `Value`s.
/// `kind` reports the declared kind used for build-time literal checks.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    fn kind() -> FieldKind
    where
        Self: Sized;
}

macro_rules! impl_field_value {
    ( $( $ty:ty => $kind:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn kind() -> FieldKind {
                    FieldKind::$kind
                }
            }
        )*
    };
}

impl_field_value!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    Float64 => Float,
);

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn kind() -> FieldKind {
        FieldKind::Text
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }

    fn kind() -> FieldKind {
        FieldKind::Text
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn kind() -> FieldKind {
        FieldKind::Any
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn kind() -> FieldKind {
        T::kind()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn kind() -> FieldKind {
        FieldKind::List
    }
}

///
/// Record
///
/// A type whose fields can be addressed by dotted path.
/// The shape is built once per type and cached for the process lifetime.
///

pub trait Record: Sized + Send + Sync + 'static {
    fn shape() -> &'static Shape<Self>;

    /// Materialize the declared fields as a dynamic row.
    fn to_row(&self) -> Row {
        Self::shape()
            .fields()
            .iter()
            .map(|field| (field.model().path.clone(), (field.accessor())(self)))
            .collect()
    }
}

///
/// SpecTarget
///
/// Binding of a `QuerySpec` to a declared shape. Typed specs validate
/// statically bound paths against it; untyped specs defer everything.
///

pub trait SpecTarget: 'static {
    fn schema() -> Option<&'static dyn SchemaView>;
}

impl<T: Record> SpecTarget for T {
    fn schema() -> Option<&'static dyn SchemaView> {
        Some(T::shape())
    }
}

///
/// Untyped
/// Marker for specs built from string-addressed paths only.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Untyped;

impl SpecTarget for Untyped {
    fn schema() -> Option<&'static dyn SchemaView> {
        None
    }
}

///
/// AppliesTo
/// Specs that may run over records of type `T`: the spec bound to `T`, or an untyped spec.
///

pub trait AppliesTo<T: Record>: SpecTarget {}

impl<T: Record> AppliesTo<T> for T {}

impl<T: Record> AppliesTo<T> for Untyped {}
