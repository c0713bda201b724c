use crate::{model::Row, traits::Record, value::Value};

///
/// Element
///
/// One item flowing through the in-memory pipeline. Sources yield records;
/// projections turn them into rows and grouping into groups.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Element<T> {
    Group(Group<T>),
    Record(T),
    Row(Row),
}

impl<T: Record> Element<T> {
    /// Flatten to a dynamic row; groups become `{key, count}`.
    #[must_use]
    pub fn to_row(&self) -> Row {
        match self {
            Self::Group(group) => group.to_row(),
            Self::Record(record) => record.to_row(),
            Self::Row(row) => row.clone(),
        }
    }
}

impl<T> Element<T> {
    #[must_use]
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_row(&self) -> Option<&Row> {
        match self {
            Self::Row(row) => Some(row),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_group(&self) -> Option<&Group<T>> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Record(_) => "record",
            Self::Row(_) => "row",
        }
    }
}

///
/// Group
/// Elements sharing one key, in their original relative order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Group<T> {
    key: Value,
    items: Vec<Element<T>>,
}

impl<T> Group<T> {
    pub(crate) const fn new(key: Value, items: Vec<Element<T>>) -> Self {
        Self { key, items }
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    #[must_use]
    pub fn items(&self) -> &[Element<T>] {
        &self.items
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Element<T>> {
        self.items
    }

    /// Count as the value exposed under the `count` field.
    #[must_use]
    pub fn count_value(&self) -> Value {
        Value::Int(i64::try_from(self.items.len()).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn to_row(&self) -> Row {
        Row::new()
            .with("key", self.key.clone())
            .with("count", self.count_value())
    }
}
