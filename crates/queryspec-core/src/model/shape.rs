use crate::{
    model::field::{FieldKind, FieldModel},
    traits::{FieldValue, Record},
    value::Value,
};
use std::{collections::HashMap, fmt, sync::Arc};

/// Shared field reader; returns `Value::Null` for absent optional data.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Per-element resolver for shapes whose fields are not known up front.
pub type OpenResolver<T> = fn(&T, &str) -> Option<Value>;

///
/// SchemaView
///
/// Type-erased view of a shape, used by the builder to validate
/// statically bound paths without knowing the concrete record type.
///

pub trait SchemaView: Send + Sync {
    fn name(&self) -> &'static str;

    fn field_kind(&self, path: &str) -> Option<FieldKind>;

    /// Open shapes accept any path; resolution is deferred to each element.
    fn is_open(&self) -> bool;

    fn field_models(&self) -> Vec<FieldModel>;
}

///
/// ShapeField
///

pub struct ShapeField<T> {
    model: FieldModel,
    accessor: Accessor<T>,
}

impl<T> ShapeField<T> {
    #[must_use]
    pub const fn model(&self) -> &FieldModel {
        &self.model
    }

    #[must_use]
    pub fn accessor(&self) -> Accessor<T> {
        Arc::clone(&self.accessor)
    }
}

///
/// Shape
///
/// Accessor registry for one record type: dotted path → kind + reader.
/// Built once per type (see `record!`) and shared by every query.
///

pub struct Shape<T> {
    name: &'static str,
    fields: Vec<ShapeField<T>>,
    index: HashMap<String, usize>,
    open: Option<OpenResolver<T>>,
}

impl<T: 'static> Shape<T> {
    #[must_use]
    pub fn builder(name: &'static str) -> ShapeBuilder<T> {
        ShapeBuilder {
            name,
            fields: Vec::new(),
            open: None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[ShapeField<T>] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, path: &str) -> Option<&ShapeField<T>> {
        self.index.get(path).map(|&i| &self.fields[i])
    }

    #[must_use]
    pub const fn open_resolver(&self) -> Option<OpenResolver<T>> {
        self.open
    }

    /// Read one path from a record: declared fields first, then the open resolver.
    #[must_use]
    pub fn read(&self, record: &T, path: &str) -> Option<Value> {
        if let Some(field) = self.field(path) {
            return Some((field.accessor)(record));
        }

        self.open.and_then(|resolve| resolve(record, path))
    }
}

impl<T: Send + Sync + 'static> SchemaView for Shape<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn field_kind(&self, path: &str) -> Option<FieldKind> {
        match self.field(path) {
            Some(field) => Some(field.model.kind),
            None if self.open.is_some() => Some(FieldKind::Any),
            None => None,
        }
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn field_models(&self) -> Vec<FieldModel> {
        self.fields.iter().map(|f| f.model.clone()).collect()
    }
}

impl<T> fmt::Debug for Shape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|x| &x.model).collect::<Vec<_>>(),
            )
            .field("open", &self.open.is_some())
            .finish()
    }
}

///
/// ShapeBuilder
///

pub struct ShapeBuilder<T> {
    name: &'static str,
    fields: Vec<ShapeField<T>>,
    open: Option<OpenResolver<T>>,
}

impl<T: 'static> ShapeBuilder<T> {
    /// Register a stored field; the kind is taken from the field's Rust type.
    #[must_use]
    pub fn field<V, F>(self, path: &str, read: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&T) -> &V + Send + Sync + 'static,
    {
        self.computed(path, V::kind(), move |record| read(record).to_value())
    }

    /// Register a derived field with an explicit kind.
    #[must_use]
    pub fn computed<F>(mut self, path: &str, kind: FieldKind, read: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.fields.push(ShapeField {
            model: FieldModel {
                path: path.to_string(),
                kind,
            },
            accessor: Arc::new(read),
        });
        self
    }

    /// Flatten a nested record under `prefix`, producing `prefix.field` paths.
    #[must_use]
    pub fn nested<U, F>(mut self, prefix: &str, read: F) -> Self
    where
        U: Record,
        F: Fn(&T) -> &U + Send + Sync + 'static,
    {
        let read = Arc::new(read);
        for inner in U::shape().fields() {
            let outer = Arc::clone(&read);
            let accessor = inner.accessor();
            self.fields.push(ShapeField {
                model: FieldModel {
                    path: format!("{prefix}.{}", inner.model.path),
                    kind: inner.model.kind,
                },
                accessor: Arc::new(move |record: &T| accessor(outer(record))),
            });
        }
        self
    }

    /// Accept paths not declared up front, resolved per element.
    #[must_use]
    pub fn open(mut self, resolver: OpenResolver<T>) -> Self {
        self.open = Some(resolver);
        self
    }

    /// Finish the shape. Later registrations of a path replace earlier ones.
    #[must_use]
    pub fn build(self) -> Shape<T> {
        let mut fields: Vec<ShapeField<T>> = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());

        for field in self.fields {
            if let Some(&slot) = index.get(&field.model.path) {
                fields[slot] = field;
            } else {
                index.insert(field.model.path.clone(), fields.len());
                fields.push(field);
            }
        }

        Shape {
            name: self.name,
            fields,
            index,
            open: self.open,
        }
    }
}
