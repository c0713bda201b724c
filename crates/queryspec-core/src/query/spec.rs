use crate::{
    error::{BuildError, QueryError},
    model::{FieldKind, SchemaView},
    query::{
        builder::FieldRef,
        explain::ExplainSpec,
        expr::{AggregateFunc, Expr, Projection},
        fingerprint,
        metadata::MetadataBag,
        operation::{CountAccessor, Operation, SkipCount},
        parse::{SortParseMode, parse_sort},
        path::FieldPath,
        predicate::{FieldScope, Predicate, validate::static_kind, validate::validate},
        sort::{Direction, SortKey},
    },
    traits::{SpecTarget, Untyped},
    value::ValueFamily,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeSeq};
use std::{fmt, marker::PhantomData, sync::Arc};

///
/// OpNode
/// One link of the persistent operation chain.
///

struct OpNode {
    op: Operation,
    prev: Option<Arc<OpNode>>,
}

///
/// QuerySpec
///
/// Immutable, append-only query description. Every combinator returns a
/// new spec sharing the existing chain; the receiver is never modified.
/// `S` is the record type paths are validated against, or `Untyped`.
///

pub struct QuerySpec<S = Untyped> {
    tail: Option<Arc<OpNode>>,
    len: usize,
    metadata: MetadataBag,
    _marker: PhantomData<fn() -> S>,
}

impl QuerySpec<Untyped> {
    /// String-driven spec; every path is resolved at execution.
    #[must_use]
    pub fn untyped() -> Self {
        Self::new()
    }
}

impl<S: SpecTarget> QuerySpec<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tail: None,
            len: 0,
            metadata: MetadataBag::new(),
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// AND a predicate into the spec. Consecutive filters merge into one.
    pub fn filter(&self, predicate: Predicate) -> Result<Self, BuildError> {
        if let Some(scope) = self.typed_scope() {
            validate(&predicate, &scope)?;
        }

        Ok(match self.last() {
            Some(Operation::Filter(prev)) => {
                self.replace_tail(Operation::Filter(Predicate::And(vec![prev.clone(), predicate])))
            }
            _ => self.push(Operation::Filter(predicate)),
        })
    }

    /// Filter on a string-addressed path; the comparison comes from `build`.
    pub fn filter_by(
        &self,
        path: &str,
        build: impl FnOnce(FieldRef) -> Predicate,
    ) -> Result<Self, QueryError> {
        let path = FieldPath::parse(path)?;

        Ok(self.filter(build(FieldRef::new(path)))?)
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    /// Add a sort key, extending a trailing sort or starting a new one.
    pub fn sort_by(
        &self,
        path: impl Into<FieldPath>,
        direction: Direction,
    ) -> Result<Self, BuildError> {
        self.sort_keys(vec![SortKey::new(path, direction)])
    }

    /// Secondary key for the trailing sort.
    pub fn then_by(
        &self,
        path: impl Into<FieldPath>,
        direction: Direction,
    ) -> Result<Self, BuildError> {
        if !matches!(self.last(), Some(Operation::Sort(_))) {
            return Err(BuildError::ThenByWithoutSort);
        }

        self.sort_keys(vec![SortKey::new(path, direction)])
    }

    /// Parse `"path [dir], ..."` in the default permissive mode.
    pub fn sort(&self, text: &str) -> Result<Self, QueryError> {
        self.sort_with(text, SortParseMode::default())
    }

    pub fn sort_with(&self, text: &str, mode: SortParseMode) -> Result<Self, QueryError> {
        let keys = parse_sort(text, mode)?;

        Ok(self.sort_keys(keys)?)
    }

    pub fn sort_keys(&self, keys: Vec<SortKey>) -> Result<Self, BuildError> {
        if keys.is_empty() {
            return Err(BuildError::EmptySort);
        }

        if let Some(scope) = self.typed_scope() {
            for key in &keys {
                static_kind(&key.path, &scope)?;
            }
        }

        Ok(match self.last() {
            Some(Operation::Sort(prev)) => {
                let mut merged = prev.clone();
                merged.extend(keys);
                self.replace_tail(Operation::Sort(merged))
            }
            _ => self.push(Operation::Sort(keys)),
        })
    }

    // ------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------

    /// Skip `n` elements; negative counts behave as zero.
    #[must_use]
    pub fn skip(&self, n: i64) -> Self {
        self.push(Operation::Skip(SkipCount::Fixed(n)))
    }

    /// Skip a count computed when the spec is run.
    #[must_use]
    pub fn skip_with(&self, count: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.push(Operation::Skip(SkipCount::Deferred(CountAccessor::new(count))))
    }

    /// Take at most `n` elements; negative counts behave as zero.
    #[must_use]
    pub fn take(&self, n: i64) -> Self {
        self.push(Operation::Take(n))
    }

    /// 1-based page: `skip((page - 1) * size)` then `take(size)`.
    pub fn page(&self, page: i64, size: i64) -> Result<Self, BuildError> {
        if page <= 0 || size <= 0 {
            return Err(BuildError::InvalidPage { page, size });
        }

        let offset = (page - 1).saturating_mul(size);

        Ok(self.skip(offset).take(size))
    }

    // ------------------------------------------------------------------
    // Shaping
    // ------------------------------------------------------------------

    /// Replace each element with a row of named expressions.
    pub fn select(&self, projection: Projection) -> Result<Self, BuildError> {
        projection.check()?;

        let scope = self.scope();
        let grouped = matches!(scope, Scope::Grouped { .. });
        for (_, expr) in projection.fields() {
            if expr.is_aggregate() && !grouped {
                return Err(BuildError::AggregateOutsideGroup);
            }
            if self.is_typed() {
                scope.check_expr(expr)?;
            }
        }

        Ok(self.push(Operation::Project(projection)))
    }

    /// Group the current sequence by a key; groups expose `key` and `count`.
    pub fn group_by(&self, key: Expr) -> Result<Self, BuildError> {
        if key.is_aggregate() {
            return Err(BuildError::AggregateOutsideGroup);
        }
        if let Some(scope) = self.typed_scope() {
            scope.check_expr(&key)?;
        }

        Ok(self.push(Operation::GroupBy(key)))
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    #[must_use]
    pub fn with_metadata<V>(&self, key: impl Into<String>, value: V) -> Self
    where
        V: std::any::Any + Send + Sync,
    {
        self.with_bag(self.metadata.with(key, value))
    }

    /// Record an eager-loading hint for external loaders.
    #[must_use]
    pub fn with_include(&self, path: impl Into<String>) -> Self {
        self.with_bag(self.metadata.with_include(path))
    }

    #[must_use]
    pub const fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    fn with_bag(&self, metadata: MetadataBag) -> Self {
        Self {
            tail: self.tail.clone(),
            len: self.len,
            metadata,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Operations in application order.
    #[must_use]
    pub fn operations(&self) -> Vec<&Operation> {
        let mut ops = Vec::with_capacity(self.len);
        let mut cursor = self.tail.as_deref();
        while let Some(node) = cursor {
            ops.push(&node.op);
            cursor = node.prev.as_deref();
        }
        ops.reverse();

        ops
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn explain(&self) -> ExplainSpec {
        ExplainSpec::from_operations(self.operations())
    }

    /// Stable structural hash of the operation chain (metadata excluded).
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint::fingerprint_operations(&self.operations())
    }

    /// Drop the static binding, keeping operations and metadata.
    #[must_use]
    pub fn into_untyped(self) -> QuerySpec<Untyped> {
        QuerySpec {
            tail: self.tail,
            len: self.len,
            metadata: self.metadata,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn last(&self) -> Option<&Operation> {
        self.tail.as_deref().map(|node| &node.op)
    }

    fn push(&self, op: Operation) -> Self {
        Self {
            tail: Some(Arc::new(OpNode {
                op,
                prev: self.tail.clone(),
            })),
            len: self.len + 1,
            metadata: self.metadata.clone(),
            _marker: PhantomData,
        }
    }

    fn replace_tail(&self, op: Operation) -> Self {
        let prev = self.tail.as_ref().and_then(|node| node.prev.clone());

        Self {
            tail: Some(Arc::new(OpNode { op, prev })),
            len: self.len,
            metadata: self.metadata.clone(),
            _marker: PhantomData,
        }
    }

    fn is_typed(&self) -> bool {
        S::schema().is_some()
    }

    fn typed_scope(&self) -> Option<Scope> {
        self.is_typed().then(|| self.scope())
    }

    /// Field scope at the end of the current chain.
    fn scope(&self) -> Scope {
        self.operations()
            .into_iter()
            .fold(Scope::Source(S::schema()), Scope::after)
    }
}

impl<S: SpecTarget> Default for QuerySpec<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for QuerySpec<S> {
    fn clone(&self) -> Self {
        Self {
            tail: self.tail.clone(),
            len: self.len,
            metadata: self.metadata.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: SpecTarget> fmt::Debug for QuerySpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("operations", &self.operations())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<S: SpecTarget> Serialize for QuerySpec<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        let ops = self.operations();
        let mut seq = serializer.serialize_seq(Some(ops.len()))?;
        for op in ops {
            seq.serialize_element(op)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for QuerySpec<Untyped> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ops = Vec::<Operation>::deserialize(deserializer)?;

        Ok(ops
            .into_iter()
            .fold(Self::untyped(), |spec, op| spec.push(op)))
    }
}

///
/// Scope
///
/// Addressable fields at one point of the chain, used for build-time
/// validation of statically bound paths on typed specs.
///

enum Scope {
    Source(Option<&'static dyn SchemaView>),
    Projected(Vec<(String, FieldKind)>),
    Grouped { key: FieldKind, items: Box<Self> },
}

impl Scope {
    fn after(self, op: &Operation) -> Self {
        match op {
            Operation::Project(projection) => {
                let fields = projection
                    .fields()
                    .iter()
                    .map(|(name, expr)| (name.clone(), self.expr_kind(expr)))
                    .collect();
                Self::Projected(fields)
            }
            Operation::GroupBy(key) => Self::Grouped {
                key: self.expr_kind(key),
                items: Box::new(self),
            },
            _ => self,
        }
    }

    fn expr_kind(&self, expr: &Expr) -> FieldKind {
        match (expr, self) {
            (Expr::Field(path), _) => self.field_kind(&path.dotted()).unwrap_or(FieldKind::Any),
            (Expr::Literal(value), _) => FieldKind::of_value(value),
            (
                Expr::Aggregate {
                    func: AggregateFunc::Count,
                    ..
                },
                _,
            ) => FieldKind::Int,
            (
                Expr::Aggregate {
                    field: Some(path), ..
                },
                Self::Grouped { items, .. },
            ) => items.field_kind(&path.dotted()).unwrap_or(FieldKind::Any),
            (Expr::Aggregate { .. }, _) => FieldKind::Any,
        }
    }

    fn check_expr(&self, expr: &Expr) -> Result<(), BuildError> {
        match (expr, self) {
            (Expr::Field(path), _) => static_kind(path, self).map(|_| ()),
            (Expr::Literal(_), _) => Ok(()),
            (
                Expr::Aggregate {
                    func,
                    field: Some(path),
                },
                Self::Grouped { items, .. },
            ) => {
                let kind = static_kind(path, items.as_ref())?;
                match (func, kind) {
                    (AggregateFunc::Sum, Some(kind)) if !kind.accepts(ValueFamily::Numeric) => {
                        Err(BuildError::LiteralType {
                            path: path.dotted(),
                            kind,
                            family: ValueFamily::Numeric,
                        })
                    }
                    _ => Ok(()),
                }
            }
            (Expr::Aggregate { .. }, _) => Ok(()),
        }
    }
}

impl FieldScope for Scope {
    fn scope_name(&self) -> String {
        match self {
            Self::Source(Some(schema)) => schema.name().to_string(),
            Self::Source(None) => "untyped source".to_string(),
            Self::Projected(_) => "projection".to_string(),
            Self::Grouped { .. } => "group".to_string(),
        }
    }

    fn field_kind(&self, path: &str) -> Option<FieldKind> {
        match self {
            Self::Source(Some(schema)) => schema.field_kind(path),
            Self::Source(None) => Some(FieldKind::Any),
            Self::Projected(fields) => fields
                .iter()
                .find_map(|(name, kind)| (name == path).then_some(*kind)),
            Self::Grouped { key, .. } => match path {
                "key" => Some(*key),
                "count" => Some(FieldKind::Int),
                _ => None,
            },
        }
    }
}
