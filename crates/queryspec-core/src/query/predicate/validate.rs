use crate::{
    error::BuildError,
    model::FieldKind,
    query::{
        path::FieldPath,
        predicate::{ComparePredicate, CustomPredicate, Predicate},
    },
    value::{Value, coerce_to_kind},
};

///
/// FieldScope
///
/// The set of fields addressable at one point of an operation chain:
/// the record shape, a projection's output names, or a group's `key`/`count`.
///

pub trait FieldScope {
    fn scope_name(&self) -> String;

    fn field_kind(&self, path: &str) -> Option<FieldKind>;
}

/// Validate statically bound paths against a scope.
///
/// Named paths are skipped; they are checked when the spec is bound.
pub(crate) fn validate(predicate: &Predicate, scope: &dyn FieldScope) -> Result<(), BuildError> {
    match predicate {
        Predicate::True | Predicate::False => Ok(()),
        Predicate::And(children) | Predicate::Or(children) => children
            .iter()
            .try_for_each(|child| validate(child, scope)),
        Predicate::Not(inner) => validate(inner, scope),
        Predicate::Compare(ComparePredicate { path, value, .. }) => {
            let Some(kind) = static_kind(path, scope)? else {
                return Ok(());
            };
            check_family(path, kind, value)
        }
        Predicate::Custom(custom) => {
            let Some(kind) = static_kind(custom.path(), scope)? else {
                return Ok(());
            };
            validate_custom(custom, kind)
        }
    }
}

fn validate_custom(custom: &CustomPredicate, kind: FieldKind) -> Result<(), BuildError> {
    match custom {
        CustomPredicate::IsBetween { path, min, max, .. } => {
            check_family(path, kind, min)?;
            check_family(path, kind, max)
        }
        CustomPredicate::HasFlag { path, flag } => {
            if kind.is_integer() && flag.is_integer() {
                Ok(())
            } else {
                Err(BuildError::NonIntegerFlag {
                    path: path.dotted(),
                    kind,
                })
            }
        }
        CustomPredicate::IsIn { path, items } => items
            .iter()
            .try_for_each(|item| check_family(path, kind, item)),
        CustomPredicate::Like { path, .. } => check_pattern(path, kind),
    }
}

/// Resolve a static path's kind; `None` for named paths.
pub(crate) fn static_kind(
    path: &FieldPath,
    scope: &dyn FieldScope,
) -> Result<Option<FieldKind>, BuildError> {
    if !path.is_static() {
        return Ok(None);
    }

    let dotted = path.dotted();
    scope
        .field_kind(&dotted)
        .map(Some)
        .ok_or_else(|| BuildError::UnknownField {
            path: dotted,
            shape: scope.scope_name(),
        })
}

fn check_family(path: &FieldPath, kind: FieldKind, value: &Value) -> Result<(), BuildError> {
    if kind.accepts(value.family()) {
        Ok(())
    } else {
        Err(BuildError::LiteralType {
            path: path.dotted(),
            kind,
            family: value.family(),
        })
    }
}

/// Coerce a literal for a resolved path, used when binding named paths.
pub(crate) fn coerce_literal(
    path: &FieldPath,
    kind: FieldKind,
    value: &Value,
) -> Result<Value, BuildError> {
    coerce_to_kind(kind, value).ok_or_else(|| BuildError::LiteralType {
        path: path.dotted(),
        kind,
        family: value.family(),
    })
}

/// Coerce a flag literal for a resolved path; both sides must be integers.
/// A null flag passes through and evaluates unknown.
pub(crate) fn coerce_flag(
    path: &FieldPath,
    kind: FieldKind,
    flag: &Value,
) -> Result<Value, BuildError> {
    let non_integer = || BuildError::NonIntegerFlag {
        path: path.dotted(),
        kind,
    };
    if !kind.is_integer() {
        return Err(non_integer());
    }

    match coerce_to_kind(kind, flag) {
        Some(value) if value.is_null() || value.is_integer() => Ok(value),
        _ => Err(non_integer()),
    }
}

/// Pattern matching needs a textual (or unknown) field kind.
pub(crate) fn check_pattern(path: &FieldPath, kind: FieldKind) -> Result<(), BuildError> {
    if kind.is_textual() {
        Ok(())
    } else {
        Err(BuildError::NonTextPattern {
            path: path.dotted(),
            kind,
        })
    }
}
