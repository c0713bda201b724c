use crate::query::operation::{Operation, SkipCount};
use std::fmt;

///
/// ExplainSpec
///
/// Human-readable, one-line-per-operation rendering of a spec.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExplainSpec {
    lines: Vec<String>,
}

impl ExplainSpec {
    pub(crate) fn from_operations(ops: Vec<&Operation>) -> Self {
        let lines = ops.into_iter().map(describe).collect();

        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

fn describe(op: &Operation) -> String {
    match op {
        Operation::Filter(predicate) => format!("filter {predicate}"),
        Operation::GroupBy(key) => format!("group_by {key}"),
        Operation::Project(projection) => format!("project {projection}"),
        Operation::Skip(SkipCount::Fixed(n)) => format!("skip {n}"),
        Operation::Skip(SkipCount::Deferred(_)) => "skip <deferred>".to_string(),
        Operation::Sort(keys) => {
            let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
            format!("sort {}", keys.join(", "))
        }
        Operation::Take(n) => format!("take {n}"),
    }
}

impl fmt::Display for ExplainSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return f.write_str("<empty>");
        }

        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{i}: {line}")?;
        }

        Ok(())
    }
}
