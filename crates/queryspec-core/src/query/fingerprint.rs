//! Structural fingerprint of an operation chain.
//!
//! Encoding tags are frozen: changing one changes every fingerprint.
use crate::{
    query::{
        expr::{AggregateFunc, Expr},
        operation::{Operation, SkipCount},
        path::FieldPath,
        predicate::{ComparePredicate, CustomPredicate, Predicate},
        sort::Direction,
    },
    value::hash::{feed_i64, feed_str, feed_u8, feed_u32, finish, new_hasher, write_to_hasher},
};
use xxhash_rust::xxh3::Xxh3;

pub(crate) fn fingerprint_operations(ops: &[&Operation]) -> u64 {
    let mut h = new_hasher();
    feed_len(&mut h, ops.len());

    for op in ops {
        hash_operation(&mut h, op);
    }

    finish(&h)
}

#[expect(clippy::cast_possible_truncation)]
fn feed_len(h: &mut Xxh3, len: usize) {
    feed_u32(h, len as u32);
}

fn hash_path(h: &mut Xxh3, path: &FieldPath) {
    feed_str(h, &path.dotted());
}

fn hash_operation(h: &mut Xxh3, op: &Operation) {
    match op {
        Operation::Filter(predicate) => {
            feed_u8(h, 0x10);
            hash_predicate(h, predicate);
        }
        Operation::GroupBy(key) => {
            feed_u8(h, 0x11);
            hash_expr(h, key);
        }
        Operation::Project(projection) => {
            feed_u8(h, 0x12);
            feed_len(h, projection.fields().len());
            for (name, expr) in projection.fields() {
                feed_str(h, name);
                hash_expr(h, expr);
            }
        }
        Operation::Skip(SkipCount::Fixed(n)) => {
            feed_u8(h, 0x13);
            feed_i64(h, *n);
        }
        Operation::Skip(SkipCount::Deferred(_)) => feed_u8(h, 0x14),
        Operation::Sort(keys) => {
            feed_u8(h, 0x15);
            feed_len(h, keys.len());
            for key in keys {
                hash_path(h, &key.path);
                feed_u8(h, u8::from(key.direction == Direction::Desc));
            }
        }
        Operation::Take(n) => {
            feed_u8(h, 0x16);
            feed_i64(h, *n);
        }
    }
}

fn hash_predicate(h: &mut Xxh3, predicate: &Predicate) {
    match predicate {
        Predicate::True => feed_u8(h, 0x20),
        Predicate::False => feed_u8(h, 0x21),
        Predicate::And(children) | Predicate::Or(children) => {
            feed_u8(h, if matches!(predicate, Predicate::And(_)) { 0x22 } else { 0x23 });
            feed_len(h, children.len());
            for child in children {
                hash_predicate(h, child);
            }
        }
        Predicate::Not(inner) => {
            feed_u8(h, 0x24);
            hash_predicate(h, inner);
        }
        Predicate::Compare(ComparePredicate { path, op, value }) => {
            feed_u8(h, 0x25);
            hash_path(h, path);
            feed_u8(h, op.tag());
            write_to_hasher(value, h);
        }
        Predicate::Custom(custom) => hash_custom(h, custom),
    }
}

fn hash_custom(h: &mut Xxh3, custom: &CustomPredicate) {
    match custom {
        CustomPredicate::IsBetween {
            path,
            min,
            max,
            include_max,
        } => {
            feed_u8(h, 0x30);
            hash_path(h, path);
            write_to_hasher(min, h);
            write_to_hasher(max, h);
            feed_u8(h, u8::from(*include_max));
        }
        CustomPredicate::HasFlag { path, flag } => {
            feed_u8(h, 0x31);
            hash_path(h, path);
            write_to_hasher(flag, h);
        }
        CustomPredicate::IsIn { path, items } => {
            feed_u8(h, 0x32);
            hash_path(h, path);
            feed_len(h, items.len());
            for item in items {
                write_to_hasher(item, h);
            }
        }
        CustomPredicate::Like { path, pattern } => {
            feed_u8(h, 0x33);
            hash_path(h, path);
            feed_str(h, pattern);
        }
    }
}

fn hash_expr(h: &mut Xxh3, expr: &Expr) {
    match expr {
        Expr::Aggregate { func, field } => {
            feed_u8(h, 0x40);
            feed_u8(
                h,
                match func {
                    AggregateFunc::Count => 0x01,
                    AggregateFunc::Max => 0x02,
                    AggregateFunc::Min => 0x03,
                    AggregateFunc::Sum => 0x04,
                },
            );
            match field {
                Some(path) => {
                    feed_u8(h, 0x01);
                    hash_path(h, path);
                }
                None => feed_u8(h, 0x00),
            }
        }
        Expr::Field(path) => {
            feed_u8(h, 0x41);
            hash_path(h, path);
        }
        Expr::Literal(value) => {
            feed_u8(h, 0x42);
            write_to_hasher(value, h);
        }
    }
}
