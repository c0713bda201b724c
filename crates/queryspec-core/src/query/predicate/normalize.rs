use crate::query::predicate::Predicate;

/// Normalize a predicate into the canonical form both engines consume.
///
/// - nested `And` / `Or` are flattened
/// - neutral `True` / `False` children are dropped
/// - absorbing children collapse the whole node
/// - single-child nodes are unwrapped
/// - double negation and negated constants fold
///
/// Every fold is sound under three-valued logic.
#[must_use]
pub fn normalize(predicate: &Predicate) -> Predicate {
    match predicate {
        Predicate::True => Predicate::True,
        Predicate::False => Predicate::False,
        Predicate::And(children) => fold_junction(children, true),
        Predicate::Or(children) => fold_junction(children, false),
        Predicate::Not(inner) => match normalize(inner) {
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Not(x) => *x,
            other => Predicate::Not(Box::new(other)),
        },
        Predicate::Compare(_) | Predicate::Custom(_) => predicate.clone(),
    }
}

fn fold_junction(children: &[Predicate], is_and: bool) -> Predicate {
    let (neutral, absorbing) = if is_and {
        (Predicate::True, Predicate::False)
    } else {
        (Predicate::False, Predicate::True)
    };

    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let child = normalize(child);
        match child {
            ref c if *c == absorbing => return absorbing,
            ref c if *c == neutral => {}
            Predicate::And(grand) if is_and => out.extend(grand),
            Predicate::Or(grand) if !is_and => out.extend(grand),
            other => out.push(other),
        }
    }

    match out.len() {
        0 => neutral,
        1 => out.pop().unwrap_or(neutral),
        _ if is_and => Predicate::And(out),
        _ => Predicate::Or(out),
    }
}
