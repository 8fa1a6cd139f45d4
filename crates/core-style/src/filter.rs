//! Rule filter expressions (§3 "a `Rule` carries ... an optional filter
//! expression"). As with `Property`, the filter *grammar* (CQL-like text)
//! is the out-of-scope external "expression/filter parsing" collaborator;
//! this models the in-memory AST a parsed filter evaluates against a
//! feature, which is squarely in scope since rule evaluation order and
//! if/else semantics (§3, §4.I) depend on it.

use core_geom::{Feature, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
pub enum Filter {
    /// No condition: always matches. The default for a rule with no
    /// `filter` property.
    True,
    Cmp(Cmp, String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

fn compare(cmp: Cmp, lhs: &Value, rhs: &Value) -> bool {
    match cmp {
        Cmp::Eq => values_eq(lhs, rhs),
        Cmp::Ne => !values_eq(lhs, rhs),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => match cmp {
                Cmp::Lt => a < b,
                Cmp::Le => a <= b,
                Cmp::Gt => a > b,
                Cmp::Ge => a >= b,
                Cmp::Eq | Cmp::Ne => unreachable!(),
            },
            _ => false,
        },
    }
}

fn values_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => match (lhs.as_str(), rhs.as_str()) {
            (Some(a), Some(b)) => a == b,
            _ => match (lhs.as_bool(), rhs.as_bool()) {
                (Some(a), Some(b)) => a == b,
                _ => lhs.is_null() && rhs.is_null(),
            },
        },
    }
}

impl Filter {
    pub fn eval(&self, feature: &Feature) -> bool {
        match self {
            Filter::True => true,
            Filter::Cmp(cmp, name, rhs) => compare(*cmp, feature.attr(name), rhs),
            Filter::And(parts) => parts.iter().all(|f| f.eval(feature)),
            Filter::Or(parts) => parts.iter().any(|f| f.eval(feature)),
            Filter::Not(inner) => !inner.eval(feature),
        }
    }

    /// Attribute names this filter reads, used by `AttributeCollector`.
    pub fn referenced_attrs(&self, out: &mut Vec<String>) {
        match self {
            Filter::True => {}
            Filter::Cmp(_, name, _) => out.push(name.clone()),
            Filter::And(parts) | Filter::Or(parts) => {
                for f in parts {
                    f.referenced_attrs(out);
                }
            }
            Filter::Not(inner) => inner.referenced_attrs(out),
        }
    }
}
