//! A `Rule`: a scale window, an optional filter, and the symbolizers that
//! fire when both match (§3, §4.I step 2).

use crate::filter::Filter;
use crate::symbolizer::Symbolizer;

#[derive(Debug, Clone)]
pub struct Rule {
    pub filter: Filter,
    pub symbolizers: Vec<Symbolizer>,
    pub min_scale_denominator: f64,
    pub max_scale_denominator: f64,
    /// A rule with no explicit filter and `else_filter = true` fires only
    /// when every sibling rule with a real filter failed to match (§3 "else
    /// filter": the fallback clause of a rule group).
    pub else_filter: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            filter: Filter::True,
            symbolizers: Vec::new(),
            min_scale_denominator: 0.0,
            max_scale_denominator: f64::MAX,
            else_filter: false,
        }
    }
}

impl Rule {
    pub fn in_scale(&self, scale_denominator: f64) -> bool {
        scale_denominator >= self.min_scale_denominator && scale_denominator < self.max_scale_denominator
    }

    pub fn referenced_attrs(&self, out: &mut Vec<String>) {
        self.filter.referenced_attrs(out);
        for sym in &self.symbolizers {
            sym.referenced_attrs(out);
        }
    }
}

/// Gathers the attribute names a style's rules need, so a layer query can
/// request a narrower `PropertyNames::Only` projection (§4.I step 2b, §6).
#[derive(Debug, Default)]
pub struct AttributeCollector {
    names: Vec<String>,
}

impl AttributeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit_rule(&mut self, rule: &Rule) {
        rule.referenced_attrs(&mut self.names);
    }

    /// Deduplicated attribute names collected so far.
    pub fn into_names(mut self) -> Vec<String> {
        self.names.sort();
        self.names.dedup();
        self.names
    }
}
