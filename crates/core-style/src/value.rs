//! Per-feature property values (§3 "values that may be either literal or an
//! expression evaluated per feature").
//!
//! The full expression/filter grammar is an external collaborator per
//! spec.md §1 ("expression/filter parsing" is out of scope); what every
//! symbolizer property actually needs is covered by its dominant real-world
//! case — a literal, or a straight attribute lookup with a fallback — so
//! that is what `Property<T>` models instead of embedding a parser.

use core_geom::{Feature, Value};
use core_pixel::Color;

/// Converts a feature attribute `Value` to `T`, used by `Property::Attr`'s
/// fallback path when the attribute is missing or of the wrong kind.
pub trait FromAttrValue: Clone {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromAttrValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromAttrValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromAttrValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromAttrValue for Color {
    fn from_value(value: &Value) -> Option<Self> {
        core_pixel::parse_css_color(value.as_str()?).ok()
    }
}

/// One symbolizer property: a literal, or an attribute lookup with a
/// default used when the feature lacks the attribute or it fails to parse
/// as `T`.
#[derive(Debug, Clone)]
pub enum Property<T> {
    Literal(T),
    Attr { name: String, default: T },
}

impl<T: FromAttrValue> Property<T> {
    pub fn literal(value: T) -> Self {
        Property::Literal(value)
    }

    pub fn attr(name: impl Into<String>, default: T) -> Self {
        Property::Attr { name: name.into(), default }
    }

    pub fn eval(&self, feature: &Feature) -> T {
        match self {
            Property::Literal(v) => v.clone(),
            Property::Attr { name, default } => {
                T::from_value(feature.attr(name)).unwrap_or_else(|| default.clone())
            }
        }
    }

    /// Attribute name this property reads, if any (used by
    /// `AttributeCollector`).
    pub fn referenced_attr(&self) -> Option<&str> {
        match self {
            Property::Literal(_) => None,
            Property::Attr { name, .. } => Some(name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ignores_the_feature() {
        let prop: Property<f64> = Property::literal(3.0);
        let f = Feature::new(1);
        assert_eq!(prop.eval(&f), 3.0);
    }

    #[test]
    fn attr_reads_a_matching_attribute() {
        let prop: Property<f64> = Property::attr("width", 1.0);
        let f = Feature::new(1).with_attr("width", 5.0);
        assert_eq!(prop.eval(&f), 5.0);
    }

    #[test]
    fn attr_falls_back_to_default_when_missing_or_mistyped() {
        let prop: Property<f64> = Property::attr("width", 1.0);
        let missing = Feature::new(1);
        assert_eq!(prop.eval(&missing), 1.0);
        let mistyped = Feature::new(1).with_attr("width", "not a number");
        assert_eq!(prop.eval(&mistyped), 1.0);
    }

    #[test]
    fn color_attr_parses_css_literals() {
        let prop: Property<Color> = Property::attr("fill", Color::rgb(0, 0, 0));
        let f = Feature::new(1).with_attr("fill", "#ff0000");
        assert_eq!(prop.eval(&f), Color::rgb(255, 0, 0));
    }
}
