//! A `Layer`: one datasource plus the styles applied to its features within
//! a scale window (§3, §4.I step 2).

use core_datasource::Datasource;

pub struct Layer {
    pub name: String,
    pub datasource: Box<dyn Datasource>,
    pub style_names: Vec<String>,
    pub min_scale_denominator: f64,
    pub max_scale_denominator: f64,
    /// Whether the collision detector should drop this layer's placements
    /// before the next layer renders (§4.I, mapnik's
    /// `layer::clear_label_cache`).
    pub clear_label_cache: bool,
    pub queryable: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>, datasource: Box<dyn Datasource>) -> Self {
        Self {
            name: name.into(),
            datasource,
            style_names: Vec::new(),
            min_scale_denominator: 0.0,
            max_scale_denominator: f64::MAX,
            clear_label_cache: false,
            queryable: false,
        }
    }

    pub fn with_style(mut self, name: impl Into<String>) -> Self {
        self.style_names.push(name.into());
        self
    }

    pub fn in_scale(&self, scale_denominator: f64) -> bool {
        scale_denominator >= self.min_scale_denominator && scale_denominator < self.max_scale_denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_datasource::MemoryDatasource;

    #[test]
    fn layer_in_scale_respects_its_window() {
        let layer = Layer::new("roads", Box::new(MemoryDatasource::vector())).with_style("roads-style");
        assert!(layer.in_scale(0.0));
        let mut layer = layer;
        layer.min_scale_denominator = 1000.0;
        layer.max_scale_denominator = 50000.0;
        assert!(!layer.in_scale(500.0));
        assert!(layer.in_scale(2000.0));
    }
}
