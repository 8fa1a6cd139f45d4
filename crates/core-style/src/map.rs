//! The `Map`: layers, the style dictionary, the background, and the
//! geographic extent a render targets (§3 top-level aggregate).

use core_geom::BBox;
use core_pixel::Color;

use crate::layer::Layer;
use crate::style::StyleDict;

pub struct Map {
    pub width: u32,
    pub height: u32,
    pub background: Option<Color>,
    pub layers: Vec<Layer>,
    pub styles: StyleDict,
    /// The geographic window the render targets; `core-render` maps this
    /// onto `(width, height)` pixels via the view affine (§4.C.2).
    pub extent: BBox,
    /// Buffer width in pixels added around `extent` so features overlapping
    /// the tile edge still place/clip correctly (§4.I step 1).
    pub buffer_size: u32,
}

impl Map {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            layers: Vec::new(),
            styles: StyleDict::new(),
            extent: BBox { min_x: 0.0, min_y: 0.0, max_x: width as f64, max_y: height as f64 },
            buffer_size: 0,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_extent(mut self, extent: BBox) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Scale denominator at this map's current extent/width, per §4.I's
    /// scale-window gating. Mirrors `core-render::scale_denominator`'s
    /// formula (that crate depends on this one, not the reverse, so the
    /// constant is duplicated rather than shared).
    pub fn scale_denominator(&self) -> f64 {
        let geo_width = self.extent.max_x - self.extent.min_x;
        if self.width == 0 {
            return f64::INFINITY;
        }
        // 0.00028 m/px: the OGC-standard pixel size used to convert a map's
        // ground resolution into a dimensionless scale denominator.
        (geo_width / self.width as f64) / 0.00028
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_datasource::MemoryDatasource;

    #[test]
    fn new_map_defaults_to_extent_matching_its_pixel_size() {
        let map = Map::new(256, 256);
        assert_eq!(map.extent.max_x, 256.0);
        assert!(map.layers.is_empty());
    }

    #[test]
    fn add_layer_appends_to_the_layer_list() {
        let mut map = Map::new(100, 100);
        map.add_layer(Layer::new("l1", Box::new(MemoryDatasource::vector())));
        assert_eq!(map.layers.len(), 1);
    }

    #[test]
    fn scale_denominator_grows_with_wider_extents() {
        let narrow = Map::new(256, 256).with_extent(BBox { min_x: 0.0, min_y: 0.0, max_x: 256.0, max_y: 256.0 });
        let wide = Map::new(256, 256).with_extent(BBox { min_x: 0.0, min_y: 0.0, max_x: 25600.0, max_y: 25600.0 });
        assert!(wide.scale_denominator() > narrow.scale_denominator());
    }
}
