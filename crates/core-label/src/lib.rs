//! Label collision detection and placement search (§4.G).
//!
//! `collision` holds the R-tree-backed detector every symbolizer that
//! places labels or shields shares through a mutable reference (the
//! "owned collision-detector value" redesign in spec.md §9, replacing the
//! ancestor's globally-shared pointer). `placement` holds the line, vertex,
//! and interior (pole-of-inaccessibility) search strategies; point
//! placement is `Geometry::representative_point` in core-geom.

pub mod collision;
pub mod placement;

pub use collision::{CollisionDetector, CollisionRecord};
pub use placement::{line_placements, pole_of_inaccessibility, vertex_placements, LinePlacementCandidate};
