//! Datasource interface (§6, consumed) plus an in-memory implementation for
//! tests and the demo binary. Datasource plugins themselves (GeoJSON,
//! shapefile, PostGIS) are out of scope, per spec.md's "external
//! collaborators" list.

pub mod datasource;
pub mod error;
pub mod memory;
pub mod query;

pub use datasource::{collect_all, Datasource, DatasourceKind, Featureset};
pub use error::DatasourceError;
pub use memory::MemoryDatasource;
pub use query::{PropertyNames, Query};
