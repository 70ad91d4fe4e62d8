//! # VPZ export
//!
//! Converts VPZ scene-graph documents (a JSON tree of typed records that
//! reference raw side-car buffers) into standard interchange files:
//! gzip'd NIfTI-1 volumes for scans and Wavefront OBJ/MTL for organ meshes.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (element types, shapes, errors)
//! - [`record`] - Record model, document parsing and tree walking
//! - [`buffer`] - Side-car buffer descriptors and the strided resolver
//! - [`volume`] - Volume pipeline and NIfTI-1 writer
//! - [`mesh`] - Mesh pipeline, cell topology, OBJ/MTL writers
//! - [`core`] - Compressed output streams
//! - [`options`] - Export configuration
//! - [`cli`] - Shared command-line glue
//!
//! ## Example
//!
//! ```ignore
//! use vpz_export::prelude::*;
//!
//! let stats = export_volumes("scene/root.json", "out", &ExportOptions::default())?;
//! println!("{} volumes written", stats.exported.len());
//! ```

pub mod util;
pub mod record;
pub mod buffer;
pub mod core;
pub mod volume;
pub mod mesh;
pub mod options;
pub mod cli;

// Re-export commonly used types
pub use util::{Dimensions, ElementType, Error, Result};
pub use options::ExportOptions;
pub use volume::export_volumes;
pub use mesh::export_meshes;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Dimensions, ElementType, Error, Result};
    pub use crate::record::{load_document, locate, Record, IMAGE_TAG, MODEL_SERIES_TAG};
    pub use crate::buffer::{resolve, ArrayDescriptor, BufferLocation, ResolvedArray, TypedArray};
    pub use crate::volume::{export_volumes, VolumeExportStats, VolumetricImage};
    pub use crate::mesh::{export_meshes, Material, Mesh, MeshExportStats, OrganReport};
    pub use crate::options::ExportOptions;
}
