//! Mesh export pipeline.
//!
//! The first model series among the document's top-level values lists
//! organ reconstructions. Each one becomes `<name>.obj` plus `<name>.mtl`,
//! with spaces in the organ name replaced by underscores. Mesh buffers are looked up by file name
//! in a flat buffer directory, and a missing one aborts the run.

pub mod cells;
pub mod material;
pub mod obj;

pub use cells::{CellTopology, Face, Faces};
pub use material::Material;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::buffer::{self, ArrayDescriptor, BufferLocation, ResolvedArray};
use crate::core::run_by_output;
use crate::options::ExportOptions;
use crate::record::{self, Record, MODEL_SERIES_TAG};
use crate::util::{Dimensions, ElementType, Error, Result};

/// Surface geometry of one organ.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Vertex positions, three or more components per point.
    pub points: ResolvedArray,
    /// Optional per-point normals.
    pub normals: Option<ResolvedArray>,
    /// Flat point indices of every cell.
    pub connectivity: Vec<i64>,
    /// Start of each cell in `connectivity`.
    pub cell_offsets: Vec<i64>,
    /// Topology code of each cell.
    pub cell_types: Vec<i64>,
}

impl Mesh {
    /// Number of cells declared by the type array.
    pub fn num_cells(&self) -> usize {
        self.cell_types.len()
    }

    /// Cells that decode to an exportable face.
    pub fn faces(&self) -> Faces<'_> {
        Faces::new(&self.connectivity, &self.cell_offsets, &self.cell_types)
    }
}

/// Per-organ result of a mesh export.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganReport {
    /// Organ name as stored in the document.
    pub name: String,
    pub obj_path: PathBuf,
    pub mtl_path: PathBuf,
    pub faces_written: usize,
    /// Cells dropped for an unknown tag or a bad vertex count.
    pub cells_skipped: usize,
}

/// Outcome of a mesh export run.
#[derive(Debug, Default)]
pub struct MeshExportStats {
    /// One report per organ, in document order.
    pub organs: Vec<OrganReport>,
}

impl MeshExportStats {
    /// Faces written across all organs.
    pub fn faces_written(&self) -> usize {
        self.organs.iter().map(|o| o.faces_written).sum()
    }
}

/// File-name-safe form of an organ name.
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Build the descriptor of one mesh array block.
///
/// Unknown or absent element types read as `float32`; only the first
/// `size` entry is used.
pub fn mesh_array_descriptor(array: &Record) -> Result<ArrayDescriptor> {
    let element_type = array
        .get("type")
        .and_then(Record::as_str)
        .and_then(ElementType::from_name)
        .unwrap_or(ElementType::Float32);

    let size = array
        .require("size.0")?
        .as_i64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| Error::invalid("size.0: expected a non-negative integer"))?;

    let components = array
        .get("nb_of_components")
        .and_then(Record::as_i64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(1);

    let blob = buffer::read_blob(array, "buffer")?;
    Ok(ArrayDescriptor::new(element_type, Dimensions::d1(size), blob)
        .with_components(components)
        .with_strides(buffer::read_strides(array, "strides")?))
}

fn load_array(mesh: &Record, name: &str, buffer_dir: &Path) -> Result<ResolvedArray> {
    let desc = mesh_array_descriptor(mesh.require(name)?)?;
    buffer::resolve(&desc, BufferLocation::Basename(buffer_dir))
}

/// Assemble the mesh of a reconstruction's `mesh` record.
pub fn load_mesh(mesh: &Record, buffer_dir: &Path) -> Result<Mesh> {
    let points = load_array(mesh, "points", buffer_dir)?;
    let normals = match mesh.get("point_normals") {
        Some(block) if !block.is_blank() => Some(load_array(mesh, "point_normals", buffer_dir)?),
        _ => None,
    };
    let connectivity = load_array(mesh, "cell_data", buffer_dir)?.data.to_i64_vec();
    let cell_offsets = load_array(mesh, "cell_data_offsets", buffer_dir)?.data.to_i64_vec();
    let cell_types = load_array(mesh, "cell_types", buffer_dir)?.data.to_i64_vec();

    Ok(Mesh { points, normals, connectivity, cell_offsets, cell_types })
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| Error::from_io_at(e, path))?;
    Ok(BufWriter::new(file))
}

fn organ_name(reconstruction: &Record) -> Result<&str> {
    reconstruction
        .require("organ_name")?
        .as_str()
        .ok_or_else(|| Error::invalid("organ_name: expected a string"))
}

/// Path of the geometry file written for `reconstruction`.
fn obj_output(reconstruction: &Record, out_dir: &Path) -> PathBuf {
    let safe = sanitize_name(organ_name(reconstruction).unwrap_or_default());
    out_dir.join(format!("{}.obj", safe))
}

/// The first model series among the document's top-level values.
///
/// Series nested deeper (e.g. inside an activity series) are not candidates.
pub fn find_model_series(root: &Record) -> Option<&Record> {
    root.get("values")
        .and_then(Record::entries)
        .unwrap_or_default()
        .iter()
        .map(|(_, rec)| rec)
        .find(|rec| rec.discriminator() == Some(MODEL_SERIES_TAG))
}

/// Export one reconstruction record.
pub fn export_organ(reconstruction: &Record, buffer_dir: &Path, out_dir: &Path) -> Result<OrganReport> {
    let name = organ_name(reconstruction)?.to_string();
    debug!("Exporting organ {}", name);

    let mesh = load_mesh(reconstruction.require("mesh")?, buffer_dir)?;
    let material = Material::from_reconstruction(reconstruction);
    let safe = sanitize_name(&name);

    let obj_path = out_dir.join(format!("{}.obj", safe));
    let mut out = create(&obj_path)?;
    let faces_written = obj::write_obj(&mut out, &mesh, &safe)?;
    out.flush()?;

    let mtl_path = out_dir.join(format!("{}.mtl", safe));
    let mut out = create(&mtl_path)?;
    material::write_mtl(&mut out, &material, &safe)?;
    out.flush()?;

    let cells_skipped = mesh.num_cells() - faces_written;
    info!("Exported: {}", obj_path.display());

    Ok(OrganReport { name, obj_path, mtl_path, faces_written, cells_skipped })
}

/// Export every organ of the first top-level model series of `root`.
///
/// Organs whose names sanitise to the same file are written one after
/// another in document order.
pub fn export_model_series(
    root: &Record,
    buffer_dir: &Path,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<MeshExportStats> {
    std::fs::create_dir_all(out_dir)?;

    let Some(series) = find_model_series(root) else {
        warn!("No model series found, nothing to export");
        return Ok(MeshExportStats::default());
    };

    let organs: Vec<&Record> = series
        .require("reconstruction_db")?
        .entries()
        .ok_or_else(|| Error::invalid("reconstruction_db: expected a sequence"))?
        .iter()
        .map(|(_, rec)| rec)
        .collect();
    info!("Found {} reconstructions", organs.len());

    let reports = run_by_output(
        &organs,
        |rec| obj_output(rec, out_dir),
        options.parallel,
        |rec| export_organ(rec, buffer_dir, out_dir),
    );

    Ok(MeshExportStats { organs: reports.into_iter().collect::<Result<Vec<_>>>()? })
}

/// Parse `document` and export its organ meshes into `out_dir`.
pub fn export_meshes(
    document: impl AsRef<Path>,
    buffer_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<MeshExportStats> {
    let root = record::load_document(document.as_ref())?;
    export_model_series(&root, buffer_dir.as_ref(), out_dir.as_ref(), options)
}
