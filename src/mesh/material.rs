//! Organ surface materials and the MTL writer.

use std::io::Write;

use glam::DVec3;

use crate::record::Record;
use crate::util::Result;

/// Diffuse colour used when a reconstruction carries none.
pub const DEFAULT_DIFFUSE: DVec3 = DVec3::splat(0.8);
/// Ambient colour used when a reconstruction carries none.
pub const DEFAULT_AMBIENT: DVec3 = DVec3::splat(0.2);
/// Ambient colour written to every material library.
pub const LIBRARY_AMBIENT: DVec3 = DVec3::splat(0.1);

/// Surface appearance of one organ.
///
/// Only `diffuse` reaches the library file; the ambient colour read from
/// the document is kept for callers but `Ka` is always [`LIBRARY_AMBIENT`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub diffuse: DVec3,
    pub ambient: DVec3,
    pub specular: DVec3,
    pub opacity: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: DEFAULT_DIFFUSE,
            ambient: DEFAULT_AMBIENT,
            specular: DVec3::ZERO,
            opacity: 1.0,
        }
    }
}

impl Material {
    /// Read the material of a reconstruction record.
    ///
    /// Diffuse and ambient are resolved independently; a slot that is
    /// absent or malformed keeps its default.
    pub fn from_reconstruction(reconstruction: &Record) -> Self {
        let mut material = Self::default();
        if let Some(block) = reconstruction.get("material") {
            if let Some(rgb) = read_rgb(block, "diffuse.rgba") {
                material.diffuse = rgb;
            }
            if let Some(rgb) = read_rgb(block, "ambient.rgba") {
                material.ambient = rgb;
            }
        }
        material
    }
}

/// First three channels of an rgba sequence.
fn read_rgb(block: &Record, path: &str) -> Option<DVec3> {
    let channels = block.get(path)?.float_sequence()?;
    match channels.as_slice() {
        [r, g, b, ..] => Some(DVec3::new(*r, *g, *b)),
        _ => None,
    }
}

fn write_rgb<W: Write>(out: &mut W, key: &str, c: DVec3) -> std::io::Result<()> {
    writeln!(out, "{} {:?} {:?} {:?}", key, c.x, c.y, c.z)
}

/// Write a single-material library defining `{name}_mat`.
pub fn write_mtl<W: Write>(out: &mut W, material: &Material, name: &str) -> Result<()> {
    writeln!(out, "newmtl {}_mat", name)?;
    write_rgb(out, "Kd", material.diffuse)?;
    write_rgb(out, "Ka", LIBRARY_AMBIENT)?;
    write_rgb(out, "Ks", material.specular)?;
    writeln!(out, "d {:?}", material.opacity)?;
    Ok(())
}
