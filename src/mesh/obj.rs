//! Wavefront OBJ writer.
//!
//! Vertex and normal coordinates keep the precision of the source buffer.
//! Face indices are one-based.

use std::io::Write;

use crate::buffer::ResolvedArray;
use crate::util::{Error, Result};

use super::Mesh;

/// Write the `v`/`vn` lines of an xyz array.
fn write_vectors<W: Write>(out: &mut W, key: &str, array: &ResolvedArray) -> Result<()> {
    let stride = array.component_count;
    if stride < 3 {
        return Err(Error::invalid(format!(
            "{}: {} components per {} entry, need 3",
            array.source.display(),
            stride,
            key
        )));
    }
    for tuple in 0..array.tuple_count() {
        let base = tuple * stride;
        out.write_all(key.as_bytes())?;
        for axis in 0..3 {
            out.write_all(b" ")?;
            array.data.write_element(base + axis, out)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write `mesh` as OBJ geometry bound to material `{name}_mat` in `{name}.mtl`.
///
/// Returns the number of faces written.
pub fn write_obj<W: Write>(out: &mut W, mesh: &Mesh, name: &str) -> Result<usize> {
    writeln!(out, "# Export OBJ for {}", name)?;
    writeln!(out, "mtllib {}.mtl", name)?;
    writeln!(out, "usemtl {}_mat", name)?;

    write_vectors(out, "v", &mesh.points)?;
    if let Some(normals) = &mesh.normals {
        write_vectors(out, "vn", normals)?;
    }

    let mut faces = 0;
    for face in mesh.faces() {
        out.write_all(b"f")?;
        for &v in face.vertices {
            write!(out, " {}", v + 1)?;
        }
        out.write_all(b"\n")?;
        faces += 1;
    }
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TypedArray;
    use crate::util::Dimensions;
    use std::path::PathBuf;

    fn xyz(values: Vec<f32>) -> ResolvedArray {
        let n = values.len() / 3;
        ResolvedArray {
            data: TypedArray::Float32(values),
            shape: Dimensions::d1(n),
            component_count: 3,
            source: PathBuf::from("mem.raw"),
        }
    }

    #[test]
    fn test_quad_with_normals() {
        let mesh = Mesh {
            points: xyz(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]),
            normals: Some(xyz(vec![0.0, 0.0, 1.0].repeat(4))),
            connectivity: vec![0, 1, 2, 3],
            cell_offsets: vec![0],
            cell_types: vec![9],
        };
        let mut out = Vec::new();
        assert_eq!(write_obj(&mut out, &mesh, "Liver").unwrap(), 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Export OBJ for Liver");
        assert_eq!(lines[1], "mtllib Liver.mtl");
        assert_eq!(lines[2], "usemtl Liver_mat");
        assert_eq!(lines[4], "v 1.0 0.0 0.0");
        assert_eq!(lines.iter().filter(|l| l.starts_with("vn ")).count(), 4);
        assert_eq!(*lines.last().unwrap(), "f 1 2 3 4");
    }

    #[test]
    fn test_two_component_points_rejected() {
        let mut points = xyz(vec![0.0; 6]);
        points.component_count = 2;
        let mesh = Mesh {
            points,
            normals: None,
            connectivity: Vec::new(),
            cell_offsets: Vec::new(),
            cell_types: Vec::new(),
        };
        let err = write_obj(&mut Vec::new(), &mesh, "x").unwrap_err();
        assert!(matches!(err, Error::InvalidStructure(_)));
    }
}
