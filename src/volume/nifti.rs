//! NIfTI-1 single-file (`.nii`) serialisation.
//!
//! Layout: 348-byte header, 4-byte empty extension flag, then samples in
//! Fortran order (first axis fastest), all little-endian.

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::VolumetricImage;
use crate::core::create_gz;
use crate::util::{ElementType, Error, Result};

/// `sizeof_hdr` of a NIfTI-1 header.
pub const HEADER_SIZE: i32 = 348;
/// Offset of the first sample in a single-file image.
pub const VOX_OFFSET: f32 = 352.0;
/// `xyzt_units` value for millimetres.
pub const UNITS_MM: u8 = 2;
/// `qform_code` / `sform_code` for scanner-anatomical coordinates.
pub const XFORM_SCANNER_ANAT: i16 = 1;
/// Single-file magic.
pub const MAGIC: &[u8; 4] = b"n+1\0";

const MAX_RANK: usize = 7;

/// NIfTI `datatype` code and `bitpix` for an element type.
///
/// Half precision has no NIfTI code and is written as float32.
pub const fn datatype_code(ty: ElementType) -> (i16, i16) {
    match ty {
        ElementType::Uint8 => (2, 8),
        ElementType::Int16 => (4, 16),
        ElementType::Int32 => (8, 32),
        ElementType::Float16 | ElementType::Float32 => (16, 32),
        ElementType::Float64 => (64, 64),
        ElementType::Int8 => (256, 8),
        ElementType::Uint16 => (512, 16),
        ElementType::Uint32 => (768, 32),
        ElementType::Int64 => (1024, 64),
        ElementType::Uint64 => (1280, 64),
    }
}

fn write_padded<W: Write>(w: &mut W, text: &[u8], width: usize) -> Result<()> {
    let n = text.len().min(width - 1);
    w.write_all(&text[..n])?;
    w.write_all(&vec![0u8; width - n])?;
    Ok(())
}

fn header_dims(image: &VolumetricImage) -> Result<[i16; 8]> {
    let sizes = image.shape.sizes();
    if sizes.is_empty() || sizes.len() > MAX_RANK {
        return Err(Error::invalid(format!(
            "NIfTI images need 1 to {MAX_RANK} dimensions, got {}",
            sizes.len()
        )));
    }
    let mut dim = [1i16; 8];
    dim[0] = sizes.len() as i16;
    for (slot, &size) in dim[1..].iter_mut().zip(sizes) {
        *slot = i16::try_from(size)
            .map_err(|_| Error::invalid(format!("dimension {size} exceeds the NIfTI-1 limit")))?;
    }
    Ok(dim)
}

/// Write the 348-byte header.
pub fn write_header<W: Write>(w: &mut W, image: &VolumetricImage) -> Result<()> {
    let dim = header_dims(image)?;
    let (datatype, bitpix) = datatype_code(image.element_type());

    w.write_i32::<LittleEndian>(HEADER_SIZE)?;
    w.write_all(&[0u8; 10])?; // data_type
    w.write_all(&[0u8; 18])?; // db_name
    w.write_i32::<LittleEndian>(0)?; // extents
    w.write_i16::<LittleEndian>(0)?; // session_error
    w.write_u8(b'r')?; // regular
    w.write_u8(0)?; // dim_info
    for d in dim {
        w.write_i16::<LittleEndian>(d)?;
    }
    for _ in 0..3 {
        w.write_f32::<LittleEndian>(0.0)?; // intent_p1..3
    }
    w.write_i16::<LittleEndian>(0)?; // intent_code
    w.write_i16::<LittleEndian>(datatype)?;
    w.write_i16::<LittleEndian>(bitpix)?;
    w.write_i16::<LittleEndian>(0)?; // slice_start

    // pixdim[0] is qfac; spatial spacing follows, remaining axes stay at 1.
    let mut pixdim = [1.0f32; 8];
    pixdim[1..4].copy_from_slice(&image.spacing);
    for p in pixdim {
        w.write_f32::<LittleEndian>(p)?;
    }

    w.write_f32::<LittleEndian>(VOX_OFFSET)?;
    w.write_f32::<LittleEndian>(1.0)?; // scl_slope
    w.write_f32::<LittleEndian>(0.0)?; // scl_inter
    w.write_i16::<LittleEndian>(0)?; // slice_end
    w.write_u8(0)?; // slice_code
    w.write_u8(UNITS_MM)?;
    w.write_f32::<LittleEndian>(0.0)?; // cal_max
    w.write_f32::<LittleEndian>(0.0)?; // cal_min
    w.write_f32::<LittleEndian>(0.0)?; // slice_duration
    w.write_f32::<LittleEndian>(0.0)?; // toffset
    w.write_i32::<LittleEndian>(0)?; // glmax
    w.write_i32::<LittleEndian>(0)?; // glmin
    write_padded(w, image.description.as_bytes(), 80)?;
    w.write_all(&[0u8; 24])?; // aux_file

    w.write_i16::<LittleEndian>(XFORM_SCANNER_ANAT)?; // qform_code
    w.write_i16::<LittleEndian>(XFORM_SCANNER_ANAT)?; // sform_code

    // Identity rotation: quaternion (b, c, d) = 0, offsets from the affine.
    let translation = image.affine.w_axis;
    for v in [0.0, 0.0, 0.0, translation.x, translation.y, translation.z] {
        w.write_f32::<LittleEndian>(v as f32)?;
    }
    for row in 0..3 {
        for v in image.affine.row(row).to_array() {
            w.write_f32::<LittleEndian>(v as f32)?;
        }
    }

    w.write_all(&[0u8; 16])?; // intent_name
    w.write_all(MAGIC)?;
    Ok(())
}

/// Write header, extension flag and samples.
pub fn write_nifti<W: Write>(w: &mut W, image: &VolumetricImage) -> Result<()> {
    if image.data.len() != image.shape.num_points() {
        return Err(Error::invalid(format!(
            "{} samples for shape {}",
            image.data.len(),
            image.shape
        )));
    }
    write_header(w, image)?;
    w.write_all(&[0u8; 4])?; // no extensions

    let elem = image.data.element_type().num_bytes();
    let bytes = image.data.as_bytes();
    let mut payload = Vec::with_capacity(bytes.len());
    for index in image.shape.indices_fortran() {
        let start = image.shape.c_offset(&index) * elem;
        payload.extend_from_slice(&bytes[start..start + elem]);
    }
    w.write_all(&payload)?;
    Ok(())
}

/// Write a gzip-compressed `.nii.gz` file.
pub fn save_nifti_gz(path: impl AsRef<Path>, image: &VolumetricImage, level: u32) -> Result<()> {
    let mut encoder = create_gz(path, level)?;
    write_nifti(&mut encoder, image)?;
    encoder.finish()?.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TypedArray;
    use crate::util::Dimensions;
    use byteorder::ReadBytesExt;
    use std::io::{Cursor, Seek, SeekFrom};

    fn image() -> VolumetricImage {
        VolumetricImage::new(
            TypedArray::Int16((0..24).collect()),
            Dimensions::d3(2, 3, 4),
        )
    }

    fn read_i16_at(bytes: &[u8], pos: u64) -> i16 {
        let mut c = Cursor::new(bytes);
        c.seek(SeekFrom::Start(pos)).unwrap();
        c.read_i16::<LittleEndian>().unwrap()
    }

    fn read_f32_at(bytes: &[u8], pos: u64) -> f32 {
        let mut c = Cursor::new(bytes);
        c.seek(SeekFrom::Start(pos)).unwrap();
        c.read_f32::<LittleEndian>().unwrap()
    }

    #[test]
    fn test_header_layout() {
        let mut out = Vec::new();
        write_header(&mut out, &image()).unwrap();

        assert_eq!(out.len(), HEADER_SIZE as usize);
        assert_eq!(&out[344..348], MAGIC);
        assert_eq!(read_i16_at(&out, 40), 3);
        assert_eq!(read_i16_at(&out, 42), 2);
        assert_eq!(read_i16_at(&out, 44), 3);
        assert_eq!(read_i16_at(&out, 46), 4);
        assert_eq!(read_i16_at(&out, 70), 4); // int16
        assert_eq!(read_i16_at(&out, 72), 16);
        assert_eq!(read_f32_at(&out, 80), 1.0); // pixdim[1]
        assert_eq!(read_f32_at(&out, 108), VOX_OFFSET);
        assert_eq!(out[123], UNITS_MM);
        assert_eq!(read_i16_at(&out, 252), XFORM_SCANNER_ANAT);
        assert_eq!(read_i16_at(&out, 254), XFORM_SCANNER_ANAT);
        assert!(out[148..228].starts_with(b"CT scan exported from VPZ"));
        // srow_x = [1, 0, 0, 0], srow_z = [0, 0, 1, 0]
        assert_eq!(read_f32_at(&out, 280), 1.0);
        assert_eq!(read_f32_at(&out, 284), 0.0);
        assert_eq!(read_f32_at(&out, 320), 1.0);
    }

    #[test]
    fn test_data_is_fortran_ordered() {
        let img = VolumetricImage::new(
            TypedArray::Uint8(vec![0, 1, 2, 3, 4, 5]),
            Dimensions::from_slice(&[2, 3]),
        );
        let mut out = Vec::new();
        write_nifti(&mut out, &img).unwrap();

        assert_eq!(out.len(), VOX_OFFSET as usize + 6);
        // C-order [[0,1,2],[3,4,5]] written x-fastest.
        assert_eq!(&out[352..], &[0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_half_written_as_float32() {
        let img = VolumetricImage::new(
            TypedArray::Float16(vec![half::f16::from_f32(2.0)]),
            Dimensions::d3(1, 1, 1),
        );
        let mut out = Vec::new();
        write_nifti(&mut out, &img).unwrap();
        assert_eq!(read_i16_at(&out, 70), 16);
        assert_eq!(read_f32_at(&out, 352), 2.0);
    }

    #[test]
    fn test_rejects_oversized_dimension() {
        let img = VolumetricImage::new(TypedArray::Uint8(Vec::new()), Dimensions::d3(40000, 0, 1));
        let err = write_header(&mut Vec::new(), &img).unwrap_err();
        assert!(matches!(err, Error::InvalidStructure(_)));
    }

    #[test]
    fn test_gz_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ct.nii.gz");
        save_nifti_gz(&path, &image(), 6).unwrap();

        let raw = crate::core::gunzip(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 352 + 24 * 2);
    }
}
