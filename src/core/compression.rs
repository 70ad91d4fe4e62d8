//! Gzip support for compressed output containers.

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::util::Result;

/// Map a 0-9 level onto a flate2 setting. Out-of-range levels clamp to 9.
pub fn compression_level(level: u32) -> Compression {
    match level {
        0 => Compression::none(),
        1 => Compression::fast(),
        2..=8 => Compression::new(level),
        _ => Compression::best(),
    }
}

/// Gzip stream writing to a freshly created file.
pub type GzFileWriter = GzEncoder<BufWriter<File>>;

/// Create (or truncate) `path` and wrap it in a gzip encoder.
///
/// Call [`GzEncoder::finish`] to write the trailer; dropping the encoder
/// also finishes it but swallows errors.
pub fn create_gz(path: impl AsRef<Path>, level: u32) -> Result<GzFileWriter> {
    let file = File::create(path)?;
    Ok(GzEncoder::new(
        BufWriter::with_capacity(1024 * 1024, file),
        compression_level(level),
    ))
}

/// Decompress a gzip member.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Check for the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
