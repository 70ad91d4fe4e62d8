//! Document and side-car builders shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use vpz_export::record::{IMAGE_TAG, MODEL_SERIES_TAG};

pub fn string(v: &str) -> Value {
    json!({ "string": { "value": v } })
}

pub fn numeric(v: f64) -> Value {
    json!({ "numeric": { "value": v } })
}

pub fn blob(path: &str) -> Value {
    json!({ "blob": { "buffer": path } })
}

pub fn seq(items: Vec<Value>) -> Value {
    let map: Map<String, Value> = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect();
    json!({ "sequence": map })
}

pub fn object(tag: &str, attributes: Value) -> Value {
    json!({ "object": {
        "meta_infos": { "item_0": { "value": tag } },
        "attributes": attributes
    } })
}

fn numbers<T: Into<f64> + Copy>(values: &[T]) -> Value {
    seq(values.iter().map(|v| numeric((*v).into())).collect())
}

/// Image record with its array block.
pub fn image(buffer: &str, ty: &str, size: &[u32], strides: Option<&[u32]>) -> Value {
    let mut array = json!({
        "type": string(ty),
        "size": numbers(size),
        "buffer": blob(buffer),
    });
    if let Some(strides) = strides {
        array["strides"] = numbers(strides);
    }
    object(IMAGE_TAG, json!({ "array": object("::fwData::Array", array) }))
}

/// Mesh array block of `count` tuples.
pub fn mesh_array(buffer: &str, ty: &str, count: u32, components: u32) -> Value {
    object(
        "::fwData::Array",
        json!({
            "type": string(ty),
            "size": numbers(&[count]),
            "nb_of_components": numeric(components.into()),
            "buffer": blob(buffer),
        }),
    )
}

/// Reconstruction whose mesh buffers are named `<prefix>_<array>.raw`.
pub fn organ(name: &str, prefix: &str, points: u32, cells: u32, connectivity: u32) -> Value {
    let path = |array: &str| format!("root-json/{prefix}/{prefix}_{array}.raw");
    object(
        "::fwData::Reconstruction",
        json!({
            "organ_name": string(name),
            "mesh": object("::fwData::Mesh", json!({
                "points": mesh_array(&path("points"), "float", points, 3),
                "cell_data": mesh_array(&path("cells"), "uint64", connectivity, 1),
                "cell_data_offsets": mesh_array(&path("offsets"), "uint64", cells + 1, 1),
                "cell_types": mesh_array(&path("types"), "uint8", cells, 1),
            })),
        }),
    )
}

pub fn model_series(organs: Vec<Value>) -> Value {
    object(MODEL_SERIES_TAG, json!({ "reconstruction_db": seq(organs) }))
}

/// Wrap `children` in a root object the way series sit inside a document.
pub fn document(children: Vec<Value>) -> Value {
    object("::fwMedData::SeriesDB", json!({ "values": seq(children) }))
}

pub fn write_document(dir: &Path, doc: &Value) -> PathBuf {
    let path = dir.join("root.json");
    std::fs::write(&path, serde_json::to_vec_pretty(doc).expect("serialize document"))
        .expect("write document");
    path
}

pub fn write_raw<T: bytemuck::Pod>(path: impl AsRef<Path>, values: &[T]) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create buffer dir");
    }
    std::fs::write(path, bytemuck::cast_slice::<T, u8>(values)).expect("write buffer");
}

/// In-memory log sink for a `tracing-subscriber` fmt layer.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }

    pub fn lines_with(&self, level: &str) -> usize {
        self.text().lines().filter(|l| l.contains(level)).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event at `level` or above written into the returned capture.
pub fn capture_logs<R>(level: tracing::Level, f: impl FnOnce() -> R) -> (R, LogCapture) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(level)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
