//! Integration tests for document loading and record lookup.

mod common;

use common::*;
use serde_json::json;
use vpz_export::record::{load_document, locate, Record, IMAGE_TAG, MODEL_SERIES_TAG};

#[test]
fn test_images_found_through_nested_series() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let study = object(
        "::fwMedData::ImageSeries",
        json!({
            "image": image("root-json/first.raw", "int16", &[2, 2, 2], None),
            "extra": seq(vec![image("root-json/second.raw", "uint8", &[1, 1, 1], None)]),
        }),
    );
    let doc = document(vec![study, model_series(vec![])]);
    let path = write_document(dir.path(), &doc);

    let root = load_document(&path).expect("Failed to load document");
    let buffers: Vec<&str> = locate(&root, IMAGE_TAG)
        .filter_map(|img| img.get("array.buffer").and_then(Record::as_blob))
        .map(|b| b.file_name())
        .collect();
    assert_eq!(buffers, ["first.raw", "second.raw"]);
    assert_eq!(locate(&root, MODEL_SERIES_TAG).count(), 1);
}

#[test]
fn test_malformed_json_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"object\": ").expect("write");
    assert!(matches!(load_document(&path), Err(vpz_export::Error::Json(_))));
}
