//! Core layer - output stream helpers and job dispatch shared by the exporters.

pub mod compression;
pub mod jobs;

pub use compression::{create_gz, gunzip, is_gzip, GzFileWriter};
pub use jobs::run_by_output;
