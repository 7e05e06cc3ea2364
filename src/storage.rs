//! Output file naming and GeoJSON persistence.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// File extension for saved layers.
pub const GEOJSON_EXTENSION: &str = "geojson";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^\w\-_. ]").expect("static pattern"))
}

/// Replace every character outside word characters, `-`, `_`, `.` and space
/// with `_`.
pub fn sanitize_filename(name: &str) -> String {
    unsafe_chars().replace_all(name, "_").into_owned()
}

/// Strip the catalog folder prefix from a service name and sanitize the rest.
///
/// `Hosted/Gaza_Checkpoints` with folder `Hosted` becomes `Gaza_Checkpoints`.
pub fn clean_service_name(service_name: &str, folder: Option<&str>) -> String {
    let stripped = folder
        .and_then(|f| service_name.strip_prefix(f))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(service_name);
    sanitize_filename(stripped)
}

/// `{cleanedServiceName}___L{layerId}_{sanitizedLayerName}.geojson`
pub fn layer_filename(
    service_name: &str,
    folder: Option<&str>,
    layer_id: i64,
    layer_name: &str,
) -> String {
    format!(
        "{}___L{}_{}.{}",
        clean_service_name(service_name, folder),
        layer_id,
        sanitize_filename(layer_name),
        GEOJSON_EXTENSION
    )
}

/// Serialize a document and write it under `dir`, all or nothing.
///
/// The document is written to a temporary file in `dir` and renamed into
/// place, so an interrupted write never leaves a truncated file behind.
pub fn write_geojson<T: Serialize>(
    dir: &Path,
    filename: &str,
    document: &T,
) -> Result<PathBuf, StorageError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StorageError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let path = dir.join(filename);
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, document)?;
        writer.flush().map_err(io_err(&path))?;
    }
    tmp.persist(&path)
        .map_err(|e| StorageError::Io {
            path: path.clone(),
            source: e.error,
        })?;

    Ok(path)
}
