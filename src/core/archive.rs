//! Zip packaging of command output files.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
    pub size_bytes: u64,
}

fn zip_error(e: zip::result::ZipError, path: &Path) -> Error {
    Error::internal_io(e.to_string(), Some(format!("write archive {}", path.display())))
}

/// Write `files` into a new zip at `archive_path`, each stored under its
/// bare file name. An existing archive is replaced.
pub fn create_archive(files: &[PathBuf], archive_path: &Path) -> Result<ArchiveSummary> {
    let file = File::create(archive_path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", archive_path.display())))
    })?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "file",
                    "Archive member has no file name",
                    Some(path.display().to_string()),
                )
            })?;

        let content = io::read_bytes(path, "read command output")?;

        zip.start_file(name.clone(), options)
            .map_err(|e| zip_error(e, archive_path))?;
        zip.write_all(&content).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("write archive {}", archive_path.display())))
        })?;

        entries.push(name);
    }

    zip.finish().map_err(|e| zip_error(e, archive_path))?;

    let size_bytes = std::fs::metadata(archive_path)
        .map(|m| m.len())
        .map_err(|e| Error::internal_io(e.to_string(), Some("stat archive".to_string())))?;

    log_status!("archive", "Packed {} file(s) into {}", entries.len(), archive_path.display());

    Ok(ArchiveSummary {
        path: archive_path.to_path_buf(),
        entries,
        size_bytes,
    })
}
