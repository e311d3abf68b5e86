use std::io::{Cursor, Read};

use thiserror::Error;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::domain::models::icon::{is_svg_name, ExtractedFile};

/// Upper bound for trusting the size an entry header declares.
const MAX_PREALLOCATION: u64 = 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ArchiveError {
    #[error("Invalid ZIP file: {0}")]
    Corrupt(String),

    #[error("ZIP file is empty")]
    Empty,

    #[error("No SVG files found in ZIP")]
    NoSvgFiles,
}

/// Pulls every non-directory `.svg` entry out of an in-memory ZIP.
///
/// Directory structure inside the archive is discarded: `icons/aws/foo.svg`
/// comes back with `name == "foo.svg"`. An entry that fails to decompress is
/// still returned, carrying the read error instead of its bytes.
pub fn extract_svg_files(buffer: &[u8]) -> Result<Vec<ExtractedFile>, ArchiveError> {
    if buffer.is_empty() {
        return Err(ArchiveError::Corrupt("Empty file buffer received".to_string()));
    }

    let mut archive =
        ZipArchive::new(Cursor::new(buffer)).map_err(|e| ArchiveError::Corrupt(e.to_string()))?;

    let mut entry_count = 0usize;
    let mut svg_files = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ArchiveError::Corrupt(format!("entry {}: {}", i, e)))?;

        if entry.is_dir() {
            debug!("Skipping directory: {}", entry.name());
            continue;
        }
        entry_count += 1;

        let path = entry.name().to_string();
        if !is_svg_name(&path) {
            debug!("Skipping non-SVG file: {}", path);
            continue;
        }

        let name = bare_name(&path);
        if name.is_empty() {
            continue;
        }

        let mut buffer = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        let content = match entry.read_to_end(&mut buffer) {
            Ok(_) => Ok(buffer),
            Err(e) => {
                warn!("Cannot read archive entry {}: {}", path, e);
                Err(format!("Failed to extract file: {}", e))
            }
        };

        svg_files.push(ExtractedFile {
            name: name.to_string(),
            path,
            content,
        });
    }

    info!(
        "Archive has {} files, {} of them SVG",
        entry_count,
        svg_files.len()
    );

    if entry_count == 0 {
        return Err(ArchiveError::Empty);
    }
    if svg_files.is_empty() {
        return Err(ArchiveError::NoSvgFiles);
    }

    Ok(svg_files)
}

fn bare_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
