use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::DeployError;

/// Zipped function code, staged on disk and held in memory for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArchive {
    pub entry_name: String,
    pub staged_path: PathBuf,
    pub bytes: Vec<u8>,
    pub sha256_hex: String,
}

impl FunctionArchive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Zips `source` under its base name and writes the archive to `staging_path`.
///
/// The staged file is left in place after the run.
pub fn package_source(source: &Path, staging_path: &Path) -> Result<FunctionArchive, DeployError> {
    let entry_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DeployError::archive(source, "source path has no usable file name"))?
        .to_string();

    let contents = fs::read(source)
        .map_err(|error| DeployError::archive(source, format!("failed to read source: {error}")))?;

    let bytes = zip_single_entry(&entry_name, &contents)
        .map_err(|message| DeployError::archive(source, message))?;

    fs::write(staging_path, &bytes).map_err(|error| {
        DeployError::archive(
            staging_path,
            format!("failed to stage archive: {error}"),
        )
    })?;

    Ok(FunctionArchive {
        entry_name,
        staged_path: staging_path.to_path_buf(),
        sha256_hex: sha256_hex(&bytes),
        bytes,
    })
}

fn zip_single_entry(entry_name: &str, contents: &[u8]) -> Result<Vec<u8>, String> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    zip.start_file(entry_name, options)
        .map_err(|error| format!("failed to start '{entry_name}' entry in archive: {error}"))?;
    zip.write_all(contents)
        .map_err(|error| format!("failed to write '{entry_name}' entry: {error}"))?;
    let cursor = zip
        .finish()
        .map_err(|error| format!("failed to finish archive: {error}"))?;
    Ok(cursor.into_inner())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
