//! Archive extraction and flattening into the extension folder.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use super::error::InstallError;

/// Maximum number of entries in an extension archive.
pub const MAX_ARCHIVE_ENTRIES: usize = 10_000;

/// Maximum total uncompressed size of an extension archive.
pub const MAX_EXTRACTED_SIZE: u64 = 512 * 1024 * 1024;

/// Extracts `archive` into `destination`; returns the number of files written.
///
/// Entries whose names would escape `destination` are skipped.
pub fn extract_archive(archive: &Path, destination: &Path) -> Result<usize, InstallError> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;

    if zip.len() > MAX_ARCHIVE_ENTRIES {
        return Err(InstallError::TooManyEntries {
            count: zip.len(),
            limit: MAX_ARCHIVE_ENTRIES,
        });
    }

    fs::create_dir_all(destination)?;

    let mut total_size = 0u64;
    let mut files = 0usize;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;

        let Some(name) = entry.enclosed_name() else {
            debug!(entry = %entry.name(), "Skipping archive entry outside extraction root");
            continue;
        };
        let out_path = destination.join(name);

        total_size += entry.size();
        if total_size > MAX_EXTRACTED_SIZE {
            return Err(InstallError::SizeExceeded {
                limit: MAX_EXTRACTED_SIZE,
            });
        }

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;

        apply_mode(&out_path, entry.unix_mode())?;
    }

    Ok(files)
}

/// Moves the extracted tree into `target`.
///
/// A single top-level directory is unwrapped: its contents move up into
/// `target`. Otherwise every top-level entry moves as-is. Existing entries
/// in `target` with the same name are replaced.
pub fn flatten_into(extracted: &Path, target: &Path) -> Result<usize, InstallError> {
    let top_level = list_dir(extracted)?;
    if top_level.is_empty() {
        return Err(InstallError::EmptyArchive);
    }

    let source_entries = match top_level.as_slice() {
        [only] if only.is_dir() => list_dir(only)?,
        _ => top_level,
    };

    fs::create_dir_all(target)?;
    for entry in &source_entries {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let destination = target.join(name);
        remove_path(&destination)?;
        move_path(entry, &destination)?;
    }

    debug!(
        target = %target.display(),
        entries = source_entries.len(),
        "Archive contents moved into extension folder"
    );
    Ok(source_entries.len())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode((mode & 0o777) | 0o600)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

fn list_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Renames, falling back to copy + delete across filesystems.
fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    copy_recursive(from, to)?;
    remove_path(from)
}

fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}
