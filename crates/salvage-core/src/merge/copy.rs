use crate::error::{FileIssue, ReasonCode};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

/// Copy `src` to `dst` keeping its access and modification times, creating
/// parent directories as needed.
///
/// `src` is re-checked right before copying. When `dst` already has the same
/// size and mtime as `src` nothing is written and `Ok(false)` is returned.
pub fn sync_file(src: &Path, dst: &Path) -> Result<bool, FileIssue> {
    let src_meta = source_metadata(src)?;
    let src_mtime = FileTime::from_last_modification_time(&src_meta);

    if let Ok(dst_meta) = fs::metadata(dst) {
        if dst_meta.is_file()
            && dst_meta.len() == src_meta.len()
            && FileTime::from_last_modification_time(&dst_meta) == src_mtime
        {
            trace!("{} already up to date", dst.display());
            return Ok(false);
        }
    }

    copy_preserving_times(src, dst, &src_meta)
        .map_err(|e| FileIssue::new(src, ReasonCode::CopyFailed, e))?;
    Ok(true)
}

fn copy_preserving_times(src: &Path, dst: &Path, src_meta: &fs::Metadata) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(src_meta),
        FileTime::from_last_modification_time(src_meta),
    )
}

/// Metadata of a source about to be copied; a missing file is `Vanished`.
pub fn source_metadata(src: &Path) -> Result<fs::Metadata, FileIssue> {
    match fs::metadata(src) {
        Ok(meta) if meta.is_file() => Ok(meta),
        Ok(_) => Err(FileIssue::new(
            src,
            ReasonCode::Vanished,
            "no longer a regular file",
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FileIssue::new(src, ReasonCode::Vanished, e))
        }
        Err(e) => Err(FileIssue::new(src, ReasonCode::MetadataUnavailable, e)),
    }
}

pub fn modified_time(path: &Path) -> Result<SystemTime, FileIssue> {
    source_metadata(path)?
        .modified()
        .map_err(|e| FileIssue::new(path, ReasonCode::MetadataUnavailable, e))
}
