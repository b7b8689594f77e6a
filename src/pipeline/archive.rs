// src/pipeline/archive.rs

//! Dated archive of the downloaded artifacts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Archive file name for a given day.
pub fn archive_name(date: NaiveDate) -> String {
    format!("packages_{}.zip", date.format("%Y-%m-%d"))
}

/// Bundle every file under `download_root` into a deflated zip in `archive_dir`.
///
/// Entries are stored relative to the root (`{package}/{version}/{file}`).
/// Returns `None` without writing anything when there are no files.
pub fn create_daily_archive(
    download_root: &Path,
    archive_dir: &Path,
    date: NaiveDate,
) -> Result<Option<PathBuf>> {
    let files = collect_files(download_root)?;
    if files.is_empty() {
        log::info!("No downloaded files to archive");
        return Ok(None);
    }

    std::fs::create_dir_all(archive_dir)?;
    let archive_path = archive_dir.join(archive_name(date));

    let mut writer = ZipWriter::new(BufWriter::new(File::create(&archive_path)?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);
    for (path, entry_name) in &files {
        writer.start_file(entry_name.as_str(), options)?;
        std::io::copy(&mut File::open(path)?, &mut writer)?;
        log::debug!("Archived {}", entry_name);
    }
    writer.finish()?.flush()?;

    let size = std::fs::metadata(&archive_path)?.len();
    log::info!(
        "Archived {} files to {} ({:.2} MB)",
        files.len(),
        archive_path.display(),
        size as f64 / (1024.0 * 1024.0)
    );

    Ok(Some(archive_path))
}

/// Regular files under `root` with their `/`-separated entry names, sorted.
fn collect_files(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((entry.path().to_path_buf(), name));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name(date()), "packages_2025-10-18.zip");
    }

    #[test]
    fn test_archive_contains_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("packages");
        std::fs::create_dir_all(root.join("foo/1.2")).unwrap();
        std::fs::write(root.join("foo/1.2/foo-1.2-win32.whl"), b"wheel").unwrap();
        std::fs::create_dir_all(root.join("bar/0.1")).unwrap();
        std::fs::write(root.join("bar/0.1/bar-0.1.tar.gz"), b"sdist").unwrap();

        let archive = create_daily_archive(&root, &tmp.path().join("archives"), date())
            .unwrap()
            .unwrap();
        assert!(archive.ends_with("archives/packages_2025-10-18.zip"));

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["bar/0.1/bar-0.1.tar.gz", "foo/1.2/foo-1.2-win32.whl"]
        );

        let mut entry = zip.by_name("foo/1.2/foo-1.2-win32.whl").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"wheel");
    }

    #[test]
    fn test_empty_root_skips_archive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("packages");
        std::fs::create_dir_all(root.join("foo/1.0")).unwrap();
        let archives = tmp.path().join("archives");

        assert!(create_daily_archive(&root, &archives, date()).unwrap().is_none());
        assert!(!archives.exists());
    }
}
