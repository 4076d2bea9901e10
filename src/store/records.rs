// store/records.rs
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::errors::{PipelineError, PipelineResult};
use crate::scraper::models::ListingRecord;

pub fn load_records(path: &Path) -> PipelineResult<Vec<ListingRecord>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PipelineError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// `property_data.json` → `property_data.json.corrupt`.
pub fn corrupt_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Resume helper: an absent output file means "start fresh". An unreadable
/// one is moved to its `.corrupt` sibling first, so the next checkpoint
/// cannot overwrite it.
pub fn load_records_or_empty(path: &Path) -> Vec<ListingRecord> {
    if !path.exists() {
        return Vec::new();
    }
    match load_records(path) {
        Ok(records) => records,
        Err(e) => {
            let aside = corrupt_sibling(path);
            match fs::rename(path, &aside) {
                Ok(()) => warn!(moved_to = %aside.display(), "Ignoring existing results: {e}"),
                Err(err) => warn!(error = %err, "Ignoring existing results: {e}; left in place"),
            }
            Vec::new()
        }
    }
}

/// Pretty-printed JSON array, written to a temp file in the target's directory
/// and persisted over the target. An interrupt never leaves a half-written
/// checkpoint.
pub fn save_records(path: &Path, records: &[ListingRecord]) -> PipelineResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io(parent, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
            PipelineError::InvalidJson {
                path: tmp.path().to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(|e| PipelineError::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_records_keep_attribute_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let mut rec = ListingRecord::new("https://ly.opensooq.com/en/search/1");
        rec.price = Some("450,000 LYD".into());
        rec.attributes.insert("City", "طرابلس");
        rec.attributes.insert("Bedrooms", "3 Bedrooms");

        save_records(&path, &[rec.clone()]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("طرابلس"));
        assert!(raw.find("City").unwrap() < raw.find("Bedrooms").unwrap());

        let back = load_records(&path).unwrap();
        assert_eq!(back, vec![rec]);
        // only the target is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn saving_replaces_the_previous_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        save_records(&path, &[ListingRecord::new("https://a.test/1")]).unwrap();
        let two = [ListingRecord::new("https://a.test/1"), ListingRecord::new("https://a.test/2")];
        save_records(&path, &two).unwrap();
        assert_eq!(load_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn corrupt_file_is_invalid_json_and_resume_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, "[{\"url\": ").unwrap();

        assert!(matches!(load_records(&path), Err(PipelineError::InvalidJson { .. })));
        assert!(load_records_or_empty(&path).is_empty());
    }

    #[test]
    fn corrupt_results_are_moved_aside_before_resuming() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("property_data.json");
        fs::write(&path, "[{\"url\": ").unwrap();

        assert!(load_records_or_empty(&path).is_empty());
        assert!(!path.exists());
        let aside = corrupt_sibling(&path);
        assert_eq!(aside, dir.path().join("property_data.json.corrupt"));
        assert_eq!(fs::read_to_string(&aside).unwrap(), "[{\"url\": ");

        // the next checkpoint leaves the bad file alone
        save_records(&path, &[ListingRecord::new("https://a.test/1")]).unwrap();
        assert_eq!(fs::read_to_string(&aside).unwrap(), "[{\"url\": ");
    }
}
