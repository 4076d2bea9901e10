// store/links.rs
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::{PipelineError, PipelineResult};

/// One URL per line; blank lines and surrounding whitespace are ignored.
pub fn read_links(path: &Path) -> PipelineResult<Vec<String>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut links = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            links.push(trimmed.to_string());
        }
    }
    Ok(links)
}

/// Appends immediately so a harvest interrupted mid-run keeps every page it
/// already finished.
pub fn append_links(path: &Path, links: &[String]) -> PipelineResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for link in links {
        writeln!(writer, "{link}").map_err(|e| PipelineError::io(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}
