use tempfile::TempDir;

use crate::config::Settings;

/// Settings whose every file lives in a fresh temp directory, with no
/// pauses between requests. The directory is removed when the guard drops.
pub fn temp_settings(prefix: &str) -> (Settings, TempDir) {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("create temp dir");
    let root = dir.path();

    let settings = Settings {
        links_file: root.join("links.txt"),
        records_file: root.join("property_data.json"),
        unclean_csv: root.join("unclean_data.csv"),
        processed_csv: root.join("processed_data.csv"),
        cleaned_csv: root.join("cleaned_data.csv"),
        report_html: root.join("index.html"),
        export_xlsx: root.join("cleaned_data.xlsx"),
        page_delay_secs: (0.0, 0.0),
        detail_delay_secs: (0.0, 0.0),
        ..Settings::default()
    };
    (settings, dir)
}
