pub mod links;
pub mod records;

pub use links::{append_links, read_links};
pub use records::{corrupt_sibling, load_records, load_records_or_empty, save_records};
