pub mod report;

pub use report::{report_page, ReportVm};
