pub mod components;
pub mod layouts;
pub mod pages;

pub use components::{card, count_list};
pub use layouts::desktop::desktop_layout;
pub use pages::{report_page, ReportVm};
