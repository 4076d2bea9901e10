pub mod utils;

mod pipeline_tests;
