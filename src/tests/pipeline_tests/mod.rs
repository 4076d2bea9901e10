mod preprocess_tests;
mod scrape_tests;
mod stage_tests;
