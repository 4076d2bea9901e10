// src/tests/pipeline_tests/scrape_tests.rs

use std::fs;
use std::panic::{self, AssertUnwindSafe};

use crate::scraper::details::{run_detail_scrape, ScrapeStats};
use crate::scraper::ScraperError;
use crate::store;
use crate::tests::utils::temp_settings;

fn page(price: &str, city: &str) -> String {
    format!(
        r#"<html><body>
             <div class="priceColor">{price}</div>
             <section id="PostViewInformation"><ul>
               <li data-id="singeInfoField_1"><p>City</p><a>{city}</a></li>
             </ul></section>
           </body></html>"#
    )
}

fn links(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://ly.opensooq.com/en/search/{i}")).collect()
}

#[test]
fn failures_are_skipped_and_everything_else_is_saved() {
    let (mut settings, _dir) = temp_settings("scrape_batch");
    settings.start_index = 0;
    settings.checkpoint_every = 2;
    store::append_links(&settings.links_file, &links(5)).unwrap();

    let mut calls = Vec::new();
    let stats = run_detail_scrape(&settings, |url| {
        calls.push(url.to_string());
        if calls.len() == 3 {
            let checkpoint = store::load_records(&settings.records_file).unwrap();
            assert_eq!(checkpoint.len(), 2, "checkpoint written after the second record");
        }
        if url.ends_with("/3") {
            Err(ScraperError::Status {
                url: url.to_string(),
                status: 404,
            })
        } else {
            Ok(page("300,000 LYD", "Tripoli"))
        }
    })
    .unwrap();

    assert_eq!(calls.len(), 5);
    assert_eq!(
        stats,
        ScrapeStats {
            in_file: 5,
            targeted: 5,
            already_scraped: 0,
            scraped: 4,
            failed: 1,
        }
    );

    let saved = store::load_records(&settings.records_file).unwrap();
    assert_eq!(saved.len(), 4);
    assert!(saved.iter().all(|r| !r.url.ends_with("/3")));
    assert_eq!(saved[0].attribute("City"), Some("Tripoli"));
}

#[test]
fn resume_skips_urls_already_in_the_output() {
    let (mut settings, _dir) = temp_settings("scrape_resume");
    settings.start_index = 0;
    store::append_links(&settings.links_file, &links(4)).unwrap();

    run_detail_scrape(&settings, |_| Ok(page("1", "Tripoli"))).unwrap();

    // one more link shows up, plus a repeat of an old one
    store::append_links(
        &settings.links_file,
        &["https://ly.opensooq.com/en/search/9".to_string(), links(1).remove(0)],
    )
    .unwrap();

    let mut fetched = Vec::new();
    let stats = run_detail_scrape(&settings, |url| {
        fetched.push(url.to_string());
        Ok(page("2", "Benghazi"))
    })
    .unwrap();

    assert_eq!(fetched, vec!["https://ly.opensooq.com/en/search/9"]);
    assert_eq!(stats.already_scraped, 5);
    assert_eq!(store::load_records(&settings.records_file).unwrap().len(), 5);
}

#[test]
fn link_slice_is_clamped_to_the_file() {
    let (mut settings, _dir) = temp_settings("scrape_slice");
    settings.start_index = 1;
    settings.end_index = 6200;
    store::append_links(&settings.links_file, &links(3)).unwrap();

    let mut fetched = Vec::new();
    let stats = run_detail_scrape(&settings, |url| {
        fetched.push(url.to_string());
        Ok(page("1", "Tripoli"))
    })
    .unwrap();

    assert_eq!(stats.targeted, 2);
    assert_eq!(fetched.first().map(String::as_str), Some("https://ly.opensooq.com/en/search/1"));
}

#[test]
fn interrupted_run_keeps_checkpointed_progress() {
    let (mut settings, _dir) = temp_settings("scrape_interrupt");
    settings.start_index = 0;
    settings.checkpoint_every = 2;
    store::append_links(&settings.links_file, &links(5)).unwrap();

    let mut calls = 0;
    let interrupted = panic::catch_unwind(AssertUnwindSafe(|| {
        run_detail_scrape(&settings, |_| {
            calls += 1;
            if calls == 4 {
                panic!("interrupted");
            }
            Ok(page("300,000 LYD", "Tripoli"))
        })
    }));
    assert!(interrupted.is_err());

    // the third record was never checkpointed
    let kept = store::load_records(&settings.records_file).unwrap();
    assert_eq!(kept.len(), 2);

    let mut fetched = Vec::new();
    let stats = run_detail_scrape(&settings, |url| {
        fetched.push(url.to_string());
        Ok(page("300,000 LYD", "Tripoli"))
    })
    .unwrap();

    assert_eq!(stats.already_scraped, 2);
    assert_eq!(fetched, links(5)[2..].to_vec());
    assert_eq!(store::load_records(&settings.records_file).unwrap().len(), 5);
}

#[test]
fn corrupt_output_is_set_aside_and_the_scrape_starts_over() {
    let (mut settings, _dir) = temp_settings("scrape_corrupt");
    settings.start_index = 0;
    store::append_links(&settings.links_file, &links(2)).unwrap();
    fs::write(&settings.records_file, "[{\"url\": ").unwrap();

    let stats = run_detail_scrape(&settings, |_| Ok(page("1", "Tripoli"))).unwrap();

    assert_eq!(stats.scraped, 2);
    assert_eq!(store::load_records(&settings.records_file).unwrap().len(), 2);
    let aside = store::corrupt_sibling(&settings.records_file);
    assert_eq!(fs::read_to_string(aside).unwrap(), "[{\"url\": ");
}
