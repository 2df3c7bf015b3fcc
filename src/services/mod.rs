pub mod candidate_generator;
pub mod company_analyzer;
pub mod diversity_selector;
pub mod extraction_cache;
pub mod extraction_pipeline;
pub mod history_tracker;
pub mod niche_search;
pub mod openai_client;
pub mod page_scraper;

#[cfg(test)]
pub mod testing;

pub use candidate_generator::*;
pub use company_analyzer::*;
pub use diversity_selector::*;
pub use extraction_cache::*;
pub use extraction_pipeline::*;
pub use history_tracker::*;
pub use niche_search::*;
pub use openai_client::*;
pub use page_scraper::*;
