use std::time::Duration;

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::{configuration::ScraperSettings, error::ScrapeError, services::truncate_to_char_boundary};

const TEXT_SELECTOR: &str = "title, h1, h2, h3, p, li";

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError>;
}

pub struct PageScraper {
    client: Client,
    text_budget: usize,
}

impl PageScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(PageScraper {
            client,
            text_budget: settings.text_budget,
        })
    }
}

#[async_trait]
impl PageFetcher for PageScraper {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let to_error = |e: reqwest::Error| match e.is_timeout() {
            true => ScrapeError::Timeout {
                url: url.to_string(),
            },
            false => ScrapeError::Request {
                url: url.to_string(),
                source: e,
            },
        };

        let response = self.client.get(url).send().await.map_err(to_error)?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await.map_err(to_error)?;
        let text = extract_visible_text(&html);
        log::info!("Fetched {} chars of text from {}", text.len(), url);

        match text.is_empty() {
            true => Err(ScrapeError::NoText {
                url: url.to_string(),
            }),
            false => Ok(truncate_to_char_boundary(&text, self.text_budget).to_string()),
        }
    }
}

/// Text of the title, headings, paragraphs and list items, one element per
/// line with whitespace collapsed.
pub fn extract_visible_text(html: &str) -> String {
    let selector = Selector::parse(TEXT_SELECTOR).unwrap();
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().join(" "))
        .filter(|text| !text.is_empty())
        .join("\n")
}
