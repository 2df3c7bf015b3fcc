use serde::Serialize;

use crate::{
    domain::ExtractedCompany,
    error::ScoutError,
    services::{ExtractionCache, ExtractionPipeline, PageFetcher, TextProvider},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAnalysis {
    pub company: ExtractedCompany,
    pub cached: bool,
}

/// Cache-first deep analysis: the provider is only called when the cache has
/// no fresh entry for the company's domain.
pub struct CompanyAnalyzer<'a> {
    cache: &'a ExtractionCache,
    provider: &'a dyn TextProvider,
    fetcher: &'a dyn PageFetcher,
    text_budget: usize,
}

impl<'a> CompanyAnalyzer<'a> {
    pub fn new(
        cache: &'a ExtractionCache,
        provider: &'a dyn TextProvider,
        fetcher: &'a dyn PageFetcher,
        text_budget: usize,
    ) -> Self {
        CompanyAnalyzer {
            cache,
            provider,
            fetcher,
            text_budget,
        }
    }

    /// Analyzes `website`, fetching its text when `text` is `None`.
    pub async fn analyze(
        &self,
        name: &str,
        website: &str,
        text: Option<String>,
    ) -> Result<CompanyAnalysis, ScoutError> {
        if let Some(company) = self.cache.get(website) {
            log::info!("Extraction cache hit for {}", website);
            return Ok(CompanyAnalysis {
                company,
                cached: true,
            });
        }

        let text = match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => self.fetcher.fetch_text(website).await?,
        };

        let company = ExtractionPipeline::new(self.provider)
            .with_text_budget(self.text_budget)
            .extract(name, website, &text)
            .await?;

        self.cache.set(website, company.clone());

        Ok(CompanyAnalysis {
            company,
            cached: false,
        })
    }
}
