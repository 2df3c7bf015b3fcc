use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    domain::{ExtractedCompany, Industry},
    error::ScrapeError,
    services::{CompletionOptions, HistoryStore, PageFetcher, TextProvider},
};

/// Replays canned responses in order and records every prompt it sees.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<anyhow::Result<String>>>,
    pub prompts: Mutex<Vec<(String, CompletionOptions)>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        ScriptedProvider {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn failing(message: &str) -> Self {
        ScriptedProvider {
            responses: Mutex::new(VecDeque::from([Err(anyhow!(message.to_string()))])),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> anyhow::Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), options));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}

/// History store backed by in-memory maps. `unavailable()` fails every call.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    seen: Mutex<HashMap<(Uuid, String), HashSet<String>>>,
    saved: Vec<(Uuid, String)>,
    upserts: Mutex<usize>,
    unavailable: bool,
}

impl InMemoryHistoryStore {
    pub fn unavailable() -> Self {
        InMemoryHistoryStore {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_saved(mut self, workspace_id: Uuid, website: &str) -> Self {
        self.saved.push((workspace_id, website.to_string()));
        self
    }

    pub fn with_seen(self, workspace_id: Uuid, niche_key: &str, domain: &str) -> Self {
        self.seen
            .lock()
            .unwrap()
            .entry((workspace_id, niche_key.to_string()))
            .or_default()
            .insert(domain.to_string());
        self
    }

    pub fn upsert_calls(&self) -> usize {
        *self.upserts.lock().unwrap()
    }

    fn check_available(&self) -> anyhow::Result<()> {
        match self.unavailable {
            true => Err(anyhow!("history store unavailable")),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn seen_domains(&self, workspace_id: Uuid, niche_key: &str) -> anyhow::Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .seen
            .lock()
            .unwrap()
            .get(&(workspace_id, niche_key.to_string()))
            .map(|domains| domains.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn saved_websites(&self, workspace_id: Uuid) -> anyhow::Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .saved
            .iter()
            .filter(|(id, _)| *id == workspace_id)
            .map(|(_, website)| website.clone())
            .collect())
    }

    async fn upsert_seen(
        &self,
        workspace_id: Uuid,
        niche_key: &str,
        domains: &[String],
    ) -> anyhow::Result<()> {
        self.check_available()?;
        *self.upserts.lock().unwrap() += 1;
        self.seen
            .lock()
            .unwrap()
            .entry((workspace_id, niche_key.to_string()))
            .or_default()
            .extend(domains.iter().cloned());
        Ok(())
    }
}

/// Serves page text from a map; unknown URLs fail with `NoText`.
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    fetches: Mutex<usize>,
}

impl StaticPages {
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        *self.fetches.lock().unwrap() += 1;
        self.pages.get(url).cloned().ok_or_else(|| ScrapeError::NoText {
            url: url.to_string(),
        })
    }
}

pub fn sample_company(name: &str, website: &str) -> ExtractedCompany {
    ExtractedCompany {
        name: name.to_string(),
        website: website.to_string(),
        summary: format!("{} sells software", name),
        headquarters: None,
        founded_year: None,
        employee_range: None,
        business_model: None,
        target_customers: None,
        tech_stack: vec![],
        strengths: vec![],
        risks: vec![],
        opportunities: vec![],
        competitors: vec![],
        fit_score: 7.0,
        primary_industry: Industry::Saas,
        secondary_industry: None,
    }
}
