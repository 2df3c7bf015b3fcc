use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{derive_niche_key, Candidate, NicheKey},
    error::ScoutError,
    services::{select, CandidateGenerator, HistoryStore, HistoryTracker, SelectionStats, TextProvider},
};

#[derive(Debug, Clone, Serialize)]
pub struct NicheSearchResult {
    pub niche_key: NicheKey,
    pub selected: Vec<Candidate>,
    pub stats: SelectionStats,
}

/// One sourcing round for a workspace: generate, select against history,
/// then remember what was shown.
pub struct NicheSearch<'a> {
    provider: &'a dyn TextProvider,
    store: &'a dyn HistoryStore,
}

impl<'a> NicheSearch<'a> {
    pub fn new(provider: &'a dyn TextProvider, store: &'a dyn HistoryStore) -> Self {
        NicheSearch { provider, store }
    }

    pub async fn run(
        &self,
        query: &str,
        workspace_id: Uuid,
        target_count: usize,
        add_randomness: bool,
    ) -> Result<NicheSearchResult, ScoutError> {
        let niche_key = derive_niche_key(query);
        let candidates = CandidateGenerator::new(self.provider).generate(query).await?;

        let tracker = HistoryTracker::new(self.store);
        let (seen, saved) = tokio::join!(
            tracker.get_seen_domains(workspace_id, &niche_key),
            tracker.get_saved_company_domains(workspace_id)
        );

        let selection = select(&candidates, &seen, target_count, add_randomness, &saved);
        log::info!(
            "Niche {} for workspace {}: selected {} of {} candidates ({} unseen)",
            niche_key,
            workspace_id,
            selection.selected.len(),
            selection.stats.total,
            selection.stats.unseen
        );

        tracker
            .record_seen_companies(workspace_id, &niche_key, &selection.selected)
            .await;

        Ok(NicheSearchResult {
            niche_key,
            selected: selection.selected,
            stats: selection.stats,
        })
    }
}
