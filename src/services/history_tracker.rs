use std::collections::HashSet;

use async_trait::async_trait;
use itertools::Itertools;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dal::history_db,
    domain::{normalize_domain, Candidate, NicheKey},
};

/// Persistence for niche-seen rows and saved companies.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn seen_domains(&self, workspace_id: Uuid, niche_key: &str) -> anyhow::Result<Vec<String>>;

    async fn saved_websites(&self, workspace_id: Uuid) -> anyhow::Result<Vec<String>>;

    /// Inserts or refreshes `last_seen_at` for each domain.
    async fn upsert_seen(
        &self,
        workspace_id: Uuid,
        niche_key: &str,
        domains: &[String],
    ) -> anyhow::Result<()>;
}

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        PgHistoryStore { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn seen_domains(&self, workspace_id: Uuid, niche_key: &str) -> anyhow::Result<Vec<String>> {
        Ok(history_db::get_seen_domains(&self.pool, workspace_id, niche_key).await?)
    }

    async fn saved_websites(&self, workspace_id: Uuid) -> anyhow::Result<Vec<String>> {
        Ok(history_db::get_saved_company_websites(&self.pool, workspace_id).await?)
    }

    async fn upsert_seen(
        &self,
        workspace_id: Uuid,
        niche_key: &str,
        domains: &[String],
    ) -> anyhow::Result<()> {
        let rows = history_db::upsert_seen_domains(&self.pool, workspace_id, niche_key, domains).await?;
        log::debug!("Upserted {} niche_seen rows for {}", rows, niche_key);
        Ok(())
    }
}

/// Builds seen/saved domain sets for diversity selection.
///
/// Every store failure is logged and swallowed: an unreachable store yields
/// empty sets, which at worst re-shows companies the workspace already saw.
pub struct HistoryTracker<'a> {
    store: &'a dyn HistoryStore,
}

impl<'a> HistoryTracker<'a> {
    pub fn new(store: &'a dyn HistoryStore) -> Self {
        HistoryTracker { store }
    }

    pub async fn get_seen_domains(&self, workspace_id: Uuid, niche_key: &NicheKey) -> HashSet<String> {
        match self.store.seen_domains(workspace_id, niche_key.as_str()).await {
            Ok(domains) => domains.iter().map(|d| normalize_domain(d)).collect(),
            Err(e) => {
                log::error!(
                    "Failed to load seen domains for workspace {} niche {}: {:?}",
                    workspace_id,
                    niche_key,
                    e
                );
                HashSet::new()
            }
        }
    }

    pub async fn get_saved_company_domains(&self, workspace_id: Uuid) -> HashSet<String> {
        match self.store.saved_websites(workspace_id).await {
            Ok(websites) => websites
                .iter()
                .map(|w| normalize_domain(w))
                .filter(|d| !d.is_empty())
                .collect(),
            Err(e) => {
                log::error!(
                    "Failed to load saved companies for workspace {}: {:?}",
                    workspace_id,
                    e
                );
                HashSet::new()
            }
        }
    }

    pub async fn record_seen_companies(
        &self,
        workspace_id: Uuid,
        niche_key: &NicheKey,
        companies: &[Candidate],
    ) {
        // One upsert statement can't touch the same key twice.
        let domains: Vec<String> = companies
            .iter()
            .map(|c| normalize_domain(&c.website))
            .filter(|d| !d.is_empty())
            .unique()
            .collect();

        if domains.is_empty() {
            return;
        }

        if let Err(e) = self
            .store
            .upsert_seen(workspace_id, niche_key.as_str(), &domains)
            .await
        {
            log::error!(
                "Failed to record {} seen companies for niche {}: {:?}",
                domains.len(),
                niche_key,
                e
            );
        }
    }
}
