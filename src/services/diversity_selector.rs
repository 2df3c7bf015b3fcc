//! Narrows a raw candidate batch into a short, fresh, quality-ordered list.
//!
//! Candidates are deduplicated, split into four priority tiers by whether the
//! workspace has already seen them for this niche and whether it has saved
//! them, lightly shuffled inside each tier and then concatenated:
//!
//! | tier | seen | saved |
//! |------|------|-------|
//! | 1    | no   | no    |
//! | 2    | yes  | no    |
//! | 3    | no   | yes   |
//! | 4    | yes  | yes   |
//!
//! The shuffle perturbs provider order instead of replacing it, so a
//! candidate the provider ranked first still tends to stay near the front.

use std::collections::{HashSet, VecDeque};

use rand::{rngs::ThreadRng, Rng};
use serde::Serialize;

use crate::domain::Candidate;

const JITTER_SPREAD: f64 = 0.3;

/// Source of uniform noise in `[0, 1)` for the weighted shuffle.
pub trait Jitter {
    fn next_unit(&mut self) -> f64;
}

pub struct ThreadRngJitter(ThreadRng);

impl Default for ThreadRngJitter {
    fn default() -> Self {
        ThreadRngJitter(rand::thread_rng())
    }
}

impl Jitter for ThreadRngJitter {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted. Empty input
/// behaves like a constant 0.5, i.e. no perturbation.
pub struct SequenceJitter {
    values: VecDeque<f64>,
}

impl SequenceJitter {
    pub fn new(values: Vec<f64>) -> Self {
        SequenceJitter {
            values: values.into(),
        }
    }
}

impl Jitter for SequenceJitter {
    fn next_unit(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(value) => {
                self.values.push_back(value);
                value
            }
            None => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    UnseenUnsaved,
    SeenUnsaved,
    UnseenSaved,
    SeenSaved,
}

impl Tier {
    fn classify(is_seen: bool, is_saved: bool) -> Tier {
        match (is_seen, is_saved) {
            (false, false) => Tier::UnseenUnsaved,
            (true, false) => Tier::SeenUnsaved,
            (false, true) => Tier::UnseenSaved,
            (true, true) => Tier::SeenSaved,
        }
    }

    fn is_seen(&self) -> bool {
        matches!(self, Tier::SeenUnsaved | Tier::SeenSaved)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    pub total: usize,
    pub unique: usize,
    pub unseen: usize,
    pub seen: usize,
    pub unsaved: usize,
    pub saved: usize,
    pub selected_unseen: usize,
    pub selected_seen: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub selected: Vec<Candidate>,
    pub stats: SelectionStats,
}

/// Selects with the thread-local RNG as the jitter source.
pub fn select(
    candidates: &[Candidate],
    seen_domains: &HashSet<String>,
    target_count: usize,
    add_randomness: bool,
    saved_domains: &HashSet<String>,
) -> Selection {
    select_with(
        candidates,
        seen_domains,
        target_count,
        add_randomness,
        saved_domains,
        &mut ThreadRngJitter::default(),
    )
}

pub fn select_with(
    candidates: &[Candidate],
    seen_domains: &HashSet<String>,
    target_count: usize,
    add_randomness: bool,
    saved_domains: &HashSet<String>,
    jitter: &mut impl Jitter,
) -> Selection {
    let unique = dedupe_candidates(candidates);

    let mut tiers: [Vec<(Candidate, String)>; 4] = Default::default();
    for (candidate, domain) in unique {
        let tier = Tier::classify(
            seen_domains.contains(&domain),
            saved_domains.contains(&domain),
        );
        tiers[tier as usize].push((candidate, domain));
    }

    let mut stats = SelectionStats {
        total: candidates.len(),
        unique: tiers.iter().map(Vec::len).sum(),
        unseen: tiers[Tier::UnseenUnsaved as usize].len() + tiers[Tier::UnseenSaved as usize].len(),
        seen: tiers[Tier::SeenUnsaved as usize].len() + tiers[Tier::SeenSaved as usize].len(),
        unsaved: tiers[Tier::UnseenUnsaved as usize].len() + tiers[Tier::SeenUnsaved as usize].len(),
        saved: tiers[Tier::UnseenSaved as usize].len() + tiers[Tier::SeenSaved as usize].len(),
        ..Default::default()
    };

    let tier_order = [
        Tier::UnseenUnsaved,
        Tier::SeenUnsaved,
        Tier::UnseenSaved,
        Tier::SeenSaved,
    ];

    let mut selected = Vec::with_capacity(target_count.min(stats.unique));
    for (tier, items) in tier_order.into_iter().zip(tiers) {
        if selected.len() >= target_count {
            break;
        }

        let items = match add_randomness {
            true => weighted_shuffle(items, jitter),
            false => items,
        };

        for (candidate, _) in items.into_iter().take(target_count - selected.len()) {
            match tier.is_seen() {
                true => stats.selected_seen += 1,
                false => stats.selected_unseen += 1,
            }
            selected.push(candidate);
        }
    }

    log::debug!("Diversity selection stats: {:?}", stats);

    Selection { selected, stats }
}

/// Drops any candidate whose domain or normalized name was already taken,
/// scanning in input order. Returns survivors paired with their domain key.
fn dedupe_candidates(candidates: &[Candidate]) -> Vec<(Candidate, String)> {
    let mut seen_domains = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut unique = vec![];

    for candidate in candidates {
        let identity = candidate.identity();

        let domain_taken = !identity.domain.is_empty() && seen_domains.contains(&identity.domain);
        let name_taken = !identity.name.is_empty() && seen_names.contains(&identity.name);
        if domain_taken || name_taken {
            continue;
        }

        if !identity.domain.is_empty() {
            seen_domains.insert(identity.domain.clone());
        }
        if !identity.name.is_empty() {
            seen_names.insert(identity.name);
        }
        unique.push((candidate.clone(), identity.domain));
    }

    unique
}

/// Sorts by `index + centred noise`, where the noise spans `n * 0.3`.
fn weighted_shuffle<T>(items: Vec<T>, jitter: &mut impl Jitter) -> Vec<T> {
    let n = items.len();
    if n <= 1 {
        return items;
    }

    let spread = n as f64 * JITTER_SPREAD;
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (i as f64 + (jitter.next_unit() - 0.5) * spread, item))
        .collect();

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, item)| item).collect()
}
