use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{ChainInfo, PokemonLite};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionStage {
    Any,
    BaseOnly,
    FinalOnly,
}

/// Filter for one gacha draw. Immutable for the duration of the draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GachaFilter {
    pub generations: Vec<u32>,
    /// AND semantics: a candidate must carry every listed type.
    pub required_types: Vec<String>,
    /// Inclusive aggregate-stat bounds.
    pub stat_range: (u32, u32),
    pub draw_count: usize,
    pub allow_duplicate_species: bool,
    pub allow_duplicate_lines: bool,
    pub stage: EvolutionStage,
}

impl Default for GachaFilter {
    fn default() -> Self {
        Self {
            generations: vec![1, 2, 3, 4, 5],
            required_types: Vec::new(),
            stat_range: (200, 720),
            draw_count: 6,
            allow_duplicate_species: false,
            allow_duplicate_lines: true,
            stage: EvolutionStage::Any,
        }
    }
}

impl GachaFilter {
    pub fn stat_matches(&self, bst: u32) -> bool {
        bst >= self.stat_range.0 && bst <= self.stat_range.1
    }

    pub fn needs_chain_lookup(&self) -> bool {
        !self.allow_duplicate_lines || self.stage != EvolutionStage::Any
    }
}

/// Resolves the evolution chain a species belongs to. Infallible by contract:
/// implementations degrade to `ChainInfo::solo` when the chain is unknown.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn chain_info(&self, id: u32) -> ChainInfo;
}

/// Rejection-sampling draw over a materialized pool. Each slot retries up to
/// `attempt_limit` times; a slot that exhausts its budget ends the whole draw
/// early, returning the slots filled so far.
pub async fn draw<S: ChainSource>(
    pool: &[PokemonLite],
    filter: &GachaFilter,
    attempt_limit: u32,
    chains: &S,
) -> Vec<PokemonLite> {
    let mut drawn = Vec::new();
    if pool.is_empty() || filter.draw_count == 0 {
        return drawn;
    }

    let mut used_ids: HashSet<u32> = HashSet::new();
    let mut used_line_ids: HashSet<u32> = HashSet::new();
    let mut known_chains: HashMap<u32, ChainInfo> = HashMap::new();

    'slots: for _ in 0..filter.draw_count {
        let mut attempts = 0;
        loop {
            if attempts >= attempt_limit {
                break 'slots;
            }
            attempts += 1;

            let index = rand::rng().random_range(0..pool.len());
            let candidate = &pool[index];

            if !filter.allow_duplicate_species && used_ids.contains(&candidate.id) {
                continue;
            }

            if filter.needs_chain_lookup() {
                if !known_chains.contains_key(&candidate.id) {
                    let info = chains.chain_info(candidate.id).await;
                    known_chains.insert(candidate.id, info);
                }
                let chain = &known_chains[&candidate.id];

                if !filter.allow_duplicate_lines
                    && chain.chain_ids.iter().any(|id| used_line_ids.contains(id))
                {
                    continue;
                }
                match filter.stage {
                    EvolutionStage::BaseOnly if !chain.is_base(candidate.id) => continue,
                    EvolutionStage::FinalOnly if !chain.is_final(candidate.id) => continue,
                    _ => {}
                }
                if !filter.allow_duplicate_lines {
                    used_line_ids.extend(chain.chain_ids.iter().copied());
                    used_line_ids.insert(candidate.id);
                }
            }

            used_ids.insert(candidate.id);
            drawn.push(candidate.clone());
            continue 'slots;
        }
    }

    drawn
}
