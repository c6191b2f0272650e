use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::batch;
use crate::cache::{DiskStore, DurableStore, TieredCache};
use crate::client::{
    id_from_url, AbilityResponse, ApiClient, EncounterArea, EvolutionChainResponse,
    GenerationResponse, ListResponse, LocationAreaResponse, MoveResponse, NamedResource,
    PokemonResponse, SpeciesResponse, TypeResponse,
};
use crate::config::Config;
use crate::enrich;
use crate::error::{Error, Result};
use crate::gacha::{self, ChainSource, GachaFilter};
use crate::generations;
use crate::models::{
    ChainInfo, EvolutionEdge, EvolutionNode, FullPokemonDetails, GenderRatio, PokemonAbility,
    PokemonLite, PokemonPage, PokemonStat, SpriteSet,
};

/// Cooperative re-entrancy guard: a second draw while one is running is
/// rejected, not queued.
struct DrawGuard<'a>(&'a AtomicBool);

impl<'a> DrawGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(Error::DrawInFlight);
        }
        Ok(Self(flag))
    }
}

impl Drop for DrawGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Data-access facade over the remote API and the two-tier cache. One
/// instance lives for the application session and is passed to every
/// consumer; there is no ambient singleton.
pub struct DataService {
    client: ApiClient,
    cache: TieredCache,
    config: Config,
    draw_active: AtomicBool,
}

impl DataService {
    pub fn new(config: Config) -> Self {
        let root = config
            .cache_dir
            .clone()
            .unwrap_or_else(DiskStore::default_root);
        let durable = Arc::new(DiskStore::new(root));
        Self::with_store(config, durable)
    }

    pub fn with_store(config: Config, durable: Arc<dyn DurableStore>) -> Self {
        let client = ApiClient::new(config.base_url.clone());
        let cache = TieredCache::new(config.memory_capacity, config.cache_ttl_ms, durable);
        Self {
            client,
            cache,
            config,
            draw_active: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn cached_value(&self, url: &str) -> Result<serde_json::Value> {
        let lookup = self.cache.lookup(url).await;
        if let Some(fresh) = lookup.fresh {
            return Ok(fresh);
        }
        match self.client.get_value(url).await {
            Ok(value) => {
                self.cache.put(url, value.clone()).await;
                Ok(value)
            }
            Err(err) => match lookup.stale {
                Some(stale) => {
                    warn!("serving stale cache for {url}: {err}");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    async fn cached<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.cached_value(url).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                // A cached body that no longer decodes is useless; drop it so
                // the next call refetches.
                self.cache.evict(url).await;
                Err(err.into())
            }
        }
    }

    pub async fn pokemon(&self, key: &str) -> Result<PokemonResponse> {
        self.cached(&self.client.pokemon_url(key)).await
    }

    pub async fn species(&self, key: &str) -> Result<SpeciesResponse> {
        self.cached(&self.client.species_url(key)).await
    }

    pub async fn generation(&self, id: u32) -> Result<GenerationResponse> {
        self.cached(&self.client.generation_url(id)).await
    }

    pub async fn type_resource(&self, name: &str) -> Result<TypeResponse> {
        self.cached(&self.client.type_url(name)).await
    }

    pub async fn ability_resource(&self, key: &str) -> Result<AbilityResponse> {
        self.cached(&self.client.ability_url(key)).await
    }

    pub async fn move_resource(&self, key: &str) -> Result<MoveResponse> {
        self.cached(&self.client.move_url(key)).await
    }

    pub async fn encounters(&self, key: &str) -> Result<Vec<EncounterArea>> {
        self.cached(&self.client.encounters_url(key)).await
    }

    pub async fn evolution_chain(&self, url: &str) -> Result<EvolutionChainResponse> {
        self.cached(url).await
    }

    pub async fn location_area(&self, url: &str) -> Result<LocationAreaResponse> {
        self.cached(url).await
    }

    async fn display_name(&self, pokemon: &PokemonResponse) -> String {
        let fallback = enrich::capitalize_slug(&pokemon.name);
        let species_key = id_from_url(&pokemon.species.url)
            .map(|id| id.to_string())
            .unwrap_or_else(|| pokemon.id.to_string());
        match self.species(&species_key).await {
            Ok(species) => enrich::pick_localized(&species.names, &self.config.languages)
                .map(str::to_string)
                .unwrap_or(fallback),
            Err(err) => {
                debug!("species lookup failed for {}: {err}", pokemon.name);
                fallback
            }
        }
    }

    async fn to_lite(&self, pokemon: PokemonResponse) -> PokemonLite {
        let name = self.display_name(&pokemon).await;
        PokemonLite {
            id: pokemon.id,
            name,
            types: pokemon
                .types
                .iter()
                .map(|slot| slot.type_info.name.clone())
                .collect(),
            bst: enrich::aggregate_stat(&pokemon.stats),
            sprite_url: enrich::select_sprite(&pokemon.sprites, &self.config.placeholder_sprite),
            generation: generations::generation_from_id(pokemon.id),
        }
    }

    pub async fn lite(&self, key: &str) -> Result<PokemonLite> {
        let pokemon = self.pokemon(key).await?;
        Ok(self.to_lite(pokemon).await)
    }

    async fn lite_by_id(&self, id: u32) -> Result<PokemonLite> {
        self.lite(&id.to_string()).await
    }

    /// Materializes many species with bounded concurrency. Failed ids are
    /// omitted, so the result may be shorter than the input.
    pub async fn fetch_many(&self, ids: &[u32]) -> Vec<PokemonLite> {
        batch::fetch_windowed(
            ids,
            self.config.batch_window,
            Duration::from_millis(self.config.batch_delay_ms),
            |id| self.lite_by_id(id),
        )
        .await
    }

    pub async fn pokemon_page(&self, page: u32, per_page: u32) -> Result<PokemonPage> {
        let page = page.max(1);
        let offset = (page - 1) * per_page;
        let list: ListResponse = self
            .cached(&self.client.pokemon_list_url(per_page, offset))
            .await?;
        let ids: Vec<u32> = list
            .results
            .iter()
            .filter_map(|entry| id_from_url(&entry.url))
            .collect();
        let results = self.fetch_many(&ids).await;
        Ok(PokemonPage {
            results,
            count: list.count,
        })
    }

    async fn ids_for_types(&self, types: &[String]) -> Result<HashSet<u32>> {
        let mut matching: Option<HashSet<u32>> = None;
        for name in types {
            let members = self.type_resource(name).await?;
            let ids: HashSet<u32> = members
                .pokemon
                .iter()
                .filter_map(|entry| id_from_url(&entry.pokemon.url))
                .collect();
            matching = Some(match matching {
                Some(accumulated) => accumulated.intersection(&ids).copied().collect(),
                None => ids,
            });
        }
        Ok(matching.unwrap_or_default())
    }

    /// Candidate ids matching the generation and type filters, without
    /// fetching any entity bodies. Capped (ascending id) before sampling so
    /// the cap biases the pool, never the draw.
    pub async fn resolve_candidates(&self, filter: &GachaFilter) -> Result<Vec<u32>> {
        let mut ids = generations::ids_for_generations(&filter.generations);
        if !filter.required_types.is_empty() {
            let matching = self.ids_for_types(&filter.required_types).await?;
            ids.retain(|id| matching.contains(id));
        }
        if ids.len() > self.config.candidate_cap {
            debug!(
                "capping candidate pool at {} of {}",
                self.config.candidate_cap,
                ids.len()
            );
            ids.truncate(self.config.candidate_cap);
        }
        Ok(ids)
    }

    /// Materialized candidates, already narrowed to the aggregate-stat range.
    pub async fn candidate_pool(&self, filter: &GachaFilter) -> Result<Vec<PokemonLite>> {
        let ids = self.resolve_candidates(filter).await?;
        let mut pool = self.fetch_many(&ids).await;
        pool.retain(|entry| filter.stat_matches(entry.bst));
        Ok(pool)
    }

    /// Runs one gacha draw end to end. Fails fast if another draw is still in
    /// flight; a starved draw returns fewer results than requested rather
    /// than an error.
    pub async fn draw(&self, filter: &GachaFilter) -> Result<Vec<PokemonLite>> {
        let _guard = DrawGuard::acquire(&self.draw_active)?;
        let pool = self.candidate_pool(filter).await?;
        Ok(gacha::draw(&pool, filter, self.config.draw_attempt_limit, self).await)
    }

    pub async fn chain_info_for(&self, key: &str) -> Result<Option<ChainInfo>> {
        let species = self.species(key).await?;
        let Some(chain_ref) = &species.evolution_chain else {
            return Ok(None);
        };
        let chain = self.evolution_chain(&chain_ref.url).await?;
        Ok(Some(enrich::flatten_chain(&chain.chain)))
    }

    /// Localized species names along the evolution chain, walk order,
    /// deduplicated.
    pub async fn chain_display_names(&self, key: &str) -> Result<Vec<String>> {
        let species = self.species(key).await?;
        let Some(chain_ref) = &species.evolution_chain else {
            return Ok(Vec::new());
        };
        let chain = self.evolution_chain(&chain_ref.url).await?;
        let mut names = Vec::new();
        for node in enrich::chain_species(&chain.chain) {
            let name = self.species_display_name(&node.species).await;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn species_display_name(&self, species_ref: &NamedResource) -> String {
        match self.species(&species_ref.name).await {
            Ok(species) => enrich::pick_localized(&species.names, &self.config.languages)
                .map(str::to_string)
                .unwrap_or_else(|| enrich::capitalize_slug(&species_ref.name)),
            Err(err) => {
                debug!("species lookup failed for {}: {err}", species_ref.name);
                enrich::capitalize_slug(&species_ref.name)
            }
        }
    }

    pub async fn random_ability(&self, key: &str, include_hidden: bool) -> Result<Option<String>> {
        let pokemon = self.pokemon(key).await?;
        let eligible: Vec<_> = pokemon
            .abilities
            .iter()
            .filter(|slot| include_hidden || !slot.is_hidden)
            .collect();
        if eligible.is_empty() {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..eligible.len());
        Ok(Some(eligible[index].ability.name.clone()))
    }

    pub async fn random_moves(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let pokemon = self.pokemon(key).await?;
        let mut unique: Vec<String> = Vec::new();
        for slot in &pokemon.moves {
            if !unique.contains(&slot.move_info.name) {
                unique.push(slot.move_info.name.clone());
            }
        }
        let target = count.min(unique.len());
        let mut picked = Vec::with_capacity(target);
        let mut used = HashSet::new();
        while picked.len() < target {
            let index = rand::rng().random_range(0..unique.len());
            if used.insert(index) {
                picked.push(unique[index].clone());
            }
        }
        Ok(picked)
    }

    /// Localized ability display name; degrades to the prettified slug and
    /// never propagates a fetch failure.
    pub async fn ability_display_name(&self, key: &str) -> String {
        match self.ability_resource(key).await {
            Ok(resource) => enrich::pick_localized(&resource.names, &self.config.languages)
                .map(str::to_string)
                .unwrap_or_else(|| enrich::prettify_slug(&resource.name)),
            Err(err) => {
                debug!("ability lookup failed for {key}: {err}");
                enrich::prettify_slug(key)
            }
        }
    }

    /// Localized move display name; same degrade contract as abilities.
    pub async fn move_display_name(&self, key: &str) -> String {
        match self.move_resource(key).await {
            Ok(resource) => enrich::pick_localized(&resource.names, &self.config.languages)
                .map(str::to_string)
                .unwrap_or_else(|| enrich::prettify_slug(&resource.name)),
            Err(err) => {
                debug!("move lookup failed for {key}: {err}");
                enrich::prettify_slug(key)
            }
        }
    }

    /// Up to `limit` distinct encounter areas in API order, localized where
    /// the location-area resource provides a matching name variant.
    pub async fn encounter_areas(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let data = self.encounters(key).await?;
        let mut unique: Vec<&NamedResource> = Vec::new();
        let mut seen = HashSet::new();
        for entry in &data {
            if seen.insert(entry.location_area.name.as_str()) {
                unique.push(&entry.location_area);
            }
            if unique.len() >= limit {
                break;
            }
        }

        let mut names = Vec::with_capacity(unique.len());
        for area in unique {
            let name = match self.location_area(&area.url).await {
                Ok(resource) => enrich::pick_localized(&resource.names, &self.config.languages)
                    .map(str::to_string)
                    .unwrap_or_else(|| enrich::prettify_slug(&area.name)),
                Err(err) => {
                    debug!("location area lookup failed for {}: {err}", area.name);
                    enrich::prettify_slug(&area.name)
                }
            };
            names.push(name);
        }
        Ok(names)
    }

    async fn ability_details(&self, pokemon: &PokemonResponse) -> Vec<PokemonAbility> {
        let mut abilities = Vec::with_capacity(pokemon.abilities.len());
        for slot in &pokemon.abilities {
            let slug = slot.ability.name.clone();
            let (name, effect) = match self.ability_resource(&slug).await {
                Ok(resource) => {
                    let name = enrich::pick_localized(&resource.names, &self.config.languages)
                        .map(str::to_string)
                        .unwrap_or_else(|| enrich::prettify_slug(&resource.name));
                    let effect = enrich::pick_flavor(
                        &resource.flavor_text_entries,
                        &self.config.languages,
                    )
                    .map(enrich::sanitize_text)
                    .or_else(|| {
                        resource
                            .effect_entries
                            .iter()
                            .find(|entry| entry.language.name == "en")
                            .map(|entry| enrich::sanitize_text(&entry.short_effect))
                    })
                    .unwrap_or_default();
                    (name, effect)
                }
                Err(err) => {
                    debug!("ability lookup failed for {slug}: {err}");
                    (enrich::prettify_slug(&slug), String::new())
                }
            };
            abilities.push(PokemonAbility {
                slug,
                name,
                hidden: slot.is_hidden,
                effect,
            });
        }
        abilities
    }

    async fn evolution_node(&self, species_ref: &NamedResource) -> Result<EvolutionNode> {
        let pokemon = self.pokemon(&species_ref.name).await?;
        let name = self.display_name(&pokemon).await;
        let sprite_url = enrich::artwork_sprite(&pokemon.sprites, &self.config.placeholder_sprite);
        Ok(EvolutionNode {
            id: pokemon.id,
            name,
            sprite_url,
        })
    }

    async fn evolution_edges(&self, chain_url: &str) -> Result<Vec<EvolutionEdge>> {
        let chain = self.evolution_chain(chain_url).await?;
        let mut edges = Vec::new();
        for (from, to) in enrich::chain_pairs(&chain.chain) {
            let from_node = self.evolution_node(&from.species).await?;
            let to_node = self.evolution_node(&to.species).await?;
            edges.push(EvolutionEdge {
                from: from_node,
                to: to_node,
                trigger: enrich::trigger_label(&to.evolution_details),
            });
        }
        Ok(edges)
    }

    /// Assembles the complete detail-page record for one species.
    pub async fn full_details(&self, key: &str) -> Result<FullPokemonDetails> {
        let pokemon = self.pokemon(key).await?;
        let species_key = id_from_url(&pokemon.species.url)
            .map(|id| id.to_string())
            .unwrap_or_else(|| pokemon.id.to_string());
        let species = self.species(&species_key).await?;

        let display_name = enrich::pick_localized(&species.names, &self.config.languages)
            .map(str::to_string)
            .unwrap_or_else(|| enrich::capitalize_slug(&pokemon.name));
        let flavor_text = enrich::pick_flavor(&species.flavor_text_entries, &self.config.languages)
            .or_else(|| {
                species
                    .flavor_text_entries
                    .iter()
                    .find(|entry| entry.language.name == "en")
                    .map(|entry| entry.flavor_text.as_str())
            })
            .map(|text| enrich::sanitize_text(text))
            .unwrap_or_default();

        let abilities = self.ability_details(&pokemon).await;
        let evolution_chain = match &species.evolution_chain {
            Some(chain_ref) => match self.evolution_edges(&chain_ref.url).await {
                Ok(edges) => edges,
                Err(err) => {
                    debug!("evolution chain unavailable for {}: {err}", pokemon.name);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let gender_ratio = if species.gender_rate < 0 {
            GenderRatio {
                male: 0.0,
                female: 0.0,
                genderless: true,
            }
        } else {
            let female = f32::from(species.gender_rate) * 12.5;
            GenderRatio {
                male: 100.0 - female,
                female,
                genderless: false,
            }
        };

        let placeholder = &self.config.placeholder_sprite;
        Ok(FullPokemonDetails {
            id: pokemon.id,
            name: pokemon.name.clone(),
            display_name,
            sprites: SpriteSet {
                default: enrich::artwork_sprite(&pokemon.sprites, placeholder),
                shiny: enrich::shiny_sprite(&pokemon.sprites, placeholder),
                animated: enrich::animated_sprite(&pokemon.sprites, placeholder),
            },
            types: pokemon
                .types
                .iter()
                .map(|slot| slot.type_info.name.clone())
                .collect(),
            height_m: pokemon.height as f32 / 10.0,
            weight_kg: pokemon.weight as f32 / 10.0,
            stats: pokemon
                .stats
                .iter()
                .map(|slot| PokemonStat {
                    name: slot.stat.name.clone(),
                    value: slot.base_stat,
                })
                .collect(),
            abilities,
            flavor_text,
            generation: generations::generation_from_id(pokemon.id),
            evolution_chain,
            catch_rate: species.capture_rate,
            base_friendship: species.base_happiness.unwrap_or(0),
            gender_ratio,
            egg_groups: species
                .egg_groups
                .iter()
                .map(|group| group.name.clone())
                .collect(),
            growth_rate: species
                .growth_rate
                .as_ref()
                .map(|rate| rate.name.clone())
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ChainSource for DataService {
    async fn chain_info(&self, id: u32) -> ChainInfo {
        match self.chain_info_for(&id.to_string()).await {
            Ok(Some(info)) if !info.chain_ids.is_empty() => info,
            Ok(_) => ChainInfo::solo(id),
            Err(err) => {
                debug!("evolution chain unavailable for {id}: {err}");
                ChainInfo::solo(id)
            }
        }
    }
}
