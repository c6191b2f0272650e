use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiResource {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NameEntry {
    pub name: String,
    pub language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<TypeSlot>,
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
    pub sprites: serde_json::Value,
    pub species: ApiResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub move_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpeciesResponse {
    pub name: String,
    #[serde(default)]
    pub names: Vec<NameEntry>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    pub evolution_chain: Option<ApiResource>,
    #[serde(default)]
    pub capture_rate: u8,
    pub base_happiness: Option<u8>,
    #[serde(default = "genderless_rate")]
    pub gender_rate: i8,
    #[serde(default)]
    pub egg_groups: Vec<NamedResource>,
    pub growth_rate: Option<NamedResource>,
}

fn genderless_rate() -> i8 {
    -1
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenerationResponse {
    pub pokemon_species: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeResponse {
    pub pokemon: Vec<TypeMemberEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeMemberEntry {
    pub pokemon: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EffectEntry {
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub short_effect: String,
    pub language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AbilityResponse {
    pub name: String,
    #[serde(default)]
    pub names: Vec<NameEntry>,
    #[serde(default)]
    pub effect_entries: Vec<EffectEntry>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MoveResponse {
    pub name: String,
    #[serde(default)]
    pub names: Vec<NameEntry>,
    pub power: Option<u32>,
    pub accuracy: Option<u32>,
    pub pp: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EncounterArea {
    pub location_area: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LocationAreaResponse {
    #[serde(default)]
    pub names: Vec<NameEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvolutionChainResponse {
    pub chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetailEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvolutionDetailEntry {
    pub trigger: NamedResource,
    pub min_level: Option<u32>,
    pub item: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ListResponse {
    pub count: u32,
    pub results: Vec<NamedResource>,
}

/// Extracts the trailing numeric id from an API resource URL such as
/// `https://pokeapi.co/api/v2/pokemon-species/25/`.
pub(crate) fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// Issues individual resource fetches against the remote API. Holds no cache
/// and performs no retries; both belong to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into(),
        }
    }

    pub fn pokemon_url(&self, key: &str) -> String {
        format!("{}/pokemon/{key}", self.base)
    }

    pub fn pokemon_list_url(&self, limit: u32, offset: u32) -> String {
        format!("{}/pokemon?limit={limit}&offset={offset}", self.base)
    }

    pub fn species_url(&self, key: &str) -> String {
        format!("{}/pokemon-species/{key}", self.base)
    }

    pub fn generation_url(&self, id: u32) -> String {
        format!("{}/generation/{id}", self.base)
    }

    pub fn type_url(&self, name: &str) -> String {
        format!("{}/type/{name}", self.base)
    }

    pub fn ability_url(&self, key: &str) -> String {
        format!("{}/ability/{key}", self.base)
    }

    pub fn move_url(&self, key: &str) -> String {
        format!("{}/move/{key}", self.base)
    }

    pub fn encounters_url(&self, key: &str) -> String {
        format!("{}/pokemon/{key}/encounters", self.base)
    }

    pub async fn get_value(&self, url: &str) -> Result<serde_json::Value> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_urls_are_byte_identical_for_identical_requests() {
        let client = ApiClient::new("https://pokeapi.co/api/v2");
        assert_eq!(
            client.pokemon_url("25"),
            "https://pokeapi.co/api/v2/pokemon/25"
        );
        assert_eq!(client.pokemon_url("25"), client.pokemon_url("25"));
        assert_eq!(
            client.species_url("pikachu"),
            "https://pokeapi.co/api/v2/pokemon-species/pikachu"
        );
        assert_eq!(
            client.pokemon_list_url(30, 60),
            "https://pokeapi.co/api/v2/pokemon?limit=30&offset=60"
        );
        assert_eq!(
            client.encounters_url("25"),
            "https://pokeapi.co/api/v2/pokemon/25/encounters"
        );
    }

    #[test]
    fn id_from_url_handles_trailing_slash() {
        assert_eq!(
            id_from_url("https://pokeapi.co/api/v2/pokemon-species/25/"),
            Some(25)
        );
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/151"), Some(151));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/ditto/"), None);
    }

    #[test]
    fn pokemon_response_decodes_from_wire_shape() {
        let raw = serde_json::json!({
            "id": 1,
            "name": "bulbasaur",
            "height": 7,
            "weight": 69,
            "types": [{"slot": 1, "type": {"name": "grass", "url": "https://pokeapi.co/api/v2/type/12/"}}],
            "stats": [{"base_stat": 45, "stat": {"name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/"}}],
            "sprites": {"front_default": "https://example/1.png"},
            "species": {"url": "https://pokeapi.co/api/v2/pokemon-species/1/"}
        });

        let parsed: PokemonResponse = serde_json::from_value(raw).expect("decode");
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.types[0].type_info.name, "grass");
        assert_eq!(parsed.stats[0].base_stat, 45);
        assert!(parsed.abilities.is_empty());
    }

    #[test]
    fn chain_link_decodes_nested_children() {
        let raw = serde_json::json!({
            "species": {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon-species/1/"},
            "evolves_to": [{
                "species": {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon-species/2/"},
                "evolution_details": [{"trigger": {"name": "level-up", "url": ""}, "min_level": 16, "item": null}],
                "evolves_to": []
            }]
        });

        let parsed: ChainLink = serde_json::from_value(raw).expect("decode");
        assert_eq!(parsed.species.name, "bulbasaur");
        assert_eq!(parsed.evolves_to[0].evolution_details[0].min_level, Some(16));
    }
}
