use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonLite {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub bst: u32,
    pub sprite_url: String,
    pub generation: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonPage {
    pub results: Vec<PokemonLite>,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSet {
    pub default: String,
    pub shiny: String,
    pub animated: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonAbility {
    pub slug: String,
    pub name: String,
    pub hidden: bool,
    pub effect: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenderRatio {
    pub male: f32,
    pub female: f32,
    pub genderless: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
    pub sprite_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    pub from: EvolutionNode,
    pub to: EvolutionNode,
    pub trigger: String,
}

/// Membership summary of one evolution chain: every species id in the chain,
/// the root id, and the ids of the leaf (fully evolved) forms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_ids: Vec<u32>,
    pub base_id: u32,
    pub final_ids: Vec<u32>,
}

impl ChainInfo {
    /// A chain containing only the species itself. Used when the real chain
    /// cannot be resolved; a solo species is both base and final.
    pub fn solo(id: u32) -> Self {
        Self {
            chain_ids: vec![id],
            base_id: id,
            final_ids: vec![id],
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.chain_ids.contains(&id)
    }

    pub fn is_base(&self, id: u32) -> bool {
        self.base_id == id
    }

    pub fn is_final(&self, id: u32) -> bool {
        self.final_ids.contains(&id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FullPokemonDetails {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub sprites: SpriteSet,
    pub types: Vec<String>,
    pub height_m: f32,
    pub weight_kg: f32,
    pub stats: Vec<PokemonStat>,
    pub abilities: Vec<PokemonAbility>,
    pub flavor_text: String,
    pub generation: u32,
    pub evolution_chain: Vec<EvolutionEdge>,
    pub catch_rate: u8,
    pub base_friendship: u8,
    pub gender_ratio: GenderRatio,
    pub egg_groups: Vec<String>,
    pub growth_rate: String,
}
