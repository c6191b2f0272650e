use std::collections::HashSet;

use crate::client::{id_from_url, ChainLink, EvolutionDetailEntry, FlavorTextEntry, NameEntry, StatSlot};
use crate::models::ChainInfo;

pub fn aggregate_stat(stats: &[StatSlot]) -> u32 {
    stats.iter().map(|slot| slot.base_stat).sum()
}

const ANIMATED_SPRITE: &str = "/versions/generation-v/black-white/animated/front_default";
const ARTWORK_SPRITE: &str = "/other/official-artwork/front_default";
const ARTWORK_SHINY_SPRITE: &str = "/other/official-artwork/front_shiny";
const DEFAULT_SPRITE: &str = "/front_default";
const SHINY_SPRITE: &str = "/front_shiny";

pub fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Single display sprite, by priority: animated variant, official artwork,
/// default static sprite, placeholder.
pub fn select_sprite(sprites: &serde_json::Value, placeholder: &str) -> String {
    pointer_string(sprites, ANIMATED_SPRITE)
        .or_else(|| pointer_string(sprites, ARTWORK_SPRITE))
        .or_else(|| pointer_string(sprites, DEFAULT_SPRITE))
        .unwrap_or_else(|| placeholder.to_string())
}

pub fn artwork_sprite(sprites: &serde_json::Value, placeholder: &str) -> String {
    pointer_string(sprites, ARTWORK_SPRITE)
        .or_else(|| pointer_string(sprites, DEFAULT_SPRITE))
        .unwrap_or_else(|| placeholder.to_string())
}

pub fn shiny_sprite(sprites: &serde_json::Value, placeholder: &str) -> String {
    pointer_string(sprites, ARTWORK_SHINY_SPRITE)
        .or_else(|| pointer_string(sprites, SHINY_SPRITE))
        .unwrap_or_else(|| placeholder.to_string())
}

pub fn animated_sprite(sprites: &serde_json::Value, placeholder: &str) -> String {
    pointer_string(sprites, ANIMATED_SPRITE)
        .or_else(|| pointer_string(sprites, DEFAULT_SPRITE))
        .unwrap_or_else(|| placeholder.to_string())
}

/// First name variant whose language matches the preference list, in
/// preference order.
pub fn pick_localized<'a>(names: &'a [NameEntry], languages: &[String]) -> Option<&'a str> {
    languages.iter().find_map(|language| {
        names
            .iter()
            .find(|entry| &entry.language.name == language)
            .map(|entry| entry.name.as_str())
    })
}

/// First flavor-text entry whose language matches the preference list, in
/// preference order.
pub fn pick_flavor<'a>(entries: &'a [FlavorTextEntry], languages: &[String]) -> Option<&'a str> {
    languages.iter().find_map(|language| {
        entries
            .iter()
            .find(|entry| &entry.language.name == language)
            .map(|entry| entry.flavor_text.as_str())
    })
}

pub fn capitalize_slug(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn prettify_slug(slug: &str) -> String {
    slug.replace('-', " ")
}

pub fn sanitize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\u{000C}', " ")
}

pub fn trigger_label(details: &[EvolutionDetailEntry]) -> String {
    let Some(detail) = details.first() else {
        return "Unknown".to_string();
    };
    match detail.trigger.name.as_str() {
        "level-up" => match detail.min_level {
            Some(level) => format!("Level {level}"),
            None => "Level up".to_string(),
        },
        "trade" => "Trade".to_string(),
        "use-item" => match &detail.item {
            Some(item) => format!("Use {}", prettify_slug(&item.name)),
            None => "Use item".to_string(),
        },
        "shed" => "Shed".to_string(),
        other => capitalize_slug(&prettify_slug(other)),
    }
}

// Pre-order traversal over the chain tree with an explicit stack. Every child
// branch is followed; a species id that reappears ends that branch.
fn walk(root: &ChainLink) -> (Vec<&ChainLink>, Vec<(&ChainLink, &ChainLink)>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let id = id_from_url(&node.species.url).unwrap_or(0);
        if id != 0 && !visited.insert(id) {
            continue;
        }
        nodes.push(node);
        for child in &node.evolves_to {
            let child_id = id_from_url(&child.species.url).unwrap_or(0);
            if child_id == 0 || !visited.contains(&child_id) {
                edges.push((node, child));
            }
        }
        for child in node.evolves_to.iter().rev() {
            stack.push(child);
        }
    }

    (nodes, edges)
}

pub fn chain_species(root: &ChainLink) -> Vec<&ChainLink> {
    walk(root).0
}

/// Every (from, to) evolution step in the chain, parents before children.
pub fn chain_pairs(root: &ChainLink) -> Vec<(&ChainLink, &ChainLink)> {
    walk(root).1
}

pub fn flatten_chain(root: &ChainLink) -> ChainInfo {
    let nodes = chain_species(root);
    let mut chain_ids: Vec<u32> = nodes
        .iter()
        .filter_map(|node| id_from_url(&node.species.url))
        .collect();
    let base_id = chain_ids.first().copied().unwrap_or(0);
    let mut final_ids: Vec<u32> = nodes
        .iter()
        .filter(|node| node.evolves_to.is_empty())
        .filter_map(|node| id_from_url(&node.species.url))
        .collect();
    chain_ids.sort_unstable();
    chain_ids.dedup();
    final_ids.sort_unstable();
    final_ids.dedup();
    ChainInfo {
        chain_ids,
        base_id,
        final_ids,
    }
}
