use std::path::PathBuf;

pub const API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub cache_ttl_ms: u64,
    pub memory_capacity: u64,
    pub cache_dir: Option<PathBuf>,
    pub batch_window: usize,
    pub batch_delay_ms: u64,
    pub candidate_cap: usize,
    pub draw_attempt_limit: u32,
    pub languages: Vec<String>,
    pub placeholder_sprite: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            cache_ttl_ms: 5 * 60 * 1000,
            memory_capacity: 4096,
            cache_dir: None,
            batch_window: 20,
            batch_delay_ms: 50,
            candidate_cap: 800,
            draw_attempt_limit: 300,
            languages: vec!["ko".to_string(), "ko-Hrkt".to_string()],
            placeholder_sprite: "/placeholder.svg".to_string(),
        }
    }
}
