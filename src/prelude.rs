pub use crate::cache::{CacheEntry, DiskStore, DurableStore, Lookup, TieredCache, CACHE_VERSION};
pub use crate::client::ApiClient;
pub use crate::config::{Config, API_BASE};
pub use crate::error::{Error, Result};
pub use crate::gacha::{draw, ChainSource, EvolutionStage, GachaFilter};
pub use crate::generations::{generation_from_id, ids_for_generations, GENERATION_RANGES};
pub use crate::models::{
    ChainInfo, EvolutionEdge, EvolutionNode, FullPokemonDetails, GenderRatio, PokemonAbility,
    PokemonLite, PokemonPage, PokemonStat, SpriteSet,
};
pub use crate::rolls::{random_nature, roll_ivs, IvSet, Nature, StatKind, MAX_IV, NATURES};
pub use crate::service::DataService;
