use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::state::{EvolutionStage, NamedEntry, PokemonDetail};
use crate::stats::StatVector;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
/// Size of the name index used to expand searches past the loaded pages.
pub const NAME_INDEX_LIMIT: u32 = 1010;
const DETAIL_CONCURRENCY: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Empty(String),
    #[error("request pool closed")]
    Semaphore,
}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PageResponse {
    count: u32,
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeDetailResponse {
    pokemon: Vec<TypePokemonEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypePokemonEntry {
    pokemon: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenerationResponse {
    pokemon_species: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u16,
    weight: u16,
    base_experience: Option<u16>,
    species: NamedResource,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    evolves_to: Vec<ChainLink>,
}

/// One page of the catalog with every detail that could be fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogPage {
    pub count: u32,
    pub pokemon: Vec<PokemonDetail>,
}

static CLIENT: OnceLock<ApiClient> = OnceLock::new();

/// Sets the base URL used by [`client`]. Only the first call has an effect.
pub fn configure(base_url: &str) -> bool {
    CLIENT.set(ApiClient::new(base_url)).is_ok()
}

pub fn client() -> &'static ApiClient {
    CLIENT.get_or_init(|| ApiClient::new(DEFAULT_API_BASE))
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn fetch_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<(u32, Vec<NamedEntry>), ApiError> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        let response: PageResponse = self.get_json(&url).await?;
        Ok((response.count, named_entries(response.results)))
    }

    /// Fetches a page listing and then all of its details concurrently.
    pub async fn fetch_catalog_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<CatalogPage, ApiError> {
        let (count, entries) = self.fetch_page(offset, limit).await?;
        let names: Vec<String> = entries.into_iter().map(|entry| entry.name).collect();
        let pokemon = self.fetch_pokemon_batch(&names).await?;
        Ok(CatalogPage { count, pokemon })
    }

    pub async fn fetch_name_index(&self) -> Result<Vec<NamedEntry>, ApiError> {
        let (_, entries) = self.fetch_page(0, NAME_INDEX_LIMIT).await?;
        Ok(entries)
    }

    pub async fn fetch_pokemon(&self, name: &str) -> Result<PokemonDetail, ApiError> {
        let url = format!("{}/pokemon/{name}", self.base_url);
        let response: PokemonResponse = self.get_json(&url).await?;
        Ok(pokemon_detail(response))
    }

    /// Fetches details with bounded concurrency. Individual failures are
    /// skipped; the batch only fails when nothing could be loaded.
    pub async fn fetch_pokemon_batch(
        &self,
        names: &[String],
    ) -> Result<Vec<PokemonDetail>, ApiError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(DETAIL_CONCURRENCY));
        let mut join_set = JoinSet::new();
        for name in names {
            let name = name.clone();
            let semaphore = semaphore.clone();
            let client = self.clone();
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ApiError::Semaphore)?;
                client.fetch_pokemon(&name).await.map_err(|error| {
                    warn!(%name, %error, "pokemon detail failed");
                    error
                })
            });
        }

        let mut results = Vec::with_capacity(names.len());
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(result) => results.push(result),
                Err(error) => warn!(%error, "detail task aborted"),
            }
        }
        collect_details(results)
    }

    pub async fn fetch_types(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/type?limit=999", self.base_url);
        let response: PageResponse = self.get_json(&url).await?;
        Ok(filter_type_names(response.results))
    }

    pub async fn fetch_generations(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/generation?limit=99", self.base_url);
        let response: PageResponse = self.get_json(&url).await?;
        Ok(response.results.into_iter().map(|entry| entry.name).collect())
    }

    /// Pokemon names that have the given type.
    pub async fn fetch_type_members(&self, name: &str) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/type/{name}", self.base_url);
        let response: TypeDetailResponse = self.get_json(&url).await?;
        Ok(response
            .pokemon
            .into_iter()
            .map(|entry| entry.pokemon.name)
            .collect())
    }

    /// Species names introduced in the given generation.
    pub async fn fetch_generation_members(&self, name: &str) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/generation/{name}", self.base_url);
        let response: GenerationResponse = self.get_json(&url).await?;
        Ok(response
            .pokemon_species
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// Evolution line of a creature, following the first branch at each step.
    pub async fn fetch_evolution_line(&self, name: &str) -> Result<Vec<EvolutionStage>, ApiError> {
        let detail = self.fetch_pokemon(name).await?;
        let url = format!("{}/pokemon-species/{}", self.base_url, detail.species);
        let species: SpeciesResponse = self.get_json(&url).await?;
        let Some(chain) = species.evolution_chain else {
            return Ok(Vec::new());
        };
        let response: EvolutionChainResponse = self.get_json(&chain.url).await?;
        Ok(evolution_line(&response.chain))
    }
}

/// Keeps the details that loaded, ordered by id. Only a batch where every
/// request failed is an error.
fn collect_details(
    results: Vec<Result<PokemonDetail, ApiError>>,
) -> Result<Vec<PokemonDetail>, ApiError> {
    let mut details: Vec<PokemonDetail> = results.into_iter().filter_map(Result::ok).collect();
    if details.is_empty() {
        return Err(ApiError::Empty("no pokemon details could be loaded".to_string()));
    }
    details.sort_by_key(|detail| detail.id);
    Ok(details)
}

/// Trailing numeric path segment of a resource URL.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn named_entries(results: Vec<NamedResource>) -> Vec<NamedEntry> {
    results
        .into_iter()
        .map(|entry| NamedEntry {
            id: id_from_url(&entry.url).unwrap_or(0),
            name: entry.name,
        })
        .collect()
}

fn filter_type_names(results: Vec<NamedResource>) -> Vec<String> {
    let mut types: Vec<String> = results
        .into_iter()
        .map(|entry| entry.name)
        .filter(|name| name != "unknown" && name != "shadow")
        .collect();
    types.sort();
    types
}

fn pokemon_detail(response: PokemonResponse) -> PokemonDetail {
    // missing stats default to zero
    let stats = StatVector::from_named(
        response
            .stats
            .iter()
            .map(|slot| (slot.stat.name.as_str(), slot.base_stat)),
    );
    PokemonDetail {
        id: response.id,
        name: response.name,
        species: response.species.name,
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        stats,
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| slot.ability.name)
            .collect(),
    }
}

fn evolution_line(root: &ChainLink) -> Vec<EvolutionStage> {
    let mut stages = Vec::new();
    let mut current = Some(root);
    while let Some(link) = current {
        stages.push(EvolutionStage {
            id: id_from_url(&link.species.url).unwrap_or(0),
            name: link.species.name.clone(),
        });
        current = link.evolves_to.first();
    }
    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatKind;
    use pretty_assertions::assert_eq;

    const PIKACHU: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "base_experience": 112,
        "species": {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/"},
        "types": [
            {"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}
        ],
        "stats": [
            {"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}},
            {"base_stat": 55, "effort": 0, "stat": {"name": "attack", "url": ""}},
            {"base_stat": 40, "effort": 0, "stat": {"name": "defense", "url": ""}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-attack", "url": ""}},
            {"base_stat": 50, "effort": 0, "stat": {"name": "special-defense", "url": ""}},
            {"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": ""}}
        ],
        "abilities": [
            {"ability": {"name": "static", "url": ""}, "is_hidden": false},
            {"ability": {"name": "lightning-rod", "url": ""}, "is_hidden": true}
        ]
    }"#;

    #[test]
    fn parses_pokemon_detail() {
        let response: PokemonResponse = serde_json::from_str(PIKACHU).unwrap();
        let detail = pokemon_detail(response);
        assert_eq!(detail.id, 25);
        assert_eq!(detail.species, "pikachu");
        assert_eq!(detail.types, vec!["electric".to_string()]);
        assert_eq!(detail.stats, StatVector::new([35, 55, 40, 50, 50, 90]));
        assert_eq!(detail.base_experience, Some(112));
        assert_eq!(detail.abilities.len(), 2);
    }

    #[test]
    fn missing_stats_fill_with_zero() {
        let json = r#"{
            "id": 1, "name": "x", "height": 1, "weight": 1, "base_experience": null,
            "species": {"name": "x", "url": ""},
            "types": [],
            "stats": [{"base_stat": 70, "stat": {"name": "speed", "url": ""}}],
            "abilities": []
        }"#;
        let response: PokemonResponse = serde_json::from_str(json).unwrap();
        let detail = pokemon_detail(response);
        assert_eq!(detail.stats.get(StatKind::Speed), 70);
        assert_eq!(detail.stats.get(StatKind::Hp), 0);
        assert_eq!(detail.base_experience, None);
    }

    #[test]
    fn extracts_ids_from_urls() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/132/"), Some(132));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/7"), Some(7));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/"), None);
    }

    fn fixture_detail(id: u32, name: &str) -> PokemonDetail {
        let response: PokemonResponse = serde_json::from_str(PIKACHU).unwrap();
        PokemonDetail {
            id,
            name: name.to_string(),
            species: name.to_string(),
            ..pokemon_detail(response)
        }
    }

    #[test]
    fn batch_skips_failed_details() {
        let results = vec![
            Ok(fixture_detail(26, "raichu")),
            Err(ApiError::Empty("404".into())),
            Ok(fixture_detail(25, "pikachu")),
        ];
        let details = collect_details(results).unwrap();
        let names: Vec<&str> = details.iter().map(|detail| detail.name.as_str()).collect();
        assert_eq!(names, vec!["pikachu", "raichu"]);
    }

    #[test]
    fn batch_fails_only_when_every_detail_fails() {
        let results = vec![Err(ApiError::Semaphore), Err(ApiError::Empty("404".into()))];
        assert!(matches!(collect_details(results), Err(ApiError::Empty(_))));
    }

    #[test]
    fn drops_unknown_and_shadow_types() {
        let results = ["water", "unknown", "fire", "shadow"]
            .into_iter()
            .map(|name| NamedResource {
                name: name.to_string(),
                url: String::new(),
            })
            .collect();
        assert_eq!(filter_type_names(results), vec!["fire".to_string(), "water".to_string()]);
    }

    #[test]
    fn page_entries_carry_ids() {
        let json = r#"{"count": 1302, "next": null, "previous": null, "results": [
            {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
            {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
        ]}"#;
        let response: PageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.count, 1302);
        let entries = named_entries(response.results);
        assert_eq!(entries[1], NamedEntry { id: 2, name: "ivysaur".into() });
    }

    #[test]
    fn evolution_line_follows_first_branch() {
        let json = r#"{"chain": {
            "species": {"name": "eevee", "url": "https://pokeapi.co/api/v2/pokemon-species/133/"},
            "evolves_to": [
                {
                    "species": {
                        "name": "vaporeon",
                        "url": "https://pokeapi.co/api/v2/pokemon-species/134/"
                    },
                    "evolves_to": []
                },
                {
                    "species": {
                        "name": "jolteon",
                        "url": "https://pokeapi.co/api/v2/pokemon-species/135/"
                    },
                    "evolves_to": []
                }
            ]
        }}"#;
        let response: EvolutionChainResponse = serde_json::from_str(json).unwrap();
        let stages = evolution_line(&response.chain);
        assert_eq!(
            stages,
            vec![
                EvolutionStage { id: 133, name: "eevee".into() },
                EvolutionStage { id: 134, name: "vaporeon".into() },
            ]
        );
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:9000/api/");
        assert_eq!(client.base_url(), "http://localhost:9000/api");
    }
}
