mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, CacheStore, Collection, Config, EmbeddingProviderConfig, FilterField, FilterFieldKind,
	Providers, Qdrant, Search, Service, Storage,
};

use std::{collections::HashSet, env, fs, net::SocketAddr, path::Path};

pub const ENV_QDRANT_URL: &str = "QDRANT_URL";
pub const ENV_QDRANT_API_KEY: &str = "QDRANT_API_KEY";
pub const ENV_EMBEDDING_API_KEY: &str = "EMBEDDING_API_KEY";

/// Upper bound for `search.max_limit`; tool callers never get more than this many results.
pub const MAX_SEARCH_LIMIT: u32 = 20;
/// Thirty days.
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg, |name| env::var(name).ok());
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Replaces secrets and endpoints with values from the environment when present.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

	if let Some(url) = present(ENV_QDRANT_URL) {
		cfg.storage.qdrant.url = url;
	}
	if let Some(key) = present(ENV_QDRANT_API_KEY) {
		cfg.storage.qdrant.api_key = Some(key);
	}
	if let Some(key) = present(ENV_EMBEDDING_API_KEY) {
		cfg.providers.embedding.api_key = key;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.mcp_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be a valid socket address.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.text_field.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.text_field must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == Some(0) {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if !(1..=MAX_SEARCH_LIMIT).contains(&cfg.search.max_limit) {
		return Err(Error::Validation {
			message: format!("search.max_limit must be between 1 and {MAX_SEARCH_LIMIT}."),
		});
	}
	if !(1..=cfg.search.max_limit).contains(&cfg.search.default_limit) {
		return Err(Error::Validation {
			message: "search.default_limit must be between 1 and search.max_limit.".to_string(),
		});
	}
	if cfg.search.excerpt_max_chars == 0 {
		return Err(Error::Validation {
			message: "search.excerpt_max_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.search.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_filter_values == 0 {
		return Err(Error::Validation {
			message: "search.max_filter_values must be greater than zero.".to_string(),
		});
	}

	let stores = [("cache.embedding", &cfg.cache.embedding), ("cache.search", &cfg.cache.search)];

	for (label, store) in stores {
		if store.capacity == 0 {
			return Err(Error::Validation {
				message: format!("{label}.capacity must be greater than zero."),
			});
		}
		if store.ttl_secs == 0 {
			return Err(Error::Validation {
				message: format!("{label}.ttl_secs must be greater than zero."),
			});
		}
		if store.ttl_secs > MAX_CACHE_TTL_SECS {
			return Err(Error::Validation {
				message: format!("{label}.ttl_secs must be at most {MAX_CACHE_TTL_SECS}."),
			});
		}
	}

	if cfg.collections.is_empty() {
		return Err(Error::Validation {
			message: "collections must contain at least one entry.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for collection in &cfg.collections {
		if collection.id.trim().is_empty() || collection.name.trim().is_empty() {
			return Err(Error::Validation {
				message: "collections.id and collections.name must be non-empty.".to_string(),
			});
		}
		if !seen.insert(collection.id.as_str()) {
			return Err(Error::Validation {
				message: format!("collections.id '{}' is defined more than once.", collection.id),
			});
		}

		for (field, filter) in &collection.filters {
			if filter.key.as_deref().is_some_and(|key| key.trim().is_empty()) {
				return Err(Error::Validation {
					message: format!(
						"collections.{}.filters.{field}.key must be non-empty when set.",
						collection.id
					),
				});
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}
	if cfg
		.storage
		.qdrant
		.dense_vector_name
		.as_deref()
		.map(|name| name.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.storage.qdrant.dense_vector_name = None;
	}

	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim().trim_end_matches('/').to_string();
}
