//! File + env configuration: a JSON file supplies the baseline, every
//! field can be overridden by an env var, and a missing/unparseable file
//! silently falls back to defaults rather than failing startup.

use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "KNOWLEDGE_ENGINE_CONFIG";
pub const ENV_NEO4J_URI: &str = "NEO4J_URI";
pub const ENV_NEO4J_USER: &str = "NEO4J_USER";
pub const ENV_NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
pub const ENV_HTTP_BIND: &str = "KNOWLEDGE_ENGINE_BIND";
pub const ENV_SEARCH_CACHE_TTL: &str = "SEARCH_CACHE_TTL_SECS";
pub const ENV_EMBEDDING_CACHE_TTL: &str = "EMBEDDING_CACHE_TTL_SECS";

/// Neo4j connection settings.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct Neo4jConfig {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Neo4jConfig {
    /// JSON field → `NEO4J_URI` env var → `bolt://localhost:7687`.
    pub fn resolve_uri(&self) -> String {
        if let Some(u) = &self.uri {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var(ENV_NEO4J_URI)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "bolt://localhost:7687".to_string())
    }

    /// JSON field → `NEO4J_USER` env var → `neo4j`.
    pub fn resolve_user(&self) -> String {
        if let Some(u) = &self.user {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var(ENV_NEO4J_USER)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "neo4j".to_string())
    }

    /// JSON field → `NEO4J_PASSWORD` env var → empty string.
    ///
    /// Never logged; callers should redact this in any `Debug`/error text.
    pub fn resolve_password(&self) -> String {
        if let Some(p) = &self.password {
            return p.clone();
        }
        std::env::var(ENV_NEO4J_PASSWORD).unwrap_or_default()
    }
}

/// Chunking defaults (mirrors `MultilingualDocumentProcessor.__init__`).
#[derive(Deserialize, Clone, Debug)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub min_chunk_size: Option<usize>,
    pub auto_detect_language: Option<bool>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        ChunkingConfig {
            chunk_size: None,
            chunk_overlap: None,
            min_chunk_size: None,
            auto_detect_language: None,
        }
    }
}

impl ChunkingConfig {
    pub fn resolve_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(512)
    }

    pub fn resolve_chunk_overlap(&self) -> usize {
        self.chunk_overlap.unwrap_or(128)
    }

    pub fn resolve_min_chunk_size(&self) -> usize {
        self.min_chunk_size.unwrap_or(50)
    }

    pub fn resolve_auto_detect_language(&self) -> bool {
        self.auto_detect_language.unwrap_or(true)
    }
}

/// Hybrid-search ranking weights (mirrors `SemanticSearchService.ranking_weights`).
#[derive(Deserialize, Clone, Debug)]
pub struct RankingWeights {
    pub vector_similarity: Option<f32>,
    pub graph_centrality: Option<f32>,
    pub intent_match: Option<f32>,
    pub language_confidence: Option<f32>,
}

impl Default for RankingWeights {
    fn default() -> Self {
        RankingWeights {
            vector_similarity: None,
            graph_centrality: None,
            intent_match: None,
            language_confidence: None,
        }
    }
}

impl RankingWeights {
    pub fn vector(&self) -> f32 {
        self.vector_similarity.unwrap_or(0.40)
    }
    pub fn graph(&self) -> f32 {
        self.graph_centrality.unwrap_or(0.30)
    }
    pub fn intent(&self) -> f32 {
        self.intent_match.unwrap_or(0.20)
    }
    pub fn language(&self) -> f32 {
        self.language_confidence.unwrap_or(0.10)
    }
}

/// Top-level config loaded from `knowledge-engine.json`.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct EngineConfig {
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub ranking_weights: RankingWeights,
    pub embedding_model: Option<String>,
    pub http_bind: Option<String>,
    pub search_cache_ttl_secs: Option<u64>,
    pub embedding_cache_ttl_secs: Option<u64>,
}

impl EngineConfig {
    /// JSON field → `EMBEDDING_MODEL` env var → `minishlab/potion-base-8M`.
    pub fn resolve_embedding_model(&self) -> String {
        if let Some(m) = &self.embedding_model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var(ENV_EMBEDDING_MODEL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "minishlab/potion-base-8M".to_string())
    }

    /// JSON field → `KNOWLEDGE_ENGINE_BIND` env var → `0.0.0.0:8080`.
    pub fn resolve_http_bind(&self) -> String {
        if let Some(b) = &self.http_bind {
            if !b.trim().is_empty() {
                return b.clone();
            }
        }
        std::env::var(ENV_HTTP_BIND)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    /// JSON field → `SEARCH_CACHE_TTL_SECS` env var → 300 (matches the
    /// original's Redis `setex` TTL for cached search results).
    pub fn resolve_search_cache_ttl_secs(&self) -> u64 {
        if let Some(n) = self.search_cache_ttl_secs {
            return n;
        }
        std::env::var(ENV_SEARCH_CACHE_TTL)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300)
    }

    /// JSON field → `EMBEDDING_CACHE_TTL_SECS` env var → 3600 (matches
    /// the original `EmbeddingConfig.cache_ttl` default).
    pub fn resolve_embedding_cache_ttl_secs(&self) -> u64 {
        if let Some(n) = self.embedding_cache_ttl_secs {
            return n;
        }
        std::env::var(ENV_EMBEDDING_CACHE_TTL)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600)
    }
}

/// Load `knowledge-engine.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `KNOWLEDGE_ENGINE_CONFIG` env var path
/// 2. `./knowledge-engine.json`
/// 3. `../knowledge-engine.json`
///
/// Missing file → `EngineConfig::default()` (silent, all env-var
/// fallbacks still apply). Parse error → log a warning and default.
pub fn load_config() -> EngineConfig {
    let mut candidates: Vec<std::path::PathBuf> = vec![
        std::path::PathBuf::from("knowledge-engine.json"),
        std::path::PathBuf::from("../knowledge-engine.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, std::path::PathBuf::from(env_path));
    }

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                return match serde_json::from_str::<EngineConfig>(&contents) {
                    Ok(cfg) => {
                        tracing::info!("knowledge-engine.json loaded from {}", path.display());
                        cfg
                    }
                    Err(e) => {
                        tracing::warn!(
                            "knowledge-engine.json parse error at {}: {} — using defaults",
                            path.display(),
                            e
                        );
                        EngineConfig::default()
                    }
                };
            }
            Err(_) => continue,
        }
    }

    EngineConfig::default()
}
