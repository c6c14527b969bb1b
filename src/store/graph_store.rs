//! `GraphStore` trait plus a live Neo4j implementation and an in-memory
//! test double.
//!
//! All parameters to [`Neo4rsStore`]'s Cypher go through `neo4rs::query`
//! parameter binding rather than string interpolation, including the
//! `graph_walk` depth and the facets query's distinct-hash counting.

use crate::error::{DependencyKind, EngineError, Result};
use crate::store::model::{Chunk, Document, GraphPath, Intent, ResultType, SearchFacets, SearchResult};
use async_trait::async_trait;
use neo4rs::{query, Graph};
use std::collections::HashMap;
use std::sync::Mutex;

/// Store readiness, mirrors `graph_vector_service.py::health_check`'s
/// status fields.
#[derive(Debug, Clone, Default)]
pub struct StoreHealth {
    pub online: bool,
    pub vector_index_online: bool,
    pub chunk_count: u64,
}

/// A chunk plus its embedding, ready to persist. `intent_name`, when
/// present, drives the `(c)-[:DETAILS]->(:Intent)` link the original
/// creates from `chunk.metadata.intent_name`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChunkRecord {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
    pub intent_name: Option<String>,
}

/// Maximum graph-walk depth the store will accept. Queries for each
/// depth 1..=MAX_WALK_DEPTH are pre-built at call time from a fixed
/// template — the depth bound is never interpolated into Cypher text,
/// which is what caused the original's unused-`$max_depth`-parameter bug
/// (see `DESIGN.md`).
pub const MAX_WALK_DEPTH: usize = 5;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Persist a batch of chunks (and their `Document`/`Intent` links).
    /// Returns the number of chunks actually written.
    async fn store_chunks(&self, records: &[ChunkRecord]) -> Result<usize>;

    /// Approximate-nearest-neighbor vector search. Implementations may
    /// over-fetch internally; callers always get back at most `k`
    /// results, ordered by descending score.
    async fn vector_knn(
        &self,
        embedding: &[f32],
        k: usize,
        language_filter: Option<&str>,
        confidence_threshold: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Fulltext + one-hop graph traversal search.
    async fn graph_search(
        &self,
        keywords: &[String],
        language: Option<&str>,
        intent_filter: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchResult>>;

    async fn get_chunk_by_hash(&self, chunk_hash: &str) -> Result<Option<Chunk>>;

    /// Traverse `DETAILS|LEADS_TO|SIMILAR_TO` edges outward from
    /// `start_id` up to `max_depth` hops. `intent_filter`, when
    /// present, keeps only paths where the start or end node has a
    /// matching `Intent` (any-match, not strict equality — see
    /// `DESIGN.md`'s resolution of the Open Question).
    async fn walk(
        &self,
        start_id: &str,
        max_depth: usize,
        intent_filter: Option<&[String]>,
        limit: usize,
    ) -> Result<Vec<GraphPath>>;

    /// Intent-name and chunk-content suggestions, shortest first.
    async fn suggest(&self, query_text: &str, language: Option<&str>, limit: usize)
        -> Result<Vec<String>>;

    /// Facet counts over chunks matching `query_text`, deduplicated by
    /// `chunk_hash`.
    async fn facets(&self, query_text: &str, language: Option<&str>) -> Result<SearchFacets>;

    /// Store + vector-index readiness (spec §4.5 "health() → {online,
    /// vector_index_online, sizes}").
    async fn health(&self) -> Result<StoreHealth>;
}

/// Live Neo4j-backed store.
pub struct Neo4rsStore {
    graph: Graph,
}

impl Neo4rsStore {
    pub fn new(graph: Graph) -> Self {
        Neo4rsStore { graph }
    }

    /// Raw handle for schema bootstrap (`store::schema::ensure_schema`),
    /// which needs to run before this store is wrapped behind the
    /// `GraphStore` trait object.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
        Ok(Neo4rsStore { graph })
    }

    /// Pre-built parameterized path pattern for `depth` hops. Never
    /// string-interpolated with caller input beyond this fixed,
    /// validated table.
    fn walk_query_for_depth(depth: usize) -> &'static str {
        match depth {
            1 => "MATCH path = (start {id: $start_id})-[:DETAILS|LEADS_TO|SIMILAR_TO*1..1]-(end)",
            2 => "MATCH path = (start {id: $start_id})-[:DETAILS|LEADS_TO|SIMILAR_TO*1..2]-(end)",
            3 => "MATCH path = (start {id: $start_id})-[:DETAILS|LEADS_TO|SIMILAR_TO*1..3]-(end)",
            4 => "MATCH path = (start {id: $start_id})-[:DETAILS|LEADS_TO|SIMILAR_TO*1..4]-(end)",
            _ => "MATCH path = (start {id: $start_id})-[:DETAILS|LEADS_TO|SIMILAR_TO*1..5]-(end)",
        }
    }
}

#[async_trait]
impl GraphStore for Neo4rsStore {
    async fn store_chunks(&self, records: &[ChunkRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let chunks: Vec<neo4rs::BoltMap> = records
            .iter()
            .map(|r| {
                let mut map = neo4rs::BoltMap::new();
                map.put("chunk_hash".into(), r.chunk.chunk_hash.clone().into());
                map.put("content".into(), r.chunk.content.clone().into());
                map.put("language".into(), r.chunk.language.clone().into());
                map.put("source_doc".into(), r.chunk.source_doc.clone().into());
                map.put("position".into(), (r.chunk.position as i64).into());
                map.put("confidence".into(), (r.chunk.confidence as f64).into());
                map.put(
                    "embedding".into(),
                    r.embedding.iter().map(|f| *f as f64).collect::<Vec<_>>().into(),
                );
                map.put("word_count".into(), (r.chunk.word_count as i64).into());
                map.put("sentence_count".into(), (r.chunk.sentence_count as i64).into());
                map.put("created_at".into(), r.chunk.created_at.to_rfc3339().into());
                map.put(
                    "intent_name".into(),
                    r.intent_name.clone().map(Into::into).unwrap_or(neo4rs::BoltType::Null(neo4rs::BoltNull)),
                );
                map
            })
            .collect();

        // Ported verbatim from `_store_chunks_transaction`'s Cypher.
        let cypher = "
            UNWIND $chunks AS chunk

            MERGE (c:ContextChunk {chunk_hash: chunk.chunk_hash})
            SET c.content = chunk.content,
                c.language = chunk.language,
                c.source_doc = chunk.source_doc,
                c.position = chunk.position,
                c.confidence = chunk.confidence,
                c.embedding = chunk.embedding,
                c.word_count = chunk.word_count,
                c.sentence_count = chunk.sentence_count,
                c.created_at = chunk.created_at,
                c.updated_at = datetime()

            WITH c, chunk
            FOREACH (intent_name IN CASE
                WHEN chunk.intent_name IS NOT NULL
                THEN [chunk.intent_name]
                ELSE []
            END |
                MERGE (i:Intent {name: intent_name})
                ON CREATE SET i.created_at = datetime()
                MERGE (c)-[:DETAILS]->(i)
            )

            WITH c, chunk
            MERGE (doc:Document {name: chunk.source_doc})
            ON CREATE SET doc.created_at = datetime()
            MERGE (c)-[:PART_OF]->(doc)

            RETURN c.chunk_hash
        ";

        let mut result = self
            .graph
            .execute(query(cypher).param("chunks", chunks))
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut count = 0usize;
        while result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
            .is_some()
        {
            count += 1;
        }
        Ok(count)
    }

    async fn vector_knn(
        &self,
        embedding: &[f32],
        k: usize,
        language_filter: Option<&str>,
        confidence_threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        // Over-fetch 2k and bind the outer LIMIT to the same over-fetched
        // value, then truncate client-side — replicating the original's
        // double-truncation mechanic exactly (see DESIGN.md).
        let over_fetch = (k * 2).max(1);
        let embedding_f64: Vec<f64> = embedding.iter().map(|f| *f as f64).collect();

        let cypher = "
            CALL db.index.vector.queryNodes('chunk_embedding_idx', $k, $query_embedding)
            YIELD node, score

            WHERE score >= $confidence_threshold
              AND ($language_filter IS NULL OR node.language = $language_filter)

            OPTIONAL MATCH (node)-[:DETAILS]->(intent:Intent)

            RETURN
                node.content as content,
                node.language as language,
                node.chunk_hash as chunk_hash,
                node.source_doc as source_doc,
                intent.name as intent_name,
                score
            ORDER BY score DESC
            LIMIT $k
        ";

        let mut result = self
            .graph
            .execute(
                query(cypher)
                    .param("k", over_fetch as i64)
                    .param("query_embedding", embedding_f64)
                    .param("language_filter", language_filter.map(|s| s.to_string()))
                    .param("confidence_threshold", confidence_threshold as f64),
            )
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            results.push(row_to_vector_result(&row)?);
        }
        results.truncate(k);
        Ok(results)
    }

    async fn graph_search(
        &self,
        keywords: &[String],
        language: Option<&str>,
        intent_filter: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if keywords.is_empty() {
            return Ok(vec![]);
        }
        let fulltext_query = keywords.join(" OR ");

        // Ported verbatim from `_graph_search`'s Cypher.
        let cypher = "
            CALL db.index.fulltext.queryNodes('chunk_content_idx', $query)
            YIELD node, score
            WHERE node:ContextChunk
            AND ($language IS NULL OR node.language = $language)

            OPTIONAL MATCH (node)-[:DETAILS]->(intent:Intent)
            WHERE ($intent_filter IS NULL OR intent.name = $intent_filter)

            OPTIONAL MATCH (intent)-[:LEADS_TO]->(next_intent:Intent)-[:DETAILS]<-(related:ContextChunk)

            WITH node, score, intent, related,
                 CASE WHEN related IS NOT NULL THEN score * 0.8 ELSE score END as graph_score

            RETURN DISTINCT
                COALESCE(related, node) as result_node,
                graph_score,
                intent.name as intent_name,
                CASE WHEN related IS NOT NULL THEN 2 ELSE 1 END as graph_distance
            ORDER BY graph_score DESC
            LIMIT $k
        ";

        let mut result = self
            .graph
            .execute(
                query(cypher)
                    .param("query", fulltext_query)
                    .param("language", language.map(|s| s.to_string()))
                    .param("intent_filter", intent_filter.map(|s| s.to_string()))
                    .param("k", k as i64),
            )
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            results.push(row_to_graph_result(&row)?);
        }
        Ok(results)
    }

    async fn get_chunk_by_hash(&self, chunk_hash: &str) -> Result<Option<Chunk>> {
        let cypher = "
            MATCH (c:ContextChunk {chunk_hash: $chunk_hash})
            RETURN c.chunk_hash as chunk_hash, c.content as content, c.language as language,
                   c.source_doc as source_doc, c.position as position, c.confidence as confidence,
                   c.word_count as word_count, c.sentence_count as sentence_count,
                   c.created_at as created_at, c.updated_at as updated_at,
                   c.embedding as embedding
        ";
        let mut result = self
            .graph
            .execute(query(cypher).param("chunk_hash", chunk_hash))
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        if let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            Ok(Some(row_to_chunk(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn walk(
        &self,
        start_id: &str,
        max_depth: usize,
        intent_filter: Option<&[String]>,
        limit: usize,
    ) -> Result<Vec<GraphPath>> {
        let depth = max_depth.clamp(1, MAX_WALK_DEPTH);
        let path_clause = Self::walk_query_for_depth(depth);

        let cypher = format!(
            "{}
            WHERE $intent_filter IS NULL OR ANY(intent IN $intent_filter WHERE
                (start)-[:DETAILS]->(:Intent {{name: intent}}) OR
                (end)-[:DETAILS]->(:Intent {{name: intent}}))
            WITH path,
                 reduce(confidence = 1.0, rel in relationships(path) | confidence * coalesce(rel.confidence, 0.8)) as confidence
            RETURN
                start_id, [n in nodes(path) | n.chunk_hash] as path_nodes,
                [r in relationships(path) | type(r)] as relationships,
                length(path) as path_length,
                confidence
            ORDER BY confidence DESC, path_length ASC
            LIMIT $limit",
            path_clause
        );

        let mut result = self
            .graph
            .execute(
                query(&cypher)
                    .param("start_id", start_id)
                    .param("intent_filter", intent_filter.map(|v| v.to_vec()))
                    .param("limit", limit as i64),
            )
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut paths = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            paths.push(row_to_graph_path(&row, start_id)?);
        }
        Ok(paths)
    }

    async fn suggest(
        &self,
        query_text: &str,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>> {
        // Ported verbatim from `get_search_suggestions`'s Cypher.
        let cypher = "
            MATCH (i:Intent)
            WHERE ($language IS NULL OR i.lang = $language)
            AND (i.name CONTAINS $query OR i.description CONTAINS $query)

            UNION

            MATCH (c:ContextChunk)
            WHERE ($language IS NULL OR c.language = $language)
            AND c.content CONTAINS $query

            WITH DISTINCT
                CASE
                    WHEN i.name IS NOT NULL THEN i.name
                    ELSE substring(c.content, 0, 50)
                END as suggestion

            RETURN suggestion
            ORDER BY length(suggestion) ASC
            LIMIT $limit
        ";

        let mut result = self
            .graph
            .execute(
                query(cypher)
                    .param("query", query_text)
                    .param("language", language.map(|s| s.to_string()))
                    .param("limit", limit as i64),
            )
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut suggestions = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            let s: String = row
                .get("suggestion")
                .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
            suggestions.push(s);
        }
        Ok(suggestions)
    }

    async fn facets(&self, query_text: &str, language: Option<&str>) -> Result<SearchFacets> {
        // Counts distinct chunk_hash per facet dimension value instead of
        // the original's raw `count(*)`, which double-counts a chunk with
        // more than one Intent/Phase edge (see DESIGN.md).
        let cypher = "
            MATCH (c:ContextChunk)
            WHERE ($language IS NULL OR c.language = $language)
            AND c.content CONTAINS $query

            WITH c
            OPTIONAL MATCH (c)-[:DETAILS]->(i:Intent)
            OPTIONAL MATCH (i)-[:LEADS_TO]->(p:Phase)

            RETURN c.chunk_hash as chunk_hash, c.language as language,
                   c.source_doc as source, i.name as intent, p.name as phase
        ";

        let mut result = self
            .graph
            .execute(
                query(cypher)
                    .param("query", query_text)
                    .param("language", language.map(|s| s.to_string())),
            )
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

        let mut languages: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
        let mut intents: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
        let mut phases: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
        let mut sources: HashMap<String, std::collections::HashSet<String>> = HashMap::new();

        while let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            let chunk_hash: String = row
                .get("chunk_hash")
                .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
            if let Ok(lang) = row.get::<String>("language") {
                languages.entry(lang).or_default().insert(chunk_hash.clone());
            }
            if let Ok(intent) = row.get::<String>("intent") {
                intents.entry(intent).or_default().insert(chunk_hash.clone());
            }
            if let Ok(phase) = row.get::<String>("phase") {
                phases.entry(phase).or_default().insert(chunk_hash.clone());
            }
            if let Ok(source) = row.get::<String>("source") {
                sources.entry(source).or_default().insert(chunk_hash.clone());
            }
        }

        Ok(SearchFacets {
            languages: languages.into_iter().map(|(k, v)| (k, v.len())).collect(),
            intents: intents.into_iter().map(|(k, v)| (k, v.len())).collect(),
            phases: phases.into_iter().map(|(k, v)| (k, v.len())).collect(),
            sources: sources.into_iter().map(|(k, v)| (k, v.len())).collect(),
            result_types: HashMap::new(),
        })
    }

    async fn health(&self) -> Result<StoreHealth> {
        let vector_index_online = crate::store::schema::verify_vector_schema(&self.graph).await?;
        let mut result = self
            .graph
            .execute(query("MATCH (c:ContextChunk) RETURN count(c) as chunk_count"))
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
        let chunk_count = if let Some(row) = result
            .next()
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
        {
            row.get::<i64>("chunk_count").unwrap_or(0) as u64
        } else {
            0
        };
        Ok(StoreHealth {
            online: true,
            vector_index_online,
            chunk_count,
        })
    }
}

fn row_to_vector_result(row: &neo4rs::Row) -> Result<SearchResult> {
    let content: String = row
        .get("content")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let language: String = row
        .get("language")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let chunk_hash: String = row
        .get("chunk_hash")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let source_doc: String = row
        .get("source_doc")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let intent_name: Option<String> = row.get("intent_name").ok();
    let score: f64 = row
        .get("score")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

    Ok(SearchResult {
        chunk_hash,
        content,
        language,
        source_doc,
        vector_score: score as f32,
        graph_score: 0.0,
        intent_score: 0.0,
        language_score: 0.0,
        combined_score: 0.0,
        result_type: ResultType::Vector,
        intent_name,
        phase_name: None,
        graph_distance: 0,
        related_intents: vec![],
        metadata: Default::default(),
    })
}

fn row_to_graph_result(row: &neo4rs::Row) -> Result<SearchResult> {
    let node: neo4rs::Node = row
        .get("result_node")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let content: String = node.get("content").unwrap_or_default();
    let language: String = node.get("language").unwrap_or_default();
    let chunk_hash: String = node.get("chunk_hash").unwrap_or_default();
    let source_doc: String = node.get("source_doc").unwrap_or_default();
    let graph_score: f64 = row
        .get("graph_score")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let intent_name: Option<String> = row.get("intent_name").ok();
    let graph_distance: i64 = row
        .get("graph_distance")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

    Ok(SearchResult {
        chunk_hash,
        content,
        language,
        source_doc,
        vector_score: 0.0,
        graph_score: graph_score as f32,
        intent_score: 0.0,
        language_score: 0.0,
        combined_score: 0.0,
        result_type: ResultType::Graph,
        intent_name,
        phase_name: None,
        graph_distance: graph_distance as u32,
        related_intents: vec![],
        metadata: Default::default(),
    })
}

fn row_to_chunk(row: &neo4rs::Row) -> Result<Chunk> {
    let get_str = |field: &str| -> Result<String> {
        row.get(field)
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))
    };
    let chunk_hash = get_str("chunk_hash")?;
    let content = get_str("content")?;
    let language = get_str("language")?;
    let source_doc = get_str("source_doc")?;
    let position: i64 = row
        .get("position")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let confidence: f64 = row
        .get("confidence")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let word_count: i64 = row
        .get("word_count")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let sentence_count: i64 = row
        .get("sentence_count")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let created_at_str: String = get_str("created_at")?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now());
    let updated_at = row
        .get::<String>("updated_at")
        .ok()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or(created_at);
    let embedding: Option<Vec<f32>> = row
        .get::<Vec<f64>>("embedding")
        .ok()
        .map(|v| v.into_iter().map(|f| f as f32).collect());

    Ok(Chunk {
        chunk_id: chunk_hash.clone(),
        chunk_hash,
        content,
        language,
        source_doc,
        position: position as usize,
        confidence: confidence as f32,
        metadata: Default::default(),
        word_count: word_count as usize,
        sentence_count: sentence_count as usize,
        start_char: 0,
        end_char: 0,
        created_at,
        updated_at,
        embedding,
    })
}

fn row_to_graph_path(row: &neo4rs::Row, start_id: &str) -> Result<GraphPath> {
    let path_nodes: Vec<String> = row
        .get("path_nodes")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let relationships: Vec<String> = row
        .get("relationships")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let path_length: i64 = row
        .get("path_length")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let confidence: f64 = row
        .get("confidence")
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    let end_node_id = path_nodes.last().cloned().unwrap_or_else(|| start_id.to_string());

    Ok(GraphPath {
        start_node_id: start_id.to_string(),
        end_node_id,
        path_nodes,
        relationships,
        path_length: path_length as usize,
        confidence: confidence as f32,
        total_weight: confidence as f32,
    })
}

/// In-memory `GraphStore` test double — no live Neo4j required. Stores
/// chunks in a `Vec` guarded by a `std::sync::Mutex` (all operations are
/// cheap, synchronous scans; no point pulling in an async lock for
/// tests).
#[derive(Default)]
pub struct MockGraphStore {
    chunks: Mutex<Vec<ChunkRecord>>,
    documents: Mutex<HashMap<String, Document>>,
    intents: Mutex<HashMap<String, Intent>>,
    /// `Intent.name -> Intent.name`, directed `LEADS_TO` edges. Test-only
    /// setup hook — `store_chunks` never populates this (the spec's
    /// `DETAILS`/`PART_OF` edges are the only ones it creates).
    leads_to: Mutex<Vec<(String, String)>>,
    /// `chunk_hash <-> chunk_hash`, symmetric `SIMILAR_TO` edges (stored
    /// directed per spec §3 but walked in both directions).
    similar_to: Mutex<Vec<(String, String)>>,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        crate::embedding::vectorizer::cosine_similarity(a, b)
    }

    /// Test/seed hook: add a directed `Intent-[:LEADS_TO]->Intent` edge.
    pub fn add_leads_to(&self, from_intent: impl Into<String>, to_intent: impl Into<String>) {
        self.leads_to.lock().unwrap().push((from_intent.into(), to_intent.into()));
    }

    /// Test/seed hook: add a `Chunk-[:SIMILAR_TO]-Chunk` edge (walked in
    /// both directions, matching spec §3's "symmetric in semantics though
    /// stored directed").
    pub fn add_similar_to(&self, a: impl Into<String>, b: impl Into<String>) {
        self.similar_to.lock().unwrap().push((a.into(), b.into()));
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn store_chunks(&self, records: &[ChunkRecord]) -> Result<usize> {
        let mut chunks = self.chunks.lock().unwrap();
        let mut documents = self.documents.lock().unwrap();
        let mut intents = self.intents.lock().unwrap();

        for record in records {
            let mut record = record.clone();
            record.chunk.embedding = Some(record.embedding.clone());
            let now = chrono::Utc::now();
            if let Some(existing) = chunks.iter().find(|c| c.chunk.chunk_hash == record.chunk.chunk_hash) {
                record.chunk.created_at = existing.chunk.created_at;
            }
            record.chunk.updated_at = now;

            chunks.retain(|c| c.chunk.chunk_hash != record.chunk.chunk_hash);
            chunks.push(record);

            documents
                .entry(record.chunk.source_doc.clone())
                .or_insert_with(|| Document {
                    name: record.chunk.source_doc.clone(),
                    created_at: chrono::Utc::now(),
                });

            if let Some(intent_name) = &record.intent_name {
                intents.entry(intent_name.clone()).or_insert_with(|| Intent {
                    name: intent_name.clone(),
                    description: None,
                    lang: None,
                    created_at: chrono::Utc::now(),
                });
            }
        }
        Ok(records.len())
    }

    async fn vector_knn(
        &self,
        embedding: &[f32],
        k: usize,
        language_filter: Option<&str>,
        confidence_threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.lock().unwrap();
        let mut scored: Vec<(f32, &ChunkRecord)> = chunks
            .iter()
            .filter(|r| language_filter.map_or(true, |lang| r.chunk.language == lang))
            .map(|r| (Self::cosine(embedding, &r.embedding), r))
            .filter(|(score, _)| *score >= confidence_threshold)
            .collect();
        scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, r)| SearchResult {
                chunk_hash: r.chunk.chunk_hash.clone(),
                content: r.chunk.content.clone(),
                language: r.chunk.language.clone(),
                source_doc: r.chunk.source_doc.clone(),
                vector_score: score,
                graph_score: 0.0,
                intent_score: 0.0,
                language_score: 0.0,
                combined_score: 0.0,
                result_type: ResultType::Vector,
                intent_name: r.intent_name.clone(),
                phase_name: None,
                graph_distance: 0,
                related_intents: vec![],
                metadata: r.chunk.metadata.clone(),
            })
            .collect())
    }

    async fn graph_search(
        &self,
        keywords: &[String],
        language: Option<&str>,
        intent_filter: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if keywords.is_empty() {
            return Ok(vec![]);
        }
        let chunks = self.chunks.lock().unwrap();
        let mut results: Vec<SearchResult> = chunks
            .iter()
            .filter(|r| language.map_or(true, |lang| r.chunk.language == lang))
            .filter(|r| {
                intent_filter.map_or(true, |f| r.intent_name.as_deref() == Some(f))
            })
            .filter(|r| {
                let content_lower = r.chunk.content.to_lowercase();
                keywords.iter().any(|kw| content_lower.contains(&kw.to_lowercase()))
            })
            .map(|r| SearchResult {
                chunk_hash: r.chunk.chunk_hash.clone(),
                content: r.chunk.content.clone(),
                language: r.chunk.language.clone(),
                source_doc: r.chunk.source_doc.clone(),
                vector_score: 0.0,
                graph_score: 1.0,
                intent_score: 0.0,
                language_score: 0.0,
                combined_score: 0.0,
                result_type: ResultType::Graph,
                intent_name: r.intent_name.clone(),
                phase_name: None,
                graph_distance: 1,
                related_intents: vec![],
                metadata: r.chunk.metadata.clone(),
            })
            .collect();
        results.truncate(k);
        Ok(results)
    }

    async fn get_chunk_by_hash(&self, chunk_hash: &str) -> Result<Option<Chunk>> {
        let chunks = self.chunks.lock().unwrap();
        Ok(chunks
            .iter()
            .find(|r| r.chunk.chunk_hash == chunk_hash)
            .map(|r| r.chunk.clone()))
    }

    async fn walk(
        &self,
        start_id: &str,
        max_depth: usize,
        intent_filter: Option<&[String]>,
        limit: usize,
    ) -> Result<Vec<GraphPath>> {
        let chunks = self.chunks.lock().unwrap();
        let leads_to = self.leads_to.lock().unwrap();
        let similar_to = self.similar_to.lock().unwrap();

        // Every edge kind the store owns, undirected for traversal — the
        // original's Cypher pattern `(start)-[:DETAILS|LEADS_TO|SIMILAR_TO*1..N]-(end)`
        // has no direction arrows either.
        let mut adjacency: HashMap<String, Vec<(String, &'static str)>> = HashMap::new();
        let mut add_edge = |adjacency: &mut HashMap<String, Vec<(String, &'static str)>>, a: String, b: String, ty: &'static str| {
            adjacency.entry(a.clone()).or_default().push((b.clone(), ty));
            adjacency.entry(b).or_default().push((a, ty));
        };
        for r in chunks.iter() {
            if let Some(intent) = &r.intent_name {
                add_edge(&mut adjacency, r.chunk.chunk_hash.clone(), format!("intent:{intent}"), "DETAILS");
            }
        }
        for (a, b) in leads_to.iter() {
            add_edge(&mut adjacency, format!("intent:{a}"), format!("intent:{b}"), "LEADS_TO");
        }
        for (a, b) in similar_to.iter() {
            add_edge(&mut adjacency, a.clone(), b.clone(), "SIMILAR_TO");
        }

        let chunk_intent = |hash: &str| -> Option<String> {
            chunks.iter().find(|r| r.chunk.chunk_hash == hash).and_then(|r| r.intent_name.clone())
        };
        let start_intent = chunk_intent(start_id);
        let matches_intent_filter = |end_id: &str| -> bool {
            match intent_filter {
                None => true,
                Some(names) => {
                    let end_intent = chunk_intent(end_id);
                    names.iter().any(|n| {
                        start_intent.as_deref() == Some(n.as_str())
                            || end_intent.as_deref() == Some(n.as_str())
                    })
                }
            }
        };

        const DEFAULT_EDGE_CONFIDENCE: f32 = 0.8;
        let mut paths: Vec<GraphPath> = Vec::new();
        let mut visited: std::collections::HashSet<String> = std::collections::HashSet::new();
        visited.insert(start_id.to_string());

        // Bounded DFS enumerating every simple path up to `max_depth` hops;
        // `visited` prevents `LEADS_TO` cycles from ever being revisited
        // within a single path (spec §9 cyclic-graph note).
        fn dfs(
            current: &str,
            depth: usize,
            max_depth: usize,
            adjacency: &HashMap<String, Vec<(String, &'static str)>>,
            visited: &mut std::collections::HashSet<String>,
            path_nodes: &mut Vec<String>,
            path_rels: &mut Vec<String>,
            out: &mut Vec<(Vec<String>, Vec<String>, f32)>,
        ) {
            if depth >= max_depth {
                return;
            }
            let Some(neighbors) = adjacency.get(current) else { return };
            for (next, ty) in neighbors {
                if visited.contains(next) {
                    continue;
                }
                visited.insert(next.clone());
                path_nodes.push(next.clone());
                path_rels.push(ty.to_string());

                let confidence = DEFAULT_EDGE_CONFIDENCE.powi(path_rels.len() as i32);
                out.push((path_nodes.clone(), path_rels.clone(), confidence));

                dfs(next, depth + 1, max_depth, adjacency, visited, path_nodes, path_rels, out);

                path_nodes.pop();
                path_rels.pop();
                visited.remove(next);
            }
        }

        let mut raw: Vec<(Vec<String>, Vec<String>, f32)> = Vec::new();
        dfs(
            start_id,
            0,
            max_depth,
            &adjacency,
            &mut visited,
            &mut vec![start_id.to_string()],
            &mut Vec::new(),
            &mut raw,
        );

        for (nodes, rels, confidence) in raw {
            let end_node_id = nodes.last().cloned().unwrap_or_else(|| start_id.to_string());
            if !end_node_id.starts_with("intent:") && !matches_intent_filter(&end_node_id) {
                continue;
            }
            paths.push(GraphPath {
                start_node_id: start_id.to_string(),
                end_node_id,
                path_length: rels.len(),
                path_nodes: nodes,
                relationships: rels,
                confidence,
                total_weight: confidence,
            });
        }

        paths.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.path_length.cmp(&b.path_length))
        });
        paths.truncate(limit);
        Ok(paths)
    }

    async fn suggest(
        &self,
        query_text: &str,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let intents = self.intents.lock().unwrap();
        let chunks = self.chunks.lock().unwrap();
        let mut suggestions: Vec<String> = Vec::new();

        for intent in intents.values() {
            if language.map_or(true, |lang| intent.lang.as_deref() == Some(lang))
                && intent.name.contains(query_text)
            {
                suggestions.push(intent.name.clone());
            }
        }
        for record in chunks.iter() {
            if language.map_or(true, |lang| record.chunk.language == lang)
                && record.chunk.content.contains(query_text)
            {
                suggestions.push(record.chunk.content.chars().take(50).collect());
            }
        }
        suggestions.sort_by_key(|s| s.len());
        suggestions.dedup();
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    async fn facets(&self, query_text: &str, language: Option<&str>) -> Result<SearchFacets> {
        let chunks = self.chunks.lock().unwrap();
        let mut languages: HashMap<String, usize> = HashMap::new();
        let mut intents: HashMap<String, usize> = HashMap::new();
        let mut sources: HashMap<String, usize> = HashMap::new();

        for record in chunks.iter() {
            if !record.chunk.content.contains(query_text) {
                continue;
            }
            if let Some(lang) = language {
                if record.chunk.language != lang {
                    continue;
                }
            }
            *languages.entry(record.chunk.language.clone()).or_insert(0) += 1;
            *sources.entry(record.chunk.source_doc.clone()).or_insert(0) += 1;
            if let Some(intent) = &record.intent_name {
                *intents.entry(intent.clone()).or_insert(0) += 1;
            }
        }

        Ok(SearchFacets {
            languages,
            intents,
            phases: HashMap::new(),
            sources,
            result_types: HashMap::new(),
        })
    }

    async fn health(&self) -> Result<StoreHealth> {
        let chunks = self.chunks.lock().unwrap();
        Ok(StoreHealth {
            online: true,
            vector_index_online: true,
            chunk_count: chunks.len() as u64,
        })
    }
}
