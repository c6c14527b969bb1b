//! Index bootstrap for the graph store.
//!
//! Creates the `chunk_embedding_idx` vector index and `chunk_content_idx`
//! fulltext index the rest of the store depends on, plus supplemental
//! property indexes, idempotently (`IF NOT EXISTS`). Neo4j has no
//! out-of-band migration tool in this deployment, so this runs at
//! startup rather than as a separate step.

use crate::error::{DependencyKind, EngineError, Result};
use neo4rs::Graph;

pub const VECTOR_INDEX_NAME: &str = "chunk_embedding_idx";
pub const FULLTEXT_INDEX_NAME: &str = "chunk_content_idx";

/// Create every index the store relies on if it doesn't already exist.
/// Safe to call on every startup — `IF NOT EXISTS` makes this
/// idempotent.
pub async fn ensure_schema(graph: &Graph, embedding_dim: usize) -> Result<()> {
    let statements = [
        format!(
            "CREATE VECTOR INDEX {} IF NOT EXISTS \
             FOR (c:ContextChunk) ON (c.embedding) \
             OPTIONS {{indexConfig: {{`vector.dimensions`: {}, `vector.similarity_function`: 'cosine'}}}}",
            VECTOR_INDEX_NAME, embedding_dim
        ),
        format!(
            "CREATE FULLTEXT INDEX {} IF NOT EXISTS FOR (c:ContextChunk) ON EACH [c.content]",
            FULLTEXT_INDEX_NAME
        ),
        "CREATE INDEX chunk_hash_idx IF NOT EXISTS FOR (c:ContextChunk) ON (c.chunk_hash)"
            .to_string(),
        "CREATE INDEX chunk_language_idx IF NOT EXISTS FOR (c:ContextChunk) ON (c.language)"
            .to_string(),
        "CREATE INDEX document_name_idx IF NOT EXISTS FOR (d:Document) ON (d.name)".to_string(),
        "CREATE INDEX intent_name_idx IF NOT EXISTS FOR (i:Intent) ON (i.name)".to_string(),
    ];

    for stmt in statements {
        graph
            .run(neo4rs::query(&stmt))
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
    }

    Ok(())
}

/// Verify the vector index exists and is online, mirroring
/// `_verify_vector_schema`'s exact Cypher.
pub async fn verify_vector_schema(graph: &Graph) -> Result<bool> {
    let mut result = graph
        .execute(neo4rs::query(
            "CALL db.indexes() YIELD name, type, state \
             WHERE name = $name AND type = 'VECTOR' AND state = 'ONLINE' \
             RETURN count(*) as index_count",
        )
        .param("name", VECTOR_INDEX_NAME))
        .await
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;

    if let Some(row) = result
        .next()
        .await
        .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?
    {
        let count: i64 = row
            .get("index_count")
            .map_err(|e| EngineError::dependency(DependencyKind::Store, e.to_string()))?;
        Ok(count > 0)
    } else {
        Ok(false)
    }
}
