//! Pinecone index client.
//!
//! Talks to a serverless index data plane over HTTPS. Chunk text is stored in
//! each vector's `metadata.text` field.

use async_trait::async_trait;
use cvagent_core::error::IndexError;
use cvagent_core::index::{IndexMatch, IndexQuery, IndexRecord, VectorIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const API_VERSION: &str = "2024-07";

/// A Pinecone index reachable at `host`.
pub struct PineconeIndex {
    host: String,
    api_key: String,
    client: reqwest::Client,
}

impl PineconeIndex {
    /// Create a client for the index at `host`
    /// (e.g., "https://cvs-index-abc123.svc.aped-4627-b74a.pinecone.io").
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let host = host.into();
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{host}")
        };

        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn query_body(query: &IndexQuery) -> ApiQueryRequest<'_> {
        ApiQueryRequest {
            namespace: &query.namespace,
            vector: &query.vector,
            top_k: query.top_k,
            include_metadata: true,
            include_values: false,
        }
    }

    fn into_matches(response: ApiQueryResponse) -> Vec<IndexMatch> {
        response
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                text: m.metadata.and_then(|md| md.text).unwrap_or_default(),
            })
            .collect()
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response, IndexError> {
        let url = format!("{}{}", self.host, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| IndexError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, path, body = %error_body, "Pinecone returned error");
            return Err(IndexError::Api {
                status_code: status,
                message: error_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<IndexMatch>, IndexError> {
        debug!(namespace = %query.namespace, top_k = query.top_k, "Querying Pinecone");

        let response = self.post("/query", &Self::query_body(&query)).await?;
        let parsed: ApiQueryResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Parse(e.to_string()))?;

        Ok(Self::into_matches(parsed))
    }

    async fn upsert(&self, namespace: &str, records: Vec<IndexRecord>) -> Result<usize, IndexError> {
        let vectors: Vec<ApiVector> = records
            .into_iter()
            .map(|r| ApiVector {
                id: r.id,
                values: r.values,
                metadata: ApiMetadata { text: Some(r.text) },
            })
            .collect();

        debug!(namespace, count = vectors.len(), "Upserting into Pinecone");

        let body = ApiUpsertRequest { vectors, namespace };
        let response = self.post("/vectors/upsert", &body).await?;
        let parsed: ApiUpsertResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Parse(e.to_string()))?;

        Ok(parsed.upserted_count)
    }
}

// --- Pinecone API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiQueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct ApiQueryResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<ApiMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiVector {
    id: String,
    values: Vec<f32>,
    metadata: ApiMetadata,
}

#[derive(Debug, Serialize)]
struct ApiUpsertRequest<'a> {
    vectors: Vec<ApiVector>,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}
