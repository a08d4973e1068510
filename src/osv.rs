//! OSV batch query client.
//!
//! One `POST {base}/v1/querybatch` per invocation. The oracle answers with a
//! `results` array aligned with the request's `queries`; the client trusts that
//! order and never re-matches by name.

use crate::model::{PackageRef, Severity, VulnRecord, VulnResult, ECOSYSTEM};
use crate::traits::{OracleError, VulnerabilityOracle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub struct OsvClient {
    client: reqwest::Client,
    api_base: String,
}

impl OsvClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, ?timeout, "HTTP client setup failed, using defaults without a timeout");
                reqwest::Client::new()
            }
        };
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn batch_url(&self) -> String {
        format!("{}/v1/querybatch", self.api_base)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct BatchRequest<'a> {
    queries: Vec<Query<'a>>,
}

#[derive(Serialize)]
struct Query<'a> {
    version: &'a str,
    package: QueryPackage<'a>,
}

#[derive(Serialize)]
struct QueryPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Deserialize)]
struct BatchResponse {
    results: Vec<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    vulns: Vec<OsvVuln>,
}

#[derive(Deserialize)]
struct OsvVuln {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
}

#[derive(Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>,
}

fn build_request(candidates: &[PackageRef]) -> BatchRequest<'_> {
    BatchRequest {
        queries: candidates
            .iter()
            .map(|c| Query {
                version: c.query_version(),
                package: QueryPackage {
                    name: &c.name,
                    ecosystem: ECOSYSTEM,
                },
            })
            .collect(),
    }
}

/// Parses a batch response body and aligns it with `candidates`.
fn align_results(candidates: &[PackageRef], body: &str) -> Result<Vec<VulnResult>, OracleError> {
    let batch: BatchResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    if batch.results.len() != candidates.len() {
        return Err(OracleError::LengthMismatch {
            expected: candidates.len(),
            actual: batch.results.len(),
        });
    }

    Ok(candidates
        .iter()
        .zip(batch.results)
        .map(|(package, result)| VulnResult {
            package: package.clone(),
            vulns: result
                .vulns
                .into_iter()
                .map(|v| VulnRecord {
                    severity: Severity::from_oracle(
                        v.database_specific
                            .as_ref()
                            .and_then(|d| d.severity.as_deref()),
                    ),
                    id: v.id,
                    summary: v.summary.filter(|s| !s.trim().is_empty()),
                })
                .collect(),
        })
        .collect())
}

#[async_trait]
impl VulnerabilityOracle for OsvClient {
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    async fn query(&self, candidates: &[PackageRef]) -> Result<Vec<VulnResult>, OracleError> {
        if candidates.is_empty() {
            debug!("No candidates, skipping oracle call");
            return Ok(Vec::new());
        }

        let url = self.batch_url();
        info!(%url, "Querying vulnerability oracle");

        let response = self
            .client
            .post(&url)
            .json(&build_request(candidates))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Oracle request failed");
                OracleError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Oracle returned non-success status");
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        align_results(candidates, &body)
    }
}
