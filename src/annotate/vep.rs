//! Ensembl VEP REST predictor
//!
//! Queries `{base}/vep/human/region/{region}/{allele}` with CADD scores,
//! HGVS and canonical flags enabled, and `{base}/info/software` for the
//! release number. GRCh37 is served from a separate base URL.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use crate::annotate::predictor::{ConsequencePredictor, PredictionQuery};
use crate::annotate::types::{ColocatedVariant, ConsequenceResult, TranscriptConsequence};
use crate::config::UpstreamConfig;
use crate::error::VariantError;
use crate::http_client::{UpstreamHttpClient, UpstreamResponse};
use crate::reference::GenomeBuild;

/// gnomAD population keys, most preferred first
const GNOMAD_KEYS: [&str; 3] = ["gnomade", "gnomadg", "gnomad"];

#[derive(Debug, Deserialize)]
struct VepRecord {
    most_severe_consequence: Option<String>,
    #[serde(default)]
    transcript_consequences: Vec<VepTranscriptConsequence>,
    #[serde(default)]
    colocated_variants: Vec<VepColocatedVariant>,
}

#[derive(Debug, Deserialize)]
struct VepTranscriptConsequence {
    transcript_id: String,
    gene_symbol: Option<String>,
    #[serde(default)]
    consequence_terms: Vec<String>,
    impact: String,
    hgvsc: Option<String>,
    hgvsp: Option<String>,
    cadd_phred: Option<f64>,
    /// VEP flags canonical transcripts with `1`
    canonical: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct VepColocatedVariant {
    id: Option<String>,
    /// allele -> population -> frequency
    #[serde(default)]
    frequencies: HashMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct VepError {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SoftwareInfo {
    release: serde_json::Value,
}

/// Ensembl VEP client
#[derive(Debug)]
pub struct VepClient {
    http: UpstreamHttpClient,
    config: UpstreamConfig,
    /// Last release reported by `/info/software`
    release: Mutex<Option<String>>,
}

impl VepClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, VariantError> {
        Ok(Self {
            http: UpstreamHttpClient::new(config)?,
            config: config.clone(),
            release: Mutex::new(None),
        })
    }

    fn base_url(&self, build: GenomeBuild) -> &str {
        self.config.base_url(build).trim_end_matches('/')
    }

    /// Request URL for a query
    pub fn region_url(&self, query: &PredictionQuery) -> String {
        format!(
            "{}/vep/human/region/{}/{}?CADD=1&canonical=1&hgvs=1&content-type=application/json",
            self.base_url(query.build),
            query.region(),
            urlencoding::encode(&query.allele),
        )
    }

    fn known_release(&self) -> String {
        self.release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[async_trait]
impl ConsequencePredictor for VepClient {
    async fn predict(&self, query: &PredictionQuery) -> Result<ConsequenceResult, VariantError> {
        let url = self.region_url(query);
        tracing::info!("VEP lookup for {}", query);
        let response = self.http.get_json(&url).await?;
        interpret_response(&response, &query.allele, &self.known_release())
    }

    async fn version(&self) -> Result<String, VariantError> {
        let url = format!(
            "{}/info/software?content-type=application/json",
            self.base_url(GenomeBuild::GRCh38)
        );
        let response = self.http.get_json(&url).await?;
        check_status(&response)?;
        let info: SoftwareInfo = serde_json::from_str(&response.body)
            .map_err(|e| VariantError::upstream(format!("malformed release info: {}", e)))?;
        let release = match info.release {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        *self.release.lock().unwrap_or_else(PoisonError::into_inner) = Some(release.clone());
        Ok(release)
    }

    fn name(&self) -> &str {
        "ensembl-vep"
    }
}

fn check_status(response: &UpstreamResponse) -> Result<(), VariantError> {
    let message = || {
        serde_json::from_str::<VepError>(&response.body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("HTTP {}", response.status))
    };
    match response.status {
        200..=299 => Ok(()),
        400 => Err(VariantError::invalid(message())),
        404 => Err(VariantError::not_found(message())),
        429 => Err(VariantError::RateLimited {
            retry_after: response.retry_after,
        }),
        _ => Err(VariantError::upstream(message())),
    }
}

/// Turn a VEP region reply into a [`ConsequenceResult`]
///
/// An empty array means VEP found no overlapping feature.
pub fn interpret_response(
    response: &UpstreamResponse,
    allele: &str,
    release: &str,
) -> Result<ConsequenceResult, VariantError> {
    check_status(response)?;

    let records: Vec<VepRecord> = serde_json::from_str(&response.body)
        .map_err(|e| VariantError::upstream(format!("malformed VEP response: {}", e)))?;
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| VariantError::not_found("VEP returned no consequences"))?;

    let transcript_consequences = record
        .transcript_consequences
        .into_iter()
        .map(|tc| {
            Ok(TranscriptConsequence {
                impact: tc.impact.parse()?,
                transcript_id: tc.transcript_id,
                gene_symbol: tc.gene_symbol,
                consequence_terms: tc.consequence_terms,
                hgvsc: tc.hgvsc,
                hgvsp: tc.hgvsp,
                cadd_phred: tc.cadd_phred,
                canonical: tc.canonical == Some(1),
            })
        })
        .collect::<Result<Vec<_>, VariantError>>()?;

    let colocated_variants = record
        .colocated_variants
        .into_iter()
        .filter_map(|cv| {
            let gnomad_af = cv.frequencies.get(allele).and_then(|pops| {
                GNOMAD_KEYS.iter().find_map(|key| pops.get(*key).copied())
            });
            cv.id.map(|id| ColocatedVariant { id, gnomad_af })
        })
        .collect();

    Ok(ConsequenceResult {
        most_severe_consequence: record
            .most_severe_consequence
            .unwrap_or_else(|| "unknown".to_string()),
        transcript_consequences,
        colocated_variants,
        predictor_version: release.to_string(),
    })
}
