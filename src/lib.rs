// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! hnf1b-variants: variant notation workflow for the HNF1B database
//!
//! Classifies variant strings (HGVS, VCF, rsID, SPDI), validates them with
//! correction suggestions, recodes them into every derivable notation and
//! annotates them through a cached consequence predictor.
//!
//! # Example
//!
//! ```
//! use hnf1b_variants::{classify, parse_variant, NotationKind, Recoder};
//! use hnf1b_variants::reference::GenomeBuild;
//! use hnf1b_variants::variant::AssembledVariant;
//!
//! assert_eq!(classify("rs56116432"), NotationKind::RsId);
//!
//! let recoder = Recoder::with_test_data();
//! let variant = AssembledVariant::new(parse_variant("rs56116432").unwrap(), GenomeBuild::GRCh38);
//! let recoding = recoder.recode(&variant).unwrap();
//! assert_eq!(recoding.hgvsc, ["NM_000458.4:c.544+1G>A"]);
//! assert_eq!(recoding.vcf_string, ["17-36459258-A-G"]);
//! ```

pub mod annotate;
pub mod cache;
pub mod config;
pub mod error;
pub mod hgvs;
pub mod http_client;
pub mod notation;
pub mod recode;
pub mod reference;
pub mod rsid;
pub mod service;
pub mod spdi;
pub mod variant;
pub mod vcf;

pub use annotate::{
    AnnotationLookup, AnnotationRecord, Annotator, ConsequencePredictor, MockPredictor, VepClient,
};
pub use cache::{AnnotationCache, CacheStats, TtlCache};
pub use config::ServiceConfig;
pub use error::{ErrorCode, VariantError};
pub use hgvs::{parse_hgvs, HgvsVariant};
pub use notation::{classify, parse_variant, validate, validate_input, NotationKind};
pub use recode::{Recoder, Recoding};
pub use reference::{GenomeBuild, ReferenceProvider, ReferenceStore};
pub use rsid::{InMemoryRsIdLookup, RsIdLookup};
pub use spdi::{parse_spdi, SpdiVariant};
pub use variant::{AssembledVariant, CanonicalKey, GenomicChange, VariantId};
pub use vcf::{parse_vcf, VcfVariant};

/// Result type alias using VariantError
pub type Result<T> = std::result::Result<T, VariantError>;
