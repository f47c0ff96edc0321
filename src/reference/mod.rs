//! Reference data abstraction
//!
//! Assemblies, chromosome accessions, transcript models and the provider
//! trait the recoder uses to reach them.

pub mod assembly;
pub mod provider;
pub mod store;
pub mod transcript;

pub use assembly::{chromosome_for_accession, normalize_chromosome, GenomeBuild};
pub use provider::ReferenceProvider;
pub use store::{ReferenceStore, SequenceWindow};
pub use transcript::{Exon, Strand, Transcript};
