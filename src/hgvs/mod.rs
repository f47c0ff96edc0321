//! HGVS variant descriptions
//!
//! Data types and a nom parser for the HGVS subset this crate recodes:
//! simple nucleotide edits on genomic (`g.`/`m.`) and transcript (`c.`/`n.`)
//! references, and verbatim protein (`p.`) consequences.

pub mod edit;
pub mod location;
pub mod parser;
pub mod variant;

pub use edit::{complement, reverse_complement, NaEdit};
pub use location::{HgvsInterval, HgvsPosition};
pub use parser::parse_hgvs;
pub use variant::{CoordinateType, HgvsChange, HgvsVariant};
