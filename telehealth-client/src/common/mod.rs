//! Identifier types shared between the PubMed and PMC modules

pub mod ids;

pub use ids::{PmcId, PubMedId};
