// ABOUTME: Library entry point for wmec-matching
// ABOUTME: Exercise-name normalization, the catalog store, fuzzy matching, and the layered mapping resolver

#![deny(unsafe_code)]

//! Name matching and mapping resolution (C1-C4, C6):
//!
//! - [`normalize`]: the name normalizer (C2)
//! - [`catalog`]: the shared-read catalog store and its lookup rule (C1, C5)
//! - [`fuzzy`]: token-set fuzzy matching (C3)
//! - [`alias`]: the curated alias substitution table consulted by C3
//! - [`canonical`]: the independent canonical-token classifier (C4 step 5)
//! - [`resolver`]: the layered, short-circuiting mapping resolver (C4)
//!
//! Sport inference (C6) lives in `wmec_core::sport` since it only needs the
//! compiled step list's category ids, not the catalog itself.

pub mod alias;
pub mod canonical;
pub mod catalog;
pub mod fuzzy;
pub mod normalize;
pub mod resolver;

pub use catalog::{CatalogEntry, CatalogMatch, CatalogStore, KeywordRule, MatchType};
pub use resolver::{CuratedRule, MappingResolver, PopularityLookup, UserMappingLookup};
