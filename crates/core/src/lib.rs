//! Domain types and pure logic for the artist-style × prompt image grid.
//!
//! Everything here is free of network and database concerns: batch naming,
//! prompt composition, combination enumeration, input-list loading, the
//! remap layer, the matrix cache freshness predicate, and batch directory
//! management.

pub mod batch_dir;
pub mod batch_name;
pub mod cache;
pub mod combinations;
pub mod error;
pub mod input_list;
pub mod naming;
pub mod prompt;
pub mod remap;
pub mod types;
