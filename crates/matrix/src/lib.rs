//! Matrix Resolver: joins a batch's record store with its remap table into a
//! style × prompt grid of public URLs, memoized in a fingerprinted cache.

pub mod error;
pub mod grid;
pub mod resolver;

pub use error::MatrixError;
pub use grid::{build_matrix, MatrixPayload};
pub use resolver::{MatrixData, MatrixResolver, CACHE_VERSION};
