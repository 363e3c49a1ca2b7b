pub mod batches;
pub mod generate;
pub mod upload;
