pub mod batches;
