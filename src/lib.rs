pub mod batch;
pub mod completion;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tracker;

#[cfg(test)]
mod testing;
