pub mod client;

pub use client::{FeedBatch, FeedClient};
