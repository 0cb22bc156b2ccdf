//! Similarity and versioning core for harvested news posts.
//!
//! A run builds a [`corpus::Corpus`] from one day of posts, weights it into a
//! [`vectorizer::FeatureMatrix`], classifies each post's siblings and related
//! posts, and decides which sibling groups need a new metapost. Version
//! resolution picks the authoritative copy of re-crawled posts and spider
//! configurations.

pub mod config;
pub mod corpus;
pub mod crap;
pub mod edits;
pub mod error;
pub mod grouper;
pub mod metapost;
pub mod post;
pub mod report;
pub mod tokenizer;
pub mod vectorizer;
pub mod versioning;

pub use config::{NlpConfig, SimilarityPolicy};
pub use error::{NlpError, Result};
pub use post::{Post, PostId, Version};
