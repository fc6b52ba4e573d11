//! wordquest-core — Vocabulary drilling engine.
//!
//! This crate holds the word catalog, the quiz and match session state
//! machines, and the progress and achievement tracking that every wordquest
//! front end builds on. Storage is abstracted behind
//! [`traits::DocumentStore`]; an in-memory implementation lives in
//! [`store`].

pub mod achievements;
pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod parser;
pub mod progress;
pub mod quiz;
pub mod statistics;
pub mod store;
pub mod traits;
pub mod word_bank;
