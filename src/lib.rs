// Sepitori: Naive Bayes classifier for Sepitori / non-Sepitori text
//
// This is the library root. The HTTP service and the CLI in main.rs are
// thin layers over classifier, corpus and training.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod output;
pub mod persist;
pub mod status;
pub mod text;
pub mod training;
pub mod web;
