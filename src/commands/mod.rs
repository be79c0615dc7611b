pub mod export;
pub mod ingest;
pub mod inspect;
pub mod languages;
