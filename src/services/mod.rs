pub mod ingest;
pub mod media;
pub mod metadata;
pub mod staging;
pub mod storage;
