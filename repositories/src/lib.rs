//! Storage backends for the tracker: MongoDB for real deployments and an in-memory engine for tests.
pub mod memory;
pub mod mongodb;
