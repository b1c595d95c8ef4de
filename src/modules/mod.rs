//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the document storage gateway and its provider adapters.

pub mod storage;
