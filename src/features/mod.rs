pub mod documents;
pub mod migration;
