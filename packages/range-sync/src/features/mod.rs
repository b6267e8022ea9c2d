//! Sync stages: read sources, merge, normalize, publish

pub mod merge;
pub mod normalize;
pub mod publish;
pub mod sources;
