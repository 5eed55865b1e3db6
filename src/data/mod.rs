//! Static data tables used by the normalization pipeline.

pub mod commands;
