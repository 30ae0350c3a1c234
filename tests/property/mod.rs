//! Property-based tests

mod path_normalization;
mod snapshot_round_trip;
