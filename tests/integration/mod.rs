//! Integration tests for the sketchvfs project tree and preview pipeline

mod config_integration;
mod patch_engine;
mod preview_assembly;
mod session_intents;
mod snapshot_store;
mod test_utils;
mod tree_operations;
