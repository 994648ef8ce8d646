//! Integration test suite for epinet.
//!
//! These tests drive the public API the way the TUI and the headless
//! commands do: requests go through the `TaskCoordinator`, results come back
//! as events and land in the TEA model.
//!
//! # Test Categories
//!
//! - `coordinator`: Task lifecycle, cancellation and progress delivery
//! - `network`: Generation, edge-list files and structural analysis
//! - `simulation`: Epidemic runs against predicted sizes

mod fixtures;

mod coordinator;
mod network;
mod simulation;
