//! Property-based tests for extraction robustness and prompt determinism

mod determinism;
mod extraction;
