//! Integration tests for kfzf

mod cli;
mod store;
