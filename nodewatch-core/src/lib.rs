//! Nodewatch Core
//!
//! Core types shared by the nodewatch crates.
//!
//! This crate contains:
//! - Domain types: the observed entities (Trigger, Task, LogStream, etc.)
//! - DTOs: wire representations of the node gateway API

pub mod domain;
pub mod dto;
