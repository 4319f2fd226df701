//! Ladder use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and engine transforms into use-case APIs.
//! - Keep UI layers decoupled from storage details.

pub mod ladder_service;
