//! Token-aware REST client for the clubhouse API.
//!
//! This crate provides:
//! - `ApiClient`: JSON requests against the configured base URL, bearer
//!   token attachment, error-body translation, and token invalidation on 401
//! - `TokenSlot`: the request layer's token together with its generation
//! - `Resource`/`ResourceClient`/`ResourceState`: typed access to the
//!   club's entity collections with loading and error state
//! - `entities`: the entity types themselves

pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod message;
pub mod resource;
pub mod token;

pub use client::{Access, ApiClient};
pub use config::ApiConfig;
pub use error::ApiError;
pub use resource::{Resource, ResourceClient, ResourceState};
pub use token::TokenSlot;
