//! Core entity and configuration model for idmint.
//!
//! Defines the types every minting stage depends on:
//! - [`Entity`]: a fieldable content object (id, type, bundle, named JSON fields)
//! - [`FieldAccessor`]: the narrow has/get/set/save capability the minting core needs
//! - [`EntityStore`] / [`StoredEntity`]: persistence behind [`FieldAccessor::save`]
//! - [`EntityValidator`]: optional pre-save validation hook
//! - [`IdentifierConfig`] / [`DataProfileConfig`]: the configuration records
//!   that select the target field and the payload mapping
//!
//! The minting pipeline never owns an entity. It borrows a [`FieldAccessor`]
//! for the duration of one transaction.

mod accessor;
mod config;
mod entity;
mod store;
mod validator;

pub use accessor::{FieldAccessor, SaveError};
pub use config::{DataProfileConfig, IdentifierConfig, ProfileEntry};
pub use entity::Entity;
pub use store::{EntityStore, MemoryEntityStore, StoredEntity};
pub use validator::{AcceptAll, EntityValidator};
