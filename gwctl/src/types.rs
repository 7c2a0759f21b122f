//! Common identifier types.
//!
//! The gateway backend issues opaque string identifiers (UUID-like hex for projects and
//! keys, caller-chosen business ids for instances). They are aliased here so signatures say
//! which entity an id belongs to.

pub type ProjectId = String;
pub type ApiKeyId = String;
pub type BusinessId = String;
