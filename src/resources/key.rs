//! Resource key derivation
//!
//! Every object in a resource type's cache is addressed by a string key:
//! `<namespace>_<name>` for namespaced objects and `<name>` for cluster-scoped
//! ones. The query path splits dump entries on the same scheme, so the format
//! is part of the on-disk contract.

/// Separator between namespace and name in a resource key
pub const KEY_SEPARATOR: char = '_';

/// Derive the cache key for an object from its namespace and name
pub fn resource_key(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}{}{}", ns, KEY_SEPARATOR, name),
        _ => name.to_string(),
    }
}
