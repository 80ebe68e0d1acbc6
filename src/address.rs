//! Address Resolution
//!
//! Turns a request path into the `(table, item)` pair it addresses.
//!
//! Two addressing modes exist:
//! - single-table: the whole path is the item id, the table is the default one
//! - multi-table: `/{table}/{item...}`, where the item id keeps any further `/`

use std::fmt;

/// Separator between path segments and between the parts of a cache key.
pub const SEPARATOR: char = '/';

// == Address ==
/// Identifies one stored item. Equality is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub table_id: String,
    pub item_id: String,
}

impl Address {
    pub fn new(table_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Canonical cache key, `{table}/{item}`.
    ///
    /// Table ids never contain the separator (multi-table ids end at the first
    /// `/`, the default table is validated at startup), so the first `/` in a
    /// key always splits the two parts and no escaping is needed.
    pub fn cache_key(&self) -> String {
        format!("{}{}{}", self.table_id, SEPARATOR, self.item_id)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id, self.item_id)
    }
}

// == Resolved Address ==
/// An address plus whether it targets the default table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: Address,
    pub using_default_table: bool,
}

// == Resolution Errors ==
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("path '{0}' has no item id")]
    MissingItem(String),
    #[error("path '{0}' has no table id")]
    MissingTable(String),
}

// == Resolve ==
/// Parses `path` into an address.
///
/// In multi-table mode leading separators are skipped, the first segment is
/// the table id, and everything after the following separator is the item id
/// with trailing separators removed. Segments inside the item id are kept
/// joined by `/`.
pub fn resolve(
    path: &str,
    multi_table: bool,
    default_table: &str,
) -> Result<ResolvedAddress, AddressError> {
    if !multi_table {
        if path.is_empty() {
            return Err(AddressError::MissingItem(path.to_string()));
        }
        return Ok(ResolvedAddress {
            address: Address::new(default_table, path),
            using_default_table: true,
        });
    }

    let trimmed = path.trim_start_matches(SEPARATOR);
    let (table_id, rest) = match trimmed.split_once(SEPARATOR) {
        Some((table, rest)) => (table, rest),
        None => (trimmed, ""),
    };

    if table_id.is_empty() {
        return Err(AddressError::MissingTable(path.to_string()));
    }

    let item_id = rest.trim_end_matches(SEPARATOR);
    if item_id.is_empty() {
        return Err(AddressError::MissingItem(path.to_string()));
    }

    Ok(ResolvedAddress {
        address: Address::new(table_id, item_id),
        using_default_table: table_id == default_table,
    })
}
