//! Catalog of the admin resources that have a list page.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Companies,
    Customers,
    Vendors,
    Taxes,
    Categories,
    Items,
    Parties,
    Users,
    Invoices,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Companies,
        EntityKind::Customers,
        EntityKind::Vendors,
        EntityKind::Taxes,
        EntityKind::Categories,
        EntityKind::Items,
        EntityKind::Parties,
        EntityKind::Users,
        EntityKind::Invoices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Companies => "companies",
            EntityKind::Customers => "customers",
            EntityKind::Vendors => "vendors",
            EntityKind::Taxes => "taxes",
            EntityKind::Categories => "categories",
            EntityKind::Items => "items",
            EntityKind::Parties => "parties",
            EntityKind::Users => "users",
            EntityKind::Invoices => "invoices",
        }
    }

    /// Key of the cached snapshot for this collection.
    pub fn cache_key(&self) -> &'static str {
        self.as_str()
    }

    /// REST collection path, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        self.as_str()
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Customers".parse::<EntityKind>().unwrap(), EntityKind::Customers);
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn cache_keys_are_unique() {
        let mut keys: Vec<_> = EntityKind::ALL.iter().map(|k| k.cache_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), EntityKind::ALL.len());
    }
}
