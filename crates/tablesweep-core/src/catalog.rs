//! Catalog entries: the authoritative universe of objects that exist

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of catalog object, decoded from the warehouse type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "table")]
    Table,

    #[serde(rename = "view")]
    View,

    /// Externally backed object (e.g. a spreadsheet)
    #[serde(rename = "External")]
    External,
}

impl ObjectType {
    /// Decode the numeric type code from table metadata.
    ///
    /// Unknown codes map to `None` and are reported as null.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Table),
            2 => Some(Self::View),
            3 => Some(Self::External),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::External => "External",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One table/view/external object from per-dataset metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTableEntry {
    pub project_id: String,
    pub dataset_id: String,

    /// Raw table name, shard suffix intact
    pub table_id: String,

    /// Date the object was created
    pub creation_date: NaiveDate,

    /// Total stored bytes
    pub size_bytes: i64,

    /// Decoded object type; `None` for unrecognized codes
    pub object_type: Option<ObjectType>,
}

impl CatalogTableEntry {
    /// Fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// One column from per-dataset column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumnEntry {
    pub project_id: String,
    pub dataset_id: String,

    /// Raw table name, shard suffix intact
    pub table_id: String,

    pub column_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_codes() {
        assert_eq!(ObjectType::from_code(1), Some(ObjectType::Table));
        assert_eq!(ObjectType::from_code(2), Some(ObjectType::View));
        assert_eq!(ObjectType::from_code(3), Some(ObjectType::External));
        assert_eq!(ObjectType::from_code(0), None);
        assert_eq!(ObjectType::from_code(7), None);
    }

    #[test]
    fn object_type_display() {
        assert_eq!(ObjectType::Table.to_string(), "table");
        assert_eq!(ObjectType::View.to_string(), "view");
        assert_eq!(ObjectType::External.to_string(), "External");
    }

    #[test]
    fn table_entry_fqn() {
        let entry = CatalogTableEntry {
            project_id: "proj".to_string(),
            dataset_id: "ds".to_string(),
            table_id: "events_20240101".to_string(),
            creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            size_bytes: 1024,
            object_type: Some(ObjectType::Table),
        };

        assert_eq!(entry.fqn(), "proj.ds.events_20240101");
    }
}
