use serde::{Deserialize, Serialize};
use std::fmt;

/// Field types understood by the remote index, in their EDM spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Edm.Int32")]
    Int32,
    #[serde(rename = "Edm.Int64")]
    Int64,
    #[serde(rename = "Edm.Double")]
    Double,
    #[serde(rename = "Edm.Boolean")]
    Boolean,
    #[serde(rename = "Edm.DateTimeOffset")]
    DateTimeOffset,
    #[serde(rename = "Edm.GeographyPoint")]
    GeographyPoint,
    #[serde(rename = "Collection(Edm.String)")]
    StringCollection,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "Edm.String",
            FieldType::Int32 => "Edm.Int32",
            FieldType::Int64 => "Edm.Int64",
            FieldType::Double => "Edm.Double",
            FieldType::Boolean => "Edm.Boolean",
            FieldType::DateTimeOffset => "Edm.DateTimeOffset",
            FieldType::GeographyPoint => "Edm.GeographyPoint",
            FieldType::StringCollection => "Collection(Edm.String)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default)]
    pub key: bool,
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub facetable: bool,
    pub retrievable: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions {
            key: false,
            searchable: false,
            filterable: true,
            sortable: false,
            facetable: false,
            retrievable: true,
        }
    }
}

impl FieldOptions {
    pub fn searchable() -> Self {
        FieldOptions {
            searchable: true,
            ..Default::default()
        }
    }

    pub fn key() -> Self {
        FieldOptions {
            key: true,
            ..Default::default()
        }
    }
}

/// One field of the remote index as the schema synchronizer reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub options: FieldOptions,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType, options: FieldOptions) -> Self {
        FieldDefinition {
            name: name.into(),
            field_type,
            options,
        }
    }

    pub fn is_key(&self) -> bool {
        self.options.key
    }
}
