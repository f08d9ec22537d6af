//! Declarative entity schemas produced by the converter
//!
//! Serialized field names and absent-field rules match what the CRUD
//! generator consumes: optional flags are omitted rather than written as
//! `false`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Create/read/update/delete switches; all granted by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }
}

/// Cardinality of a relation field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationCardinality {
    OneToMany,
    ManyToOne,
}

impl RelationCardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationCardinality::OneToMany => "one-to-many",
            RelationCardinality::ManyToOne => "many-to-one",
        }
    }
}

impl fmt::Display for RelationCardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to referencing rows when the target is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeletePolicy {
    Restrict,
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSchema {
    pub kind: RelationCardinality,
    pub on_delete: DeletePolicy,
    /// Set only for composition-backed relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<bool>,
}

impl RelationSchema {
    pub fn new(many: bool) -> Self {
        Self {
            kind: if many {
                RelationCardinality::OneToMany
            } else {
                RelationCardinality::ManyToOne
            },
            on_delete: DeletePolicy::Restrict,
            embedded: None,
        }
    }

    /// Mark as composition: stored nested, deleted with its owner
    pub fn embedded(mut self) -> Self {
        self.embedded = Some(true);
        self.on_delete = DeletePolicy::Cascade;
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSchema {
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailView {
    pub group: String,
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSchema {
    /// Shown as a column in list views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<bool>,
    pub detail: DetailView,
}

/// One field of a generated schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSchema {
    pub name: String,
    /// `enum`, a primitive name, or the referenced class name
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditSchema>,
    pub view: ViewSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_key: Option<bool>,
}

impl AttributeSchema {
    pub fn is_optional(&self) -> bool {
        self.edit.is_some_and(|e| e.optional)
    }

    pub fn is_searchable(&self) -> bool {
        self.search.unwrap_or(false)
    }

    pub fn is_external_key(&self) -> bool {
        self.external_key.unwrap_or(false)
    }

    pub fn in_list(&self) -> bool {
        self.view.list.unwrap_or(false)
    }
}

/// Generated schema for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchema {
    pub name: String,
    pub icon: String,
    /// Template such as `{codice} - {nome}`
    pub title: String,
    pub attributes: Vec<AttributeSchema>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derives_from: Option<String>,
}

impl ClassSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Result of [`super::generate_schemas`]: one schema or all of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOutput {
    One(ClassSchema),
    All(Vec<ClassSchema>),
}

impl SchemaOutput {
    pub fn len(&self) -> usize {
        match self {
            SchemaOutput::One(_) => 1,
            SchemaOutput::All(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<ClassSchema> {
        match self {
            SchemaOutput::One(schema) => vec![schema],
            SchemaOutput::All(all) => all,
        }
    }
}
