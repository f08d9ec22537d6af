//! Name-based inference tables for schema generation
//!
//! Titles, list columns, search and external-key flags, detail groups and
//! field components are all decided by matching attribute names against the
//! keyword lists below. They are plain data so a JSON file can extend them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::UmlError;

/// `contains` substring in an attribute name selects `group`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub contains: String,
    pub group: String,
}

impl GroupRule {
    pub fn new(contains: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
            group: group.into(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaHeuristics {
    pub icon: String,
    /// Title used when no code-like attribute exists
    pub fallback_title: String,
    /// Lower-cased attribute name containing one of these is the title code
    pub title_code_contains: Vec<String>,
    /// Lower-cased attribute name equal to one of these is the title name
    pub title_name_equals: Vec<String>,
    pub list_names: Vec<String>,
    pub search_names: Vec<String>,
    pub external_key_names: Vec<String>,
    /// Checked in order, first match wins
    pub group_rules: Vec<GroupRule>,
    pub default_group: String,
    /// Keys are lower-case type names
    pub primitives: BTreeMap<String, String>,
    pub default_primitive: String,
    /// Field type to detail component
    pub components: BTreeMap<String, String>,
    pub enum_component: String,
    pub relation_component: String,
    pub default_component: String,
}

impl Default for SchemaHeuristics {
    fn default() -> Self {
        Self {
            icon: "file".to_string(),
            fallback_title: "{id}".to_string(),
            title_code_contains: strings(&["codice"]),
            title_name_equals: strings(&["nome", "name", "descrizione"]),
            list_names: strings(&["code", "codice", "nome", "name"]),
            search_names: strings(&["nome", "name", "descrizione", "code", "codice"]),
            external_key_names: strings(&["code", "codice"]),
            group_rules: vec![
                GroupRule::new("descrizione", "textinfo"),
                GroupRule::new("prezzo", "quantitativeinfo"),
                GroupRule::new("peso", "quantitativeinfo"),
            ],
            default_group: "general".to_string(),
            primitives: table(&[
                ("string", "string"),
                ("int", "number"),
                ("integer", "number"),
                ("bool", "boolean"),
                ("boolean", "boolean"),
                ("date", "date"),
                ("json", "json"),
            ]),
            default_primitive: "string".to_string(),
            components: table(&[
                ("string", "string-field"),
                ("number", "number-field"),
                ("boolean", "boolean-field"),
                ("date", "date-field"),
                ("json", "json-field"),
            ]),
            enum_component: "enum-field".to_string(),
            relation_component: "relation-field".to_string(),
            default_component: "string-field".to_string(),
        }
    }
}

impl SchemaHeuristics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides; keys not present keep their defaults
    pub fn from_json(json: &str) -> Result<Self, UmlError> {
        let mut heuristics: Self = serde_json::from_str(json)
            .map_err(|e| UmlError::invalid_heuristics(e.to_string()))?;
        heuristics.primitives = heuristics
            .primitives
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Ok(heuristics)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, UmlError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Is this lower-cased name a title code candidate?
    pub fn is_title_code(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.title_code_contains.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn is_title_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.title_name_equals.iter().any(|k| *k == lower)
    }

    pub fn is_list(&self, field_name: &str) -> bool {
        self.list_names.iter().any(|k| k == field_name)
    }

    pub fn is_searchable(&self, field_name: &str) -> bool {
        self.search_names.iter().any(|k| k == field_name)
    }

    pub fn is_external_key(&self, field_name: &str) -> bool {
        self.external_key_names.iter().any(|k| k == field_name)
    }

    pub fn group_for(&self, field_name: &str) -> &str {
        self.group_rules
            .iter()
            .find(|rule| field_name.contains(rule.contains.as_str()))
            .map_or(self.default_group.as_str(), |rule| rule.group.as_str())
    }

    /// Primitive classification of a type name, if it is a known one
    pub fn primitive_for(&self, type_name: &str) -> Option<&str> {
        self.primitives
            .get(&type_name.to_lowercase())
            .map(String::as_str)
    }

    pub fn component_for(&self, field_type: &str, is_enum: bool, is_relation: bool) -> &str {
        if is_enum {
            return &self.enum_component;
        }
        if is_relation {
            return &self.relation_component;
        }
        self.components
            .get(field_type)
            .map_or(self.default_component.as_str(), String::as_str)
    }
}
