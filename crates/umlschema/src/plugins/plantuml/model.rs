//! Parsed class-diagram model
//!
//! Stores classes, interfaces, enums, relations and package names in
//! declaration order. Serializes to the camelCase JSON shape consumers expect.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::trace;

/// An attribute of a class or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: String,
    /// `= value` suffix from the declaration, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: attr_type.into(),
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A method of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub return_type: String,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
        }
    }
}

/// A class in the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    pub display_name: String,
    pub package: Option<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            package: None,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn in_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }
}

/// An interface in the diagram (attributes only, methods are not modeled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub package: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            attributes: Vec::new(),
        }
    }

    pub fn in_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// An enumeration; values keep declaration order, duplicates included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub package: Option<String>,
    pub values: Vec<String>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            values: Vec::new(),
        }
    }

    pub fn in_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }
}

/// Relation kinds between entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Inheritance,    // <|--
    Implementation, // <|..
    Composition,    // *--
    Aggregation,    // o--
    Association,    // -->, --
    Dependency,     // ..>
    Nested,         // +--
}

impl RelationKind {
    /// Every kind, in matcher priority order
    pub const ALL: [RelationKind; 7] = [
        RelationKind::Inheritance,
        RelationKind::Implementation,
        RelationKind::Composition,
        RelationKind::Aggregation,
        RelationKind::Association,
        RelationKind::Dependency,
        RelationKind::Nested,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Inheritance => "inheritance",
            RelationKind::Implementation => "implementation",
            RelationKind::Composition => "composition",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Association => "association",
            RelationKind::Dependency => "dependency",
            RelationKind::Nested => "nested",
        }
    }

    /// Text symbol for listings
    pub fn symbol(self) -> &'static str {
        match self {
            RelationKind::Inheritance => "◁───",
            RelationKind::Implementation => "◁···",
            RelationKind::Composition => "◆───",
            RelationKind::Aggregation => "◇───",
            RelationKind::Association => "───",
            RelationKind::Dependency => "···>",
            RelationKind::Nested => "⊕───",
        }
    }

    /// Drawn with a dashed stroke
    pub fn is_dashed(self) -> bool {
        matches!(self, RelationKind::Implementation | RelationKind::Dependency)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two entity names
///
/// Endpoints keep the order they were written in; they need not name
/// entities that exist in the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Does either endpoint name `entity`?
    pub fn touches(&self, entity: &str) -> bool {
        self.from == entity || self.to == entity
    }

    /// Does this relation join `a` and `b`, in either direction?
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ({})", self.from, self.kind.symbol(), self.to, self.kind)
    }
}

/// Entity and relation counts of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModelSummary {
    pub classes: usize,
    pub interfaces: usize,
    pub enums: usize,
    pub relations: usize,
    pub packages: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} classes · {} enums · {} interfaces · {} relations",
            self.classes, self.enums, self.interfaces, self.relations
        )
    }
}

/// Package and name filter over the entities of a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFilter {
    /// Keep only entities in this package; `None` keeps all
    pub package: Option<String>,
    /// Case-insensitive substring of the entity name; empty keeps all
    pub search: String,
}

impl ModelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn matches(&self, name: &str, package: Option<&str>) -> bool {
        let package_ok = match &self.package {
            Some(wanted) => package == Some(wanted.as_str()),
            None => true,
        };
        package_ok
            && (self.search.is_empty()
                || name.to_lowercase().contains(&self.search.to_lowercase()))
    }
}

/// Result of a parse: everything the diagram declared, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedModel {
    pub classes: Vec<Class>,
    pub interfaces: Vec<Interface>,
    pub enums: Vec<Enum>,
    pub relations: Vec<Relation>,
    pub packages: Vec<String>,
}

impl ParsedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: Class) {
        trace!(class = %class.name, "Adding class");
        self.classes.push(class);
    }

    pub fn add_interface(&mut self, interface: Interface) {
        trace!(interface = %interface.name, "Adding interface");
        self.interfaces.push(interface);
    }

    pub fn add_enum(&mut self, en: Enum) {
        trace!(enum_name = %en.name, "Adding enum");
        self.enums.push(en);
    }

    /// Record a package name unless it was seen before
    pub fn add_package(&mut self, name: &str) {
        if !self.packages.iter().any(|p| p == name) {
            self.packages.push(name.to_string());
        }
    }

    /// Append a relation unless the exact triple is already present
    ///
    /// Returns whether the relation was added.
    pub fn add_relation(&mut self, relation: Relation) -> bool {
        if self.relations.contains(&relation) {
            trace!(from = %relation.from, to = %relation.to, kind = %relation.kind, "Duplicate relation suppressed");
            return false;
        }
        self.relations.push(relation);
        true
    }

    pub fn get_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            classes: self.classes.len(),
            interfaces: self.interfaces.len(),
            enums: self.enums.len(),
            relations: self.relations.len(),
            packages: self.packages.len(),
        }
    }

    /// Node names for the layout engine: classes, then interfaces
    pub fn diagram_nodes(&self) -> Vec<&str> {
        self.classes
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.interfaces.iter().map(|i| i.name.as_str()))
            .collect()
    }

    /// Relations with `name` on either end, in model order
    pub fn relations_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations.iter().filter(move |r| r.touches(name))
    }

    /// A copy holding only the entities the filter accepts
    ///
    /// Relations and the package list are kept whole.
    pub fn filter(&self, filter: &ModelFilter) -> ParsedModel {
        ParsedModel {
            classes: self
                .classes
                .iter()
                .filter(|c| filter.matches(&c.name, c.package.as_deref()))
                .cloned()
                .collect(),
            interfaces: self
                .interfaces
                .iter()
                .filter(|i| filter.matches(&i.name, i.package.as_deref()))
                .cloned()
                .collect(),
            enums: self
                .enums
                .iter()
                .filter(|e| filter.matches(&e.name, e.package.as_deref()))
                .cloned()
                .collect(),
            relations: self.relations.clone(),
            packages: self.packages.clone(),
        }
    }

    /// Names declared by more than one class
    pub fn duplicate_class_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for class in &self.classes {
            if !seen.insert(class.name.as_str()) && !dups.contains(&class.name.as_str()) {
                dups.push(class.name.as_str());
            }
        }
        dups
    }
}
