//! Parsed model to entity schema conversion
//!
//! Each class becomes a [`ClassSchema`] whose attributes are flattened from
//! its ancestors and implemented interfaces, then classified as enum,
//! relation or primitive fields.

use std::collections::HashMap;

use tracing::{debug, info, span, trace, warn, Level};

use super::heuristics::SchemaHeuristics;
use super::types::{
    AttributeSchema, ClassSchema, DetailView, EditSchema, Permissions, RelationSchema, ViewSchema,
};
use crate::core::UmlError;
use crate::plugins::plantuml::{Attribute, Class, Enum, Interface, ParsedModel, RelationKind};

/// Base type and multiplicity flags of an attribute type such as `Riga[1..n]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec<'a> {
    pub base: &'a str,
    pub optional: bool,
    pub many: bool,
}

impl<'a> TypeSpec<'a> {
    /// Split a trailing `[card]` off `raw`
    ///
    /// A cardinality starting with `0` is optional; one containing `n` or `*`
    /// is many-valued. Types without a non-empty trailing bracket are
    /// singular and required.
    pub fn parse(raw: &'a str) -> Self {
        let plain = Self {
            base: raw,
            optional: false,
            many: false,
        };
        let Some(inner) = raw.strip_suffix(']') else {
            return plain;
        };
        let found = inner
            .char_indices()
            .skip(1)
            .filter(|(_, c)| *c == '[')
            .map(|(i, _)| (&inner[..i], &inner[i + 1..]))
            .find(|(_, card)| !card.is_empty());

        match found {
            Some((base, card)) => Self {
                base: base.trim(),
                optional: card.starts_with('0'),
                many: card.contains('n') || card.contains('*'),
            },
            None => plain,
        }
    }
}

/// Lower-case the first character only
pub fn to_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts the classes of one [`ParsedModel`]
///
/// Lookups are built once at construction; the model is only borrowed.
pub struct SchemaConverter<'m> {
    model: &'m ParsedModel,
    heuristics: SchemaHeuristics,
    classes: HashMap<&'m str, &'m Class>,
    enums: HashMap<&'m str, &'m Enum>,
    interfaces: HashMap<&'m str, &'m Interface>,
    parents: HashMap<&'m str, &'m str>,
}

impl<'m> SchemaConverter<'m> {
    pub fn new(model: &'m ParsedModel) -> Self {
        Self::with_heuristics(model, SchemaHeuristics::default())
    }

    pub fn with_heuristics(model: &'m ParsedModel, heuristics: SchemaHeuristics) -> Self {
        let classes = model.classes.iter().map(|c| (c.name.as_str(), c)).collect();
        let enums = model.enums.iter().map(|e| (e.name.as_str(), e)).collect();
        let interfaces = model
            .interfaces
            .iter()
            .map(|i| (i.name.as_str(), i))
            .collect();

        let mut parents = HashMap::new();
        for relation in model
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Inheritance)
        {
            let parent = parents
                .entry(relation.from.as_str())
                .or_insert(relation.to.as_str());
            if *parent != relation.to {
                debug!(child = %relation.from, kept = %parent, ignored = %relation.to, "Second parent ignored");
            }
        }

        Self {
            model,
            heuristics,
            classes,
            enums,
            interfaces,
            parents,
        }
    }

    pub fn heuristics(&self) -> &SchemaHeuristics {
        &self.heuristics
    }

    /// Parent recorded for `class`, if any
    pub fn parent_of(&self, class: &str) -> Option<&'m str> {
        self.parents.get(class).copied()
    }

    /// Convert every class in model order
    pub fn convert(&self) -> Result<Vec<ClassSchema>, UmlError> {
        let convert_span = span!(Level::INFO, "convert", classes = self.model.classes.len());
        let _enter = convert_span.enter();

        let schemas = self
            .model
            .classes
            .iter()
            .map(|class| self.convert_class(class))
            .collect::<Result<Vec<_>, _>>()?;

        info!(schemas = schemas.len(), "Schema conversion completed");
        Ok(schemas)
    }

    /// Convert the first class named `name`
    pub fn convert_one(&self, name: &str) -> Result<ClassSchema, UmlError> {
        let class = self
            .model
            .get_class(name)
            .ok_or_else(|| UmlError::class_not_found(name))?;
        self.convert_class(class)
    }

    pub fn convert_class(&self, class: &Class) -> Result<ClassSchema, UmlError> {
        let mut chain = Vec::new();
        let attributes = self.flatten(class, &mut chain)?;
        debug!(class = %class.name, attributes = attributes.len(), "Class converted");

        Ok(ClassSchema {
            name: class.name.clone(),
            icon: self.heuristics.icon.clone(),
            title: self.title(class),
            attributes,
            permissions: Permissions::default(),
            derives_from: self.parent_of(&class.name).map(str::to_string),
        })
    }

    /// Ancestors first, then implemented interfaces, then own attributes
    fn flatten(
        &self,
        class: &Class,
        chain: &mut Vec<String>,
    ) -> Result<Vec<AttributeSchema>, UmlError> {
        if chain.contains(&class.name) {
            let mut walk = chain.clone();
            walk.push(class.name.clone());
            return Err(UmlError::cyclic_inheritance(&class.name, walk));
        }
        chain.push(class.name.clone());

        let mut attributes = Vec::new();

        if let Some(parent) = self.parent_of(&class.name) {
            match self.classes.get(parent) {
                Some(parent_class) => attributes.extend(self.flatten(parent_class, chain)?),
                None => warn!(class = %class.name, parent, "Parent is not a known class"),
            }
        }

        for relation in self
            .model
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Implementation && r.to == class.name)
        {
            match self.interfaces.get(relation.from.as_str()) {
                Some(interface) => attributes.extend(
                    interface
                        .attributes
                        .iter()
                        .map(|a| self.convert_attribute(a, &class.name)),
                ),
                None => trace!(class = %class.name, interface = %relation.from, "Implemented interface not declared"),
            }
        }

        attributes.extend(
            class
                .attributes
                .iter()
                .map(|a| self.convert_attribute(a, &class.name)),
        );

        chain.pop();
        Ok(attributes)
    }

    fn convert_attribute(&self, attribute: &Attribute, owner: &str) -> AttributeSchema {
        let spec = TypeSpec::parse(&attribute.attr_type);
        let name = to_camel(&attribute.name);
        let heuristics = &self.heuristics;

        let (field_type, enum_values, relation) = if let Some(en) = self.enums.get(spec.base) {
            ("enum".to_string(), Some(en.values.clone()), None)
        } else if self.classes.contains_key(spec.base) {
            let relation = self.relation(owner, spec.base, spec.many);
            (spec.base.to_string(), None, Some(relation))
        } else {
            let primitive = heuristics.primitive_for(spec.base).unwrap_or_else(|| {
                warn!(attribute = %attribute.name, type_name = spec.base, "Unknown type mapped to default primitive");
                heuristics.default_primitive.as_str()
            });
            (primitive.to_string(), None, None)
        };

        let component = heuristics
            .component_for(&field_type, enum_values.is_some(), relation.is_some())
            .to_string();
        let view = ViewSchema {
            list: heuristics.is_list(&name).then_some(true),
            detail: DetailView {
                group: heuristics.group_for(&name).to_string(),
                component,
            },
        };

        AttributeSchema {
            search: heuristics.is_searchable(&name).then_some(true),
            external_key: heuristics.is_external_key(&name).then_some(true),
            edit: spec.optional.then_some(EditSchema { optional: true }),
            name,
            field_type,
            enum_values,
            relation,
            view,
        }
    }

    /// Any composition between the two classes makes the relation embedded
    fn relation(&self, owner: &str, target: &str, many: bool) -> RelationSchema {
        let relation = RelationSchema::new(many);
        let composed = self
            .model
            .relations
            .iter()
            .any(|r| r.kind == RelationKind::Composition && r.joins(owner, target));
        if composed {
            relation.embedded()
        } else {
            relation
        }
    }

    fn title(&self, class: &Class) -> String {
        let code = class
            .attributes
            .iter()
            .find(|a| self.heuristics.is_title_code(&a.name));
        let name = class
            .attributes
            .iter()
            .find(|a| self.heuristics.is_title_name(&a.name));

        match (code, name) {
            (Some(code), Some(name)) => {
                format!("{{{}}} - {{{}}}", to_camel(&code.name), to_camel(&name.name))
            }
            (Some(code), None) => format!("{{{}}}", to_camel(&code.name)),
            _ => self.heuristics.fallback_title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::plantuml::Relation;

    #[test]
    fn test_type_spec() {
        assert_eq!(
            TypeSpec::parse("Stato[0..1]"),
            TypeSpec { base: "Stato", optional: true, many: false }
        );
        assert_eq!(
            TypeSpec::parse("Riga [1..n]"),
            TypeSpec { base: "Riga", optional: false, many: true }
        );
        assert_eq!(
            TypeSpec::parse("Tag[0..*]"),
            TypeSpec { base: "Tag", optional: true, many: true }
        );
        assert_eq!(
            TypeSpec::parse("String"),
            TypeSpec { base: "String", optional: false, many: false }
        );
        assert_eq!(TypeSpec::parse("Foo[]").base, "Foo[]");
        assert_eq!(TypeSpec::parse("[1]").base, "[1]");
    }

    #[test]
    fn test_to_camel() {
        assert_eq!(to_camel("CodiceFiscale"), "codiceFiscale");
        assert_eq!(to_camel("nome"), "nome");
        assert_eq!(to_camel("URL"), "uRL");
        assert_eq!(to_camel(""), "");
    }

    #[test]
    fn test_first_parent_wins() {
        let mut model = ParsedModel::new();
        model.add_class(Class::new("A"));
        model.add_relation(Relation::new("A", "B", RelationKind::Inheritance));
        model.add_relation(Relation::new("A", "C", RelationKind::Inheritance));
        let converter = SchemaConverter::new(&model);
        assert_eq!(converter.parent_of("A"), Some("B"));
        assert_eq!(converter.parent_of("B"), None);
    }

    #[test]
    fn test_own_attributes_only() {
        let mut model = ParsedModel::new();
        model.add_class(
            Class::new("Cliente")
                .with_attribute(Attribute::new("Nome", "String"))
                .with_attribute(Attribute::new("eta", "int")),
        );
        let schema = SchemaConverter::new(&model).convert_one("Cliente").unwrap();
        let names: Vec<_> = schema.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["nome", "eta"]);
        assert_eq!(schema.attributes[1].field_type, "number");
        assert_eq!(schema.title, "{id}");
        assert_eq!(schema.icon, "file");
        assert_eq!(schema.derives_from, None);
    }

    #[test]
    fn test_title_variants() {
        let mut model = ParsedModel::new();
        model.add_class(
            Class::new("A")
                .with_attribute(Attribute::new("Descrizione", "String"))
                .with_attribute(Attribute::new("CodiceArticolo", "String")),
        );
        model.add_class(Class::new("B").with_attribute(Attribute::new("codice", "String")));
        let converter = SchemaConverter::new(&model);
        assert_eq!(
            converter.convert_one("A").unwrap().title,
            "{codiceArticolo} - {descrizione}"
        );
        assert_eq!(converter.convert_one("B").unwrap().title, "{codice}");
    }

    #[test]
    fn test_unknown_type_defaults_to_string() {
        let mut model = ParsedModel::new();
        model.add_class(Class::new("A").with_attribute(Attribute::new("prezzo", "Decimal")));
        let schema = SchemaConverter::new(&model).convert_one("A").unwrap();
        let prezzo = &schema.attributes[0];
        assert_eq!(prezzo.field_type, "string");
        assert_eq!(prezzo.view.detail.group, "quantitativeinfo");
        assert_eq!(prezzo.view.detail.component, "string-field");
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut model = ParsedModel::new();
        model.add_class(Class::new("A"));
        model.add_class(Class::new("B"));
        model.add_relation(Relation::new("A", "B", RelationKind::Inheritance));
        model.add_relation(Relation::new("B", "A", RelationKind::Inheritance));
        match SchemaConverter::new(&model).convert() {
            Err(UmlError::CyclicInheritance { class, chain }) => {
                assert_eq!(class, "A");
                assert_eq!(chain, vec!["A", "B", "A"]);
            }
            other => panic!("expected cyclic inheritance, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_class() {
        let model = ParsedModel::new();
        let err = SchemaConverter::new(&model).convert_one("Ghost").unwrap_err();
        assert_eq!(err.to_string(), "Class not found: Ghost");
    }
}
