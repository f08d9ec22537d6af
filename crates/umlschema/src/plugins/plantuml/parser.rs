//! PlantUML class-diagram parser
//!
//! Line-oriented and best-effort: every line is trimmed, classified against
//! the current [`ParserState`], and either contributes to the model or is
//! dropped. Nothing in the input can make the parse fail.

use chumsky::prelude::*;
use tracing::{debug, info, span, trace, warn, Level};

use super::model::{Attribute, Class, Enum, Interface, Method, ParsedModel};
use super::relations::RelationMatcher;
use crate::core::chumsky_utils::{
    inline_whitespace, inline_whitespace_required, quoted, rest_of_line, word,
};
use crate::core::Parser as CoreParser;

/// Return type recorded for methods declared without one
pub const VOID_TYPE: &str = "void";

/// Type recorded for attributes declared without one
pub const DEFAULT_ATTRIBUTE_TYPE: &str = "String";

/// Directive prefixes that carry no model information
const DIRECTIVE_PREFIXES: &[&str] = &[
    "'",
    "@startuml",
    "@enduml",
    "skinparam",
    "left to right",
    "top to bottom",
    "hide ",
    "!",
];

/// Index of an entity inside the model being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Class(usize),
    Interface(usize),
    Enum(usize),
}

/// Where the parser is while scanning lines
///
/// The enclosing package is tracked separately; it is orthogonal to these
/// states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// Top level; relation lines are recognised here
    Outside,
    /// A declaration without `{`; a lone `{` on the next line opens its body
    Declared(EntityRef),
    InClass(usize),
    InInterface(usize),
    InEnum(usize),
    /// Inside `note ... end note`; resumes the saved state afterwards
    InNote(Box<ParserState>),
    /// Inside a `/' ... '/` block comment
    InComment(Box<ParserState>),
}

impl ParserState {
    fn open_entity(&self) -> Option<EntityRef> {
        match self {
            ParserState::InClass(i) => Some(EntityRef::Class(*i)),
            ParserState::InInterface(i) => Some(EntityRef::Interface(*i)),
            ParserState::InEnum(i) => Some(EntityRef::Enum(*i)),
            _ => None,
        }
    }

    fn body_of(entity: EntityRef) -> Self {
        match entity {
            EntityRef::Class(i) => ParserState::InClass(i),
            EntityRef::Interface(i) => ParserState::InInterface(i),
            EntityRef::Enum(i) => ParserState::InEnum(i),
        }
    }
}

/// Name parts of a `class` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassHead {
    quoted: Option<String>,
    alias: Option<String>,
    bare: Option<String>,
}

impl ClassHead {
    fn name(&self) -> String {
        let raw = self
            .alias
            .as_deref()
            .or(self.quoted.as_deref())
            .or(self.bare.as_deref())
            .unwrap_or_default();
        raw.replace("\\n", "")
    }

    fn display_name(&self) -> String {
        self.quoted
            .clone()
            .or_else(|| self.bare.clone())
            .unwrap_or_default()
    }
}

/// `[abstract] class ("Display" as Alias | "Display" | Name) <rest>`
fn class_declaration<'src>() -> impl Parser<'src, &'src str, (ClassHead, &'src str)> {
    let aliased = quoted()
        .then_ignore(inline_whitespace_required())
        .then_ignore(just("as"))
        .then_ignore(inline_whitespace_required())
        .then(word())
        .map(|(display, alias)| ClassHead {
            quoted: Some(display),
            alias: Some(alias),
            bare: None,
        });
    let quoted_only = quoted().map(|display| ClassHead {
        quoted: Some(display),
        alias: None,
        bare: None,
    });
    let bare = word().map(|name| ClassHead {
        quoted: None,
        alias: None,
        bare: Some(name),
    });

    just("abstract")
        .then(inline_whitespace_required())
        .or_not()
        .then(just("class"))
        .then(inline_whitespace_required())
        .ignore_then(choice((aliased, quoted_only, bare)))
        .then(any().repeated().to_slice())
}

/// `<keyword> Name <rest>`
fn named_declaration<'src>(
    keyword: &'static str,
) -> impl Parser<'src, &'src str, (String, &'src str)> {
    just(keyword)
        .then(inline_whitespace_required())
        .ignore_then(word())
        .then(any().repeated().to_slice())
}

/// `name(params)[: returnType]`, matched from its start
fn method_signature<'src>() -> impl Parser<'src, &'src str, Method> {
    word()
        .then_ignore(inline_whitespace())
        .then_ignore(just('('))
        .then_ignore(none_of(')').repeated())
        .then_ignore(just(')'))
        .then(
            inline_whitespace()
                .ignore_then(just(':'))
                .ignore_then(inline_whitespace())
                .ignore_then(any().repeated().at_least(1).to_slice())
                .or_not(),
        )
        .then_ignore(rest_of_line())
        .map(|(name, ret): (String, Option<&str>)| {
            let ret = ret.map(str::trim).filter(|r| !r.is_empty());
            Method::new(name, ret.unwrap_or(VOID_TYPE))
        })
}

/// `name : type`, matched from its start
fn typed_attribute<'src>() -> impl Parser<'src, &'src str, (String, &'src str)> {
    word()
        .then_ignore(inline_whitespace())
        .then_ignore(just(':'))
        .then_ignore(inline_whitespace())
        .then(any().repeated().at_least(1).to_slice())
}

/// `[+-#~] name` with nothing else on the line
fn bare_attribute<'src>() -> impl Parser<'src, &'src str, String> {
    one_of("+-#~")
        .or_not()
        .ignore_then(inline_whitespace())
        .ignore_then(word())
        .then_ignore(inline_whitespace())
        .then_ignore(end())
}

/// Does `line` start with `keyword` followed by whitespace?
fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn is_class_declaration(line: &str) -> bool {
    if starts_with_keyword(line, "abstract") {
        let rest = line["abstract".len()..].trim_start();
        return starts_with_keyword(rest, "class");
    }
    starts_with_keyword(line, "class")
}

fn is_directive(line: &str) -> bool {
    DIRECTIVE_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn is_separator(line: &str) -> bool {
    line == ".."
        || line == "{"
        || line == "}"
        || line.starts_with("==")
        || line.starts_with("--")
        || line.starts_with("__")
}

/// `note : String` is an attribute named `note`, not a note
fn is_note_start(line: &str) -> bool {
    ["note ", "floating note "].iter().any(|prefix| {
        line.strip_prefix(prefix)
            .is_some_and(|rest| !rest.trim_start().starts_with(':'))
    })
}

/// `note left of A : text` and `note "text" as N` need no `end note`
///
/// The `::` of a member anchor (`note right of A::x`) is not a text separator.
fn is_single_line_note(line: &str) -> bool {
    line.replace("::", "").contains(':') || line.contains('"')
}

/// Does a trailing `}` close the enclosing body rather than a brace opened on the line?
fn closes_body(line: &str) -> bool {
    line.ends_with('}') && line.matches('}').count() > line.matches('{').count()
}

/// Split the raw text after an attribute's colon into `(type, default)`
fn clean_attribute_type(raw: &str) -> (String, Option<String>) {
    let without_comment = raw.split("//").next().unwrap_or_default().trim();
    let without_visibility = without_comment
        .strip_prefix(['+', '-', '#', '~'])
        .map(str::trim_start)
        .unwrap_or(without_comment);
    match without_visibility.split_once('=') {
        Some((ty, default)) => (ty.trim().to_string(), Some(default.trim().to_string())),
        None => (without_visibility.to_string(), None),
    }
}

/// Run `parser` at each position of `line`, leftmost match wins
fn find_in_line<'src, O>(
    parser: &impl Parser<'src, &'src str, O>,
    line: &'src str,
) -> Option<O> {
    line.char_indices()
        .find_map(|(offset, _)| parser.parse(&line[offset..]).into_result().ok())
}

/// One parse run: the state machine plus the model under construction
struct ParseSession<'src> {
    model: ParsedModel,
    state: ParserState,
    package: Option<String>,
    relations: RelationMatcher<'src>,
}

impl<'src> ParseSession<'src> {
    fn new() -> Self {
        Self {
            model: ParsedModel::new(),
            state: ParserState::Outside,
            package: None,
            relations: RelationMatcher::new(),
        }
    }

    fn finish(self) -> ParsedModel {
        match self.state {
            ParserState::Outside | ParserState::Declared(_) => {}
            ref open => debug!(state = ?open, "Input ended inside an open block"),
        }
        self.model
    }

    fn line(&mut self, line_no: usize, raw: &'src str) {
        let line = raw.trim();

        match &self.state {
            ParserState::InNote(resume) => {
                if line == "end note" {
                    self.state = (**resume).clone();
                }
                return;
            }
            ParserState::InComment(resume) => {
                if line.ends_with("'/") {
                    self.state = (**resume).clone();
                }
                return;
            }
            _ => {}
        }

        if line.is_empty() || is_directive(line) {
            return;
        }

        if line.starts_with("/'") {
            if !(line.len() > 3 && line.ends_with("'/")) {
                self.state = ParserState::InComment(Box::new(self.state.clone()));
            }
            return;
        }

        if is_note_start(line) {
            if !is_single_line_note(line) {
                trace!(line_no, "Entering note block");
                self.state = ParserState::InNote(Box::new(self.state.clone()));
            }
            return;
        }

        if let ParserState::Declared(entity) = self.state {
            if line == "{" {
                self.state = ParserState::body_of(entity);
                return;
            }
            self.state = ParserState::Outside;
        }

        if self.state == ParserState::Outside {
            if starts_with_keyword(line, "package") || starts_with_keyword(line, "namespace") {
                self.open_package(line_no, line);
                return;
            }
            if line == "}" && self.package.is_some() {
                trace!(line_no, package = ?self.package, "Closing package");
                self.package = None;
                return;
            }
        }

        if is_class_declaration(line) {
            self.declare_class(line_no, line);
            return;
        }
        if starts_with_keyword(line, "interface") {
            self.declare_interface(line_no, line);
            return;
        }
        if starts_with_keyword(line, "enum") {
            self.declare_enum(line_no, line);
            return;
        }

        if line == "}" {
            if self.state.open_entity().is_some() {
                self.state = ParserState::Outside;
            }
            return;
        }

        if self.state.open_entity().is_some() {
            self.body_line(line_no, line);
        } else if let Some(relation) = self.relations.match_line(line) {
            trace!(line_no, from = %relation.from, to = %relation.to, kind = %relation.kind, "Relation recognised");
            self.model.add_relation(relation);
        } else {
            trace!(line_no, line, "Line ignored");
        }
    }

    fn open_package(&mut self, line_no: usize, line: &str) {
        let keyword = if line.starts_with("package") {
            "package"
        } else {
            "namespace"
        };
        match named_declaration(keyword).parse(line).into_result() {
            Ok((name, _)) => {
                trace!(line_no, package = %name, "Opening package");
                self.model.add_package(&name);
                self.package = Some(name);
            }
            Err(_) => debug!(line_no, line, "Unnamed package ignored"),
        }
    }

    fn declare_class(&mut self, line_no: usize, line: &'src str) {
        let Ok((head, rest)) = class_declaration().parse(line).into_result() else {
            debug!(line_no, line, "Class line without a usable name ignored");
            return;
        };
        let class = Class::new(head.name())
            .with_display_name(head.display_name())
            .in_package(self.package.clone());
        trace!(line_no, class = %class.name, "Class declared");
        self.model.add_class(class);
        self.enter(EntityRef::Class(self.model.classes.len() - 1), line_no, rest);
    }

    fn declare_interface(&mut self, line_no: usize, line: &'src str) {
        let Ok((name, rest)) = named_declaration("interface").parse(line).into_result() else {
            debug!(line_no, line, "Interface line without a name ignored");
            return;
        };
        trace!(line_no, interface = %name, "Interface declared");
        self.model
            .add_interface(Interface::new(name).in_package(self.package.clone()));
        self.enter(EntityRef::Interface(self.model.interfaces.len() - 1), line_no, rest);
    }

    fn declare_enum(&mut self, line_no: usize, line: &'src str) {
        let Ok((name, rest)) = named_declaration("enum").parse(line).into_result() else {
            debug!(line_no, line, "Enum line without a name ignored");
            return;
        };
        trace!(line_no, enum_name = %name, "Enum declared");
        self.model
            .add_enum(Enum::new(name).in_package(self.package.clone()));
        self.enter(EntityRef::Enum(self.model.enums.len() - 1), line_no, rest);
    }

    /// Open the body if the declaration carries `{`, and parse any text after it
    fn enter(&mut self, entity: EntityRef, line_no: usize, rest: &'src str) {
        match rest.split_once('{') {
            Some((_, inline)) => {
                self.state = ParserState::body_of(entity);
                let inline = inline.trim();
                if !inline.is_empty() {
                    self.body_line(line_no, inline);
                }
            }
            None => self.state = ParserState::Declared(entity),
        }
    }

    /// A line inside an open body; an unbalanced trailing `}` closes the body after it
    fn body_line(&mut self, line_no: usize, line: &'src str) {
        let (content, closes) = match line.strip_suffix('}') {
            Some(content) if closes_body(line) => (content.trim(), true),
            _ => (line, false),
        };

        if !content.is_empty() && !is_separator(content) {
            match self.state.open_entity() {
                Some(EntityRef::Class(i)) => self.class_member(line_no, i, content),
                Some(EntityRef::Interface(i)) => self.interface_member(line_no, i, content),
                Some(EntityRef::Enum(i)) => self.enum_value(line_no, i, content),
                None => {}
            }
        }

        if closes {
            self.state = ParserState::Outside;
        }
    }

    fn class_member(&mut self, line_no: usize, index: usize, line: &'src str) {
        if line.contains('(') && line.contains(')') {
            match find_in_line(&method_signature(), line) {
                Some(method) => {
                    trace!(line_no, method = %method.name, "Method parsed");
                    self.model.classes[index].add_method(method);
                }
                None => debug!(line_no, line, "Unrecognised method line"),
            }
            return;
        }
        if let Some(attribute) = Self::attribute(line_no, line) {
            self.model.classes[index].add_attribute(attribute);
        }
    }

    fn interface_member(&mut self, line_no: usize, index: usize, line: &'src str) {
        if line.contains('(') && line.contains(')') {
            trace!(line_no, "Interface method skipped");
            return;
        }
        if let Some(attribute) = Self::attribute(line_no, line) {
            self.model.interfaces[index].attributes.push(attribute);
        }
    }

    fn attribute(line_no: usize, line: &'src str) -> Option<Attribute> {
        if line.contains(':') {
            let Some((name, raw_type)) = find_in_line(&typed_attribute(), line) else {
                debug!(line_no, line, "Unrecognised attribute line");
                return None;
            };
            let (attr_type, default) = clean_attribute_type(raw_type);
            let attribute = Attribute::new(name, attr_type);
            trace!(line_no, attribute = %attribute.name, attr_type = %attribute.attr_type, "Attribute parsed");
            return Some(match default {
                Some(value) => attribute.with_default(value),
                None => attribute,
            });
        }
        match bare_attribute().parse(line).into_result() {
            Ok(name) => Some(Attribute::new(name, DEFAULT_ATTRIBUTE_TYPE)),
            Err(_) => {
                debug!(line_no, line, "Unrecognised attribute line");
                None
            }
        }
    }

    fn enum_value(&mut self, line_no: usize, index: usize, line: &str) {
        if line.contains(':') {
            trace!(line_no, line, "Enum metadata line skipped");
            return;
        }
        let unbracketed: String = line.chars().filter(|c| *c != '[' && *c != ']').collect();
        let value = unbracketed.split("//").next().unwrap_or_default().trim();
        if !value.is_empty() {
            trace!(line_no, value, "Enum value parsed");
            self.model.enums[index].values.push(value.to_string());
        }
    }
}

/// Parser for the practical subset of PlantUML class diagrams
pub struct PlantUmlParser;

impl PlantUmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlantUmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser for PlantUmlParser {
    type Output = ParsedModel;

    fn parse(&self, input: &str) -> ParsedModel {
        let parse_span = span!(Level::INFO, "parse_plantuml", input_len = input.len());
        let _enter = parse_span.enter();

        let mut session = ParseSession::new();
        for (line_no, line) in input.lines().enumerate() {
            session.line(line_no + 1, line);
        }
        let model = session.finish();

        {
            let duplicates = model.duplicate_class_names();
            if !duplicates.is_empty() {
                warn!(?duplicates, "Class names declared more than once");
            }
        }
        info!(
            classes = model.classes.len(),
            interfaces = model.interfaces.len(),
            enums = model.enums.len(),
            relations = model.relations.len(),
            packages = model.packages.len(),
            "Parsing completed"
        );
        model
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        let relations = RelationMatcher::new();
        input.lines().map(str::trim).any(|line| {
            line.starts_with("@startuml")
                || is_class_declaration(line)
                || starts_with_keyword(line, "interface")
                || starts_with_keyword(line, "enum")
                || relations.match_line(line).is_some()
        })
    }
}
