//! # Type Expressions
//!
//! Field types in catalog documents are written as short expressions:
//!
//! ```text
//! expr      := primitive | container [ "<" expr ">" ] | record
//! primitive := "any" | "bool" | "int" | "float" | "str"
//! container := "list" | "tuple" | "set" | "map"
//! record    := identifier naming another record type
//! ```
//!
//! A container without an element type holds anything (`list` is
//! `list<any>`). Whitespace between tokens is ignored, so
//! `set< tuple<int> >` parses. Parsing and resolution are separate steps:
//! [`TypeExpr::parse`] only checks syntax, [`TypeExpr::resolve`] maps record
//! names to declared record types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use valobj_core::{FieldType, RecordType};

/// Malformed type expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at offset {offset} in '{expr}'")]
pub struct TypeExprError {
    /// The full expression text.
    pub expr: String,
    /// Byte offset where parsing stopped.
    pub offset: usize,
    /// What the parser expected.
    pub reason: String,
}

/// Parsed, unresolved field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Any,
    Bool,
    Int,
    Float,
    Str,
    List(Box<TypeExpr>),
    Tuple(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    /// Reference to a record type by name.
    Record(String),
}

impl TypeExpr {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns `TypeExprError` for empty input, unbalanced brackets, or
    /// trailing text after a complete expression.
    pub fn parse(text: &str) -> Result<Self, TypeExprError> {
        let mut parser = Parser { text, pos: 0 };
        let expr = parser.expr()?;
        parser.skip_whitespace();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Record names this expression refers to, outermost first.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Record(name) => out.push(name),
            Self::List(inner) | Self::Tuple(inner) | Self::Set(inner) | Self::Map(inner) => {
                inner.collect_references(out)
            }
            _ => {}
        }
    }

    /// Resolve record references through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns the first record name `lookup` does not know.
    pub fn resolve<F>(&self, lookup: &F) -> Result<FieldType, String>
    where
        F: Fn(&str) -> Option<Arc<RecordType>>,
    {
        Ok(match self {
            Self::Any => FieldType::Any,
            Self::Bool => FieldType::Bool,
            Self::Int => FieldType::Int,
            Self::Float => FieldType::Float,
            Self::Str => FieldType::Str,
            Self::List(inner) => FieldType::list_of(inner.resolve(lookup)?),
            Self::Tuple(inner) => FieldType::tuple_of(inner.resolve(lookup)?),
            Self::Set(inner) => FieldType::set_of(inner.resolve(lookup)?),
            Self::Map(inner) => FieldType::map_of(inner.resolve(lookup)?),
            Self::Record(name) => match lookup(name.as_str()) {
                Some(record) => FieldType::object(&record),
                None => return Err(name.clone()),
            },
        })
    }
}

impl From<&FieldType> for TypeExpr {
    fn from(ty: &FieldType) -> Self {
        fn inner(t: &FieldType) -> Box<TypeExpr> {
            Box::new(TypeExpr::from(t))
        }
        match ty {
            FieldType::Any => Self::Any,
            FieldType::Bool => Self::Bool,
            FieldType::Int => Self::Int,
            FieldType::Float => Self::Float,
            FieldType::Str => Self::Str,
            FieldType::List(t) => Self::List(inner(t)),
            FieldType::Tuple(t) => Self::Tuple(inner(t)),
            FieldType::Set(t) => Self::Set(inner(t)),
            FieldType::Map(t) => Self::Map(inner(t)),
            FieldType::Object(record) => Self::Record(record.name().to_string()),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::List(inner) => container(f, "list", inner),
            Self::Tuple(inner) => container(f, "tuple", inner),
            Self::Set(inner) => container(f, "set", inner),
            Self::Map(inner) => container(f, "map", inner),
            Self::Record(name) => f.write_str(name),
        }
    }
}

fn container(f: &mut fmt::Formatter<'_>, kind: &str, inner: &TypeExpr) -> fmt::Result {
    if *inner == TypeExpr::Any {
        f.write_str(kind)
    } else {
        write!(f, "{kind}<{inner}>")
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: &str) -> TypeExprError {
        TypeExprError {
            expr: self.text.to_string(),
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, TypeExprError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += c.len_utf8(),
            _ => return Err(self.error("expected a type name")),
        }
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            self.pos += c.len_utf8();
        }
        Ok(&self.text[start..self.pos])
    }

    fn expr(&mut self) -> Result<TypeExpr, TypeExprError> {
        let name = self.identifier()?;
        let container: fn(Box<TypeExpr>) -> TypeExpr = match name {
            "any" => return Ok(TypeExpr::Any),
            "bool" => return Ok(TypeExpr::Bool),
            "int" => return Ok(TypeExpr::Int),
            "float" => return Ok(TypeExpr::Float),
            "str" => return Ok(TypeExpr::Str),
            "list" => TypeExpr::List,
            "tuple" => TypeExpr::Tuple,
            "set" => TypeExpr::Set,
            "map" => TypeExpr::Map,
            record => return Ok(TypeExpr::Record(record.to_string())),
        };
        Ok(container(Box::new(self.element()?)))
    }

    /// Optional `<expr>` after a container keyword.
    fn element(&mut self) -> Result<TypeExpr, TypeExprError> {
        self.skip_whitespace();
        if self.peek() != Some('<') {
            return Ok(TypeExpr::Any);
        }
        self.pos += 1;
        let inner = self.expr()?;
        self.skip_whitespace();
        if self.peek() != Some('>') {
            return Err(self.error("expected '>'"));
        }
        self.pos += 1;
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_and_bare_containers() {
        assert_eq!(TypeExpr::parse("int").unwrap(), TypeExpr::Int);
        assert_eq!(TypeExpr::parse(" str ").unwrap(), TypeExpr::Str);
        assert_eq!(
            TypeExpr::parse("list").unwrap(),
            TypeExpr::List(Box::new(TypeExpr::Any))
        );
    }

    #[test]
    fn test_nested_containers() {
        let expr = TypeExpr::parse("set< tuple<int> >").unwrap();
        assert_eq!(
            expr,
            TypeExpr::Set(Box::new(TypeExpr::Tuple(Box::new(TypeExpr::Int))))
        );
        assert_eq!(expr.to_string(), "set<tuple<int>>");
    }

    #[test]
    fn test_record_references() {
        let expr: TypeExpr = "map<list<Person>>".parse().unwrap();
        assert_eq!(expr.references(), vec!["Person"]);
        assert!(TypeExpr::parse("list<int>").unwrap().references().is_empty());
    }

    #[test]
    fn test_malformed_expressions() {
        for bad in ["", "list<", "list<int", "list<>", "int int", "3d", "set<int>>"] {
            assert!(TypeExpr::parse(bad).is_err(), "accepted {bad:?}");
        }
        let err = TypeExpr::parse("list<int").unwrap_err();
        assert_eq!(err.offset, 8);
        assert_eq!(err.reason, "expected '>'");
    }

    #[test]
    fn test_resolve_against_lookup() {
        let person = RecordType::builder("Person")
            .field("name", FieldType::Str)
            .build()
            .unwrap();
        let lookup = |name: &str| (name == "Person").then(|| Arc::clone(&person));

        let ty = TypeExpr::parse("list<Person>").unwrap().resolve(&lookup).unwrap();
        assert_eq!(ty, FieldType::list_of(FieldType::object(&person)));
        assert_eq!(
            TypeExpr::parse("tuple<Nobody>").unwrap().resolve(&lookup),
            Err("Nobody".to_string())
        );
    }

    #[test]
    fn test_field_type_conversion_prints_back() {
        let ty = FieldType::map_of(FieldType::set_of(FieldType::Str));
        assert_eq!(TypeExpr::from(&ty).to_string(), "map<set<str>>");
        assert_eq!(TypeExpr::from(&FieldType::tuple()).to_string(), "tuple");
    }
}
