use crate::intern::{self, SymbolId};
use crate::number::Number;
use crate::quote::{self, Quote};
use crate::token::Position;
use crate::unicode::json_stringify;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType
{
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Symbol,
    Word,
    Quote,
    Error,
}

impl ValueType
{
    pub const COUNT: usize = 10;

    pub const ALL: [ValueType; ValueType::COUNT] = [
        ValueType::Null,
        ValueType::Boolean,
        ValueType::Number,
        ValueType::String,
        ValueType::Array,
        ValueType::Object,
        ValueType::Symbol,
        ValueType::Word,
        ValueType::Quote,
        ValueType::Error,
    ];

    pub fn name(self) -> &'static str
    {
        match self
        {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Symbol => "symbol",
            ValueType::Word => "word",
            ValueType::Quote => "quote",
            ValueType::Error => "error",
        }
    }
}

impl fmt::Display for ValueType
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode
{
    Syntax = 1,
    Reference = 2,
    Type = 3,
    Value = 4,
    Range = 5,
    Import = 6,
    IO = 7,
    Unknown = 100,
}

impl ErrorCode
{
    pub fn as_number(self) -> i64
    {
        self as i64
    }

    pub fn description(self) -> &'static str
    {
        match self
        {
            ErrorCode::Syntax => "syntax error",
            ErrorCode::Reference => "reference error",
            ErrorCode::Type => "type error",
            ErrorCode::Value => "value error",
            ErrorCode::Range => "range error",
            ErrorCode::Import => "import error",
            ErrorCode::IO => "i/o error",
            ErrorCode::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for ErrorCode
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(self.description())
    }
}

/// Error latched into a context's error slot. Equality compares the code and
/// the message; the source position is diagnostic only.
#[derive(Debug, Clone)]
pub struct PlorthError
{
    pub code: ErrorCode,
    pub message: Rc<String>,
    pub position: Option<Position>,
}

impl PlorthError
{
    pub fn new(code: ErrorCode, message: &str) -> Self
    {
        Self {
            code,
            message: intern::intern(message),
            position: None,
        }
    }

    pub fn with_position(code: ErrorCode, message: &str, position: Position) -> Self
    {
        Self {
            code,
            message: intern::intern(message),
            position: Some(position),
        }
    }
}

impl PartialEq for PlorthError
{
    fn eq(&self, other: &Self) -> bool
    {
        self.code == other.code && self.message == other.message
    }
}

impl fmt::Display for PlorthError
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}", self.code)?;
        if !self.message.is_empty()
        {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Objects map string keys to values in insertion order. The prototype slot
/// is `None` only for the root object prototype; everything else points at
/// another object that method lookup falls back to.
#[derive(Debug)]
pub struct Object
{
    pub properties: IndexMap<Rc<String>, Value>,
    pub prototype: Option<Rc<Object>>,
}

impl Object
{
    pub fn new(properties: IndexMap<Rc<String>, Value>, prototype: Option<Rc<Object>>) -> Self
    {
        Self {
            properties,
            prototype,
        }
    }

    /// Own property lookup.
    pub fn own_property(&self, name: &str) -> Option<Value>
    {
        self.properties.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v.clone())
    }

    /// Property lookup through the prototype chain.
    pub fn property(&self, name: &str) -> Option<Value>
    {
        if let Some(value) = self.properties.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v.clone())
        {
            return Some(value);
        }

        let mut current = self.prototype.clone();

        while let Some(object) = current
        {
            if let Some(value) = object.properties.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v.clone())
            {
                return Some(value);
            }
            current = object.prototype.clone();
        }
        None
    }
}

impl PartialEq for Object
{
    fn eq(&self, other: &Self) -> bool
    {
        if self.properties.len() != other.properties.len()
        {
            return false;
        }
        self.properties
            .iter()
            .all(|(key, value)| other.properties.get(key) == Some(value))
    }
}

/// A named binding: executing a word installs its quote into the local
/// dictionary under the symbol's identifier.
#[derive(Debug)]
pub struct Word
{
    pub symbol: SymbolId,
    pub quote: Rc<Quote>,
}

impl PartialEq for Word
{
    fn eq(&self, other: &Self) -> bool
    {
        self.symbol == other.symbol && quote::quotes_equal(&self.quote, &other.quote)
    }
}

#[derive(Debug, Clone)]
pub enum Value
{
    Null,
    Boolean(bool),
    Number(Number),
    String(Rc<String>),
    Array(Rc<Vec<Value>>),
    Object(Rc<Object>),
    Symbol(SymbolId),
    Word(Rc<Word>),
    Quote(Rc<Quote>),
    Error(Rc<PlorthError>),
}

impl Value
{
    pub fn kind(&self) -> ValueType
    {
        match self
        {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
            Value::Symbol(_) => ValueType::Symbol,
            Value::Word(_) => ValueType::Word,
            Value::Quote(_) => ValueType::Quote,
            Value::Error(_) => ValueType::Error,
        }
    }

    pub fn is(&self, kind: ValueType) -> bool
    {
        self.kind() == kind
    }

    /// Human readable form; strings appear without quotes and null is empty.
    pub fn to_display(&self) -> String
    {
        match self
        {
            Value::Null => String::new(),
            Value::Boolean(value) => value.to_string(),
            Value::Number(value) => value.to_string(),
            Value::String(value) => value.as_str().to_string(),
            Value::Array(elements) =>
            {
                let parts: Vec<String> = elements.iter().map(|e| e.to_display()).collect();

                parts.join(", ")
            }
            Value::Object(_) => self.to_source(),
            Value::Symbol(id) => intern::symbol_name(*id).as_str().to_string(),
            Value::Word(_) => self.to_source(),
            Value::Quote(_) => self.to_source(),
            Value::Error(error) => error.to_string(),
        }
    }

    /// Source form: re-parsing the result yields an equal value, except for
    /// native quotes which render an opaque placeholder.
    pub fn to_source(&self) -> String
    {
        match self
        {
            Value::Null => "null".to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::Number(value) => value.to_source(),
            Value::String(value) => json_stringify(value),
            Value::Array(elements) =>
            {
                let parts: Vec<String> = elements.iter().map(|e| e.to_source()).collect();

                format!("[{}]", parts.join(", "))
            }
            Value::Object(object) =>
            {
                let parts: Vec<String> = object
                    .properties
                    .iter()
                    .map(|(key, value)| format!("{}: {}", json_stringify(key), value.to_source()))
                    .collect();

                format!("{{{}}}", parts.join(", "))
            }
            Value::Symbol(id) => intern::symbol_name(*id).as_str().to_string(),
            Value::Word(word) => format!(
                ": {} {} ;",
                intern::symbol_name(word.symbol),
                word.quote.to_source()
            ),
            Value::Quote(quote) => quote.to_source(),
            Value::Error(error) => format!("<{}>", error),
        }
    }
}

impl PartialEq for Value
{
    fn eq(&self, other: &Self) -> bool
    {
        match (self, other)
        {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Word(a), Value::Word(b)) => a == b,
            (Value::Quote(a), Value::Quote(b)) => quote::quotes_equal(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(&self.to_display())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn type_names()
    {
        assert_eq!(Value::Null.kind().name(), "null");
        assert_eq!(Value::Boolean(true).kind().name(), "boolean");
        assert_eq!(Value::Number(Number::Int(1)).kind().name(), "number");
    }

    #[test]
    fn error_equality_ignores_position()
    {
        let a = PlorthError::new(ErrorCode::Range, "Stack underflow.");
        let b = PlorthError::with_position(
            ErrorCode::Range,
            "Stack underflow.",
            Position {
                filename: intern::intern("<test>"),
                line: 3,
                column: 9,
            },
        );
        assert_eq!(a, b);
        assert_ne!(a, PlorthError::new(ErrorCode::Type, "Stack underflow."));
    }

    #[test]
    fn object_property_walks_prototype_chain()
    {
        let root = Rc::new(Object::new(
            IndexMap::from_iter([(intern::intern("a"), Value::Number(Number::Int(1)))]),
            None,
        ));
        let child = Object::new(
            IndexMap::from_iter([(intern::intern("b"), Value::Number(Number::Int(2)))]),
            Some(root),
        );

        assert_eq!(child.property("b"), Some(Value::Number(Number::Int(2))));
        assert_eq!(child.property("a"), Some(Value::Number(Number::Int(1))));
        assert_eq!(child.own_property("a"), None);
        assert_eq!(child.property("c"), None);
    }

    #[test]
    fn object_equality_is_order_insensitive()
    {
        let a = Object::new(
            IndexMap::from_iter([
                (intern::intern("x"), Value::Number(Number::Int(1))),
                (intern::intern("y"), Value::Number(Number::Int(2))),
            ]),
            None,
        );
        let b = Object::new(
            IndexMap::from_iter([
                (intern::intern("y"), Value::Number(Number::Int(2))),
                (intern::intern("x"), Value::Number(Number::Int(1))),
            ]),
            None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn array_source_form()
    {
        let value = Value::Array(Rc::new(vec![
            Value::Number(Number::Int(1)),
            Value::String(intern::intern("a\"b")),
            Value::Null,
        ]));
        assert_eq!(value.to_source(), "[1, \"a\\\"b\", null]");
    }

    #[test]
    fn error_source_form()
    {
        let value = Value::Error(Rc::new(PlorthError::new(
            ErrorCode::Range,
            "Cannot reduce empty array.",
        )));
        assert_eq!(value.to_source(), "<range error: Cannot reduce empty array.>");
    }
}
