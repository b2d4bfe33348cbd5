// ABOUTME: Runtime value hierarchy -- the polymorphic values Zox programs
// compute with, plus the Dict/Table containers and Function representation.

use crate::ast::Stmt;
use crate::env::Environment;
use crate::error::ZoxError;
use crate::hash;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const INITIAL_CAPACITY: usize = 16;
const LOAD_FACTOR: f64 = 0.75;

/// A separate-chaining hash table keyed by stringified values (spec §3.3).
/// Each bucket preserves insertion order, matching the reference
/// implementation's append-to-chain-tail behavior.
#[derive(Debug, Clone)]
pub struct Dict {
    buckets: Vec<Vec<(Box<str>, Value)>>,
    len: usize,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            buckets: vec![Vec::new(); INITIAL_CAPACITY],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let slot = hash::slot(key.as_bytes(), self.buckets.len());
        self.buckets[slot].iter().find(|(k, _)| k.as_ref() == key).map(|(_, v)| v)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        let slot = hash::slot(key.as_bytes(), self.buckets.len());
        if let Some(entry) = self.buckets[slot].iter_mut().find(|(k, _)| k.as_ref() == key) {
            entry.1 = value;
            return;
        }
        self.buckets[slot].push((key.into(), value));
        self.len += 1;
        if self.len as f64 / self.buckets.len() as f64 > LOAD_FACTOR {
            self.resize();
        }
    }

    fn resize(&mut self) {
        let new_capacity = self.buckets.len() * 2;
        let mut new_buckets = vec![Vec::new(); new_capacity];
        for bucket in self.buckets.drain(..) {
            for (key, value) in bucket {
                let slot = hash::slot(key.as_bytes(), new_capacity);
                new_buckets[slot].push((key, value));
            }
        }
        self.buckets = new_buckets;
    }

    /// Iterates entries in bucket-then-chain order, matching the reference
    /// evaluator's traversal order for `Display` and merge.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.buckets.iter().flat_map(|bucket| bucket.iter().map(|(k, v)| (k.as_ref(), v)))
    }

    /// RHS entries override LHS entries; used by `Dict + Dict`.
    pub fn merged_with(&self, other: &Dict) -> Dict {
        let mut result = self.clone();
        for (key, value) in other.iter() {
            result.set(key, value.clone());
        }
        result
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

/// A column-oriented collection whose rows are `Dict`s sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Dict>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table { columns, rows: Vec::new() }
    }
}

/// `(env, args) -> value` signature a host built-in must implement.
pub type NativeFn = fn(&Rc<Environment>, &[Value]) -> Result<Value, ZoxError>;

/// Either a user-defined closure or a host-provided callable.
pub enum Function {
    User {
        name: String,
        params: Vec<String>,
        body: Rc<Vec<Stmt>>,
        env: Rc<Environment>,
    },
    Native {
        name: String,
        arity: usize,
        func: NativeFn,
    },
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::User { name, .. } => name,
            Function::Native { name, .. } => name,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Function::User { params, .. } => params.len(),
            Function::Native { arity, .. } => *arity,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name())
    }
}

/// The closed set of runtime values Zox programs compute with (spec §3.3),
/// plus `Module` -- the one crate-internal extension spec §9 sanctions for
/// representing an import bound without a selective list.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Vec<u8>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<Dict>>),
    Table(Rc<RefCell<Table>>),
    Function(Rc<Function>),
    Module(Rc<Environment>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({:?})", String::from_utf8_lossy(s)),
            Value::List(l) => write!(f, "List({:?})", l.borrow()),
            Value::Dict(_) => write!(f, "Dict(..)"),
            Value::Table(_) => write!(f, "Table(..)"),
            Value::Function(func) => write!(f, "Function({})", func.name()),
            Value::Module(_) => write!(f, "Module(..)"),
        }
    }
}

impl Value {
    pub fn list_from(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict_from(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn table_from(table: Table) -> Value {
        Value::Table(Rc::new(RefCell::new(table)))
    }

    pub fn is_truthy_condition(&self) -> Result<bool, ZoxError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(ZoxError::type_error(format!(
                "condition must be a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    /// Matches `type_to_string` in the reference `values.c`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::List(_) => "list",
            Value::Table(_) => "table",
            Value::Dict(_) => "dict",
            Value::Module(_) => "module",
        }
    }

    /// Dict-key stringification per spec §12 (`runtime_value_to_string`).
    pub fn stringify_key(&self) -> Result<String, ZoxError> {
        match self {
            Value::Nil => Ok("nil".to_string()),
            Value::Boolean(b) => Ok(if *b { "true".to_string() } else { "false".to_string() }),
            Value::Number(n) => Ok(format!("{n:.6}")),
            Value::String(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            other => Err(ZoxError::type_error(format!(
                "cannot use a {} as a dict key",
                other.type_name()
            ))),
        }
    }
}

/// Structural equality (spec §12 `compare_runtimeval`). Values of different
/// variants are unequal rather than an error; comparing two `Function`s is
/// instead refused by the evaluator's `==`/`!=` dispatch before it ever
/// reaches this impl (see `eval::binary_equals`).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            (Value::Dict(a), Value::Dict(b)) => *a.borrow() == *b.borrow(),
            (Value::Table(a), Value::Table(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, bytes: &[u8], quoted: bool) -> fmt::Result {
    let text = String::from_utf8_lossy(bytes);
    if quoted {
        write!(f, "\"{text}\"")
    } else {
        write!(f, "{text}")
    }
}

fn fmt_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(bytes) => write_string(f, bytes, true),
        other => fmt::Display::fmt(other, f),
    }
}

/// Print format per spec §6.4/§12: numbers fixed-point, strings raw at the
/// top level but quoted when nested, lists as `{a, b, c}`, dicts as
/// `["k" -> v; "k" -> v]` in bucket order, tables as `|>c1;c2<|{rowcount}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Number(n) => write!(f, "{n:.6}"),
            Value::String(bytes) => write_string(f, bytes, false),
            Value::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_nested(item, f)?;
                }
                write!(f, "}}")
            }
            Value::Dict(dict) => {
                write!(f, "[")?;
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "\"{key}\" -> ")?;
                    fmt_nested(value, f)?;
                }
                write!(f, "]")
            }
            Value::Table(table) => {
                let table = table.borrow();
                write!(f, "|>{}<|{{{}}}", table.columns.join(";"), table.rows.len())
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Module(_) => write!(f, "<module>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_equality_is_by_value() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::Number(2.0));
    }

    #[test]
    fn mismatched_types_are_unequal_not_error() {
        assert_ne!(Value::Number(1.0), Value::Boolean(true));
        assert_ne!(Value::Nil, Value::Boolean(false));
    }

    #[test]
    fn list_equality_is_elementwise() {
        let a = Value::list_from(vec![Value::Number(1.0), Value::Number(2.0)]);
        let b = Value::list_from(vec![Value::Number(1.0), Value::Number(2.0)]);
        let c = Value::list_from(vec![Value::Number(1.0)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn list_is_aliased_through_clone() {
        let a = Value::list_from(vec![Value::Number(1.0)]);
        let b = a.clone();
        if let Value::List(items) = &a {
            items.borrow_mut().push(Value::Number(2.0));
        }
        if let Value::List(items) = &b {
            assert_eq!(items.borrow().len(), 2);
        } else {
            panic!("expected list");
        }
    }

    #[test]
    fn dict_set_and_get() {
        let mut dict = Dict::new();
        dict.set("x", Value::Number(1.0));
        dict.set("y", Value::Number(2.0));
        assert_eq!(dict.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn dict_set_overwrites_existing_key() {
        let mut dict = Dict::new();
        dict.set("x", Value::Number(1.0));
        dict.set("x", Value::Number(2.0));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn dict_resizes_past_load_factor() {
        let mut dict = Dict::new();
        for i in 0..32 {
            dict.set(&format!("k{i}"), Value::Number(i as f64));
        }
        assert_eq!(dict.len(), 32);
        for i in 0..32 {
            assert_eq!(dict.get(&format!("k{i}")), Some(&Value::Number(i as f64)));
        }
    }

    #[test]
    fn dict_merge_prefers_rhs() {
        let mut a = Dict::new();
        a.set("x", Value::Number(1.0));
        let mut b = Dict::new();
        b.set("x", Value::Number(2.0));
        b.set("y", Value::Number(3.0));
        let merged = a.merged_with(&b);
        assert_eq!(merged.get("x"), Some(&Value::Number(2.0)));
        assert_eq!(merged.get("y"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn stringify_key_variants() {
        assert_eq!(Value::Nil.stringify_key().unwrap(), "nil");
        assert_eq!(Value::Boolean(true).stringify_key().unwrap(), "true");
        assert_eq!(Value::Number(1.5).stringify_key().unwrap(), "1.500000");
        assert_eq!(Value::String(b"hi".to_vec()).stringify_key().unwrap(), "hi");
        assert!(Value::list_from(vec![]).stringify_key().is_err());
    }

    #[test]
    fn display_formats_match_spec() {
        assert_eq!(format!("{}", Value::Number(3.0)), "3.000000");
        assert_eq!(format!("{}", Value::String(b"hi".to_vec())), "hi");
        let list = Value::list_from(vec![Value::Number(1.0), Value::String(b"a".to_vec())]);
        assert_eq!(format!("{list}"), "{1.000000, \"a\"}");
    }

    #[test]
    fn type_names_match_reference() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Number(0.0).type_name(), "number");
        assert_eq!(Value::list_from(vec![]).type_name(), "list");
    }
}
