// ABOUTME: Lexical scope chain -- per-frame open-addressing hash map with a
// parent pointer. Function values capture an `Rc<Environment>`, so a frame's
// lifetime extends to the longest-lived closure referring to it.

use crate::error::ZoxError;
use crate::hash;
use crate::value::{Function, NativeFn, Value};
use std::cell::RefCell;
use std::rc::Rc;

const INITIAL_CAPACITY: usize = 16;
const LOAD_FACTOR: f64 = 0.75;

/// Open-addressing, linear-probing table used by a single scope frame
/// (spec §3.4): capacity 16, load factor 0.75, FNV-1a rehash on resize.
struct ScopeMap {
    slots: Vec<Option<(Box<str>, Value)>>,
    len: usize,
}

impl ScopeMap {
    fn new() -> Self {
        ScopeMap {
            slots: (0..INITIAL_CAPACITY).map(|_| None).collect(),
            len: 0,
        }
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        let capacity = self.slots.len();
        let start = hash::slot(name.as_bytes(), capacity);
        for offset in 0..capacity {
            let idx = (start + offset) % capacity;
            match &self.slots[idx] {
                Some((key, _)) if key.as_ref() == name => return Some(idx),
                None => return None,
                _ => continue,
            }
        }
        None
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.find_index(name).map(|idx| &self.slots[idx].as_ref().unwrap().1)
    }

    /// Declares a new binding in this frame only. Errs if `name` is already
    /// bound here (spec §3.4: declaring over an existing binding is an error).
    fn declare(&mut self, name: &str, value: Value) -> Result<(), ZoxError> {
        if self.find_index(name).is_some() {
            return Err(ZoxError::name(format!("'{name}' is already declared in this scope")));
        }
        if (self.len + 1) as f64 / self.slots.len() as f64 > LOAD_FACTOR {
            self.resize();
        }
        let capacity = self.slots.len();
        let start = hash::slot(name.as_bytes(), capacity);
        for offset in 0..capacity {
            let idx = (start + offset) % capacity;
            if self.slots[idx].is_none() {
                self.slots[idx] = Some((name.into(), value));
                self.len += 1;
                return Ok(());
            }
        }
        unreachable!("resize guarantees a free slot")
    }

    /// Updates an existing binding in this frame; returns the value back if
    /// no such binding exists here so the caller can keep walking parents.
    fn set(&mut self, name: &str, value: Value) -> Result<(), Value> {
        match self.find_index(name) {
            Some(idx) => {
                self.slots[idx].as_mut().unwrap().1 = value;
                Ok(())
            }
            None => Err(value),
        }
    }

    fn resize(&mut self) {
        let new_capacity = self.slots.len() * 2;
        let mut new_slots: Vec<Option<(Box<str>, Value)>> = (0..new_capacity).map(|_| None).collect();
        for entry in self.slots.drain(..).flatten() {
            let start = hash::slot(entry.0.as_bytes(), new_capacity);
            for offset in 0..new_capacity {
                let idx = (start + offset) % new_capacity;
                if new_slots[idx].is_none() {
                    new_slots[idx] = Some(entry);
                    break;
                }
            }
        }
        self.slots = new_slots;
    }
}

pub struct Environment {
    frame: RefCell<ScopeMap>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates the root (global) environment.
    pub fn global() -> Rc<Self> {
        Rc::new(Environment {
            frame: RefCell::new(ScopeMap::new()),
            parent: None,
        })
    }

    /// Creates a fresh child scope parented to `parent`, as done on every
    /// function call and every `while`/`if`/`for` body (spec §3.4).
    pub fn child(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            frame: RefCell::new(ScopeMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn declare(&self, name: &str, value: Value) -> Result<(), ZoxError> {
        self.frame.borrow_mut().declare(name, value)
    }

    /// Convenience for host code registering a native built-in.
    pub fn declare_native(&self, name: &str, arity: usize, func: NativeFn) -> Result<(), ZoxError> {
        self.declare(
            name,
            Value::Function(Rc::new(Function::Native { name: name.to_string(), arity, func })),
        )
    }

    /// Resolves to the nearest enclosing frame that defines `name` and
    /// writes there; missing is a name error.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), ZoxError> {
        match self.frame.borrow_mut().set(name, value) {
            Ok(()) => Ok(()),
            Err(value) => match &self.parent {
                Some(parent) => parent.assign(name, value),
                None => Err(ZoxError::name(format!("undefined variable '{name}'"))),
            },
        }
    }

    /// Resolves to the nearest enclosing frame that defines `name` and
    /// reads from there; missing is a name error.
    pub fn lookup(&self, name: &str) -> Result<Value, ZoxError> {
        if let Some(value) = self.frame.borrow().get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(ZoxError::name(format!("undefined variable '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let env = Environment::global();
        env.declare("x", Value::Number(42.0)).unwrap();
        match env.lookup("x") {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn undefined_lookup_is_name_error() {
        let env = Environment::global();
        assert!(matches!(env.lookup("missing"), Err(ZoxError::Name { .. })));
    }

    #[test]
    fn duplicate_declare_in_same_frame_is_error() {
        let env = Environment::global();
        env.declare("x", Value::Number(1.0)).unwrap();
        assert!(env.declare("x", Value::Number(2.0)).is_err());
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Environment::global();
        parent.declare("x", Value::Number(42.0)).unwrap();
        let child = Environment::child(&parent);
        match child.lookup("x") {
            Ok(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn child_can_shadow_with_its_own_declare() {
        let parent = Environment::global();
        parent.declare("x", Value::Number(1.0)).unwrap();
        let child = Environment::child(&parent);
        child.declare("x", Value::Number(2.0)).unwrap();
        match child.lookup("x") {
            Ok(Value::Number(n)) => assert_eq!(n, 2.0),
            _ => panic!("Expected Number(2.0)"),
        }
        match parent.lookup("x") {
            Ok(Value::Number(n)) => assert_eq!(n, 1.0),
            _ => panic!("parent binding must be untouched"),
        }
    }

    #[test]
    fn assign_is_non_shadowing_through_nested_block() {
        let outer = Environment::global();
        outer.declare("x", Value::Number(1.0)).unwrap();
        let block = Environment::child(&outer);
        block.assign("x", Value::Number(2.0)).unwrap();
        match outer.lookup("x") {
            Ok(Value::Number(n)) => assert_eq!(n, 2.0),
            _ => panic!("assignment in a nested block must reach the outer binding"),
        }
    }

    #[test]
    fn assign_to_undefined_is_name_error() {
        let env = Environment::global();
        assert!(env.assign("missing", Value::Nil).is_err());
    }

    #[test]
    fn resizes_past_sixteen_entries() {
        let env = Environment::global();
        for i in 0..40 {
            env.declare(&format!("v{i}"), Value::Number(i as f64)).unwrap();
        }
        for i in 0..40 {
            match env.lookup(&format!("v{i}")) {
                Ok(Value::Number(n)) => assert_eq!(n, i as f64),
                _ => panic!("lookup failed after resize for v{i}"),
            }
        }
    }
}
