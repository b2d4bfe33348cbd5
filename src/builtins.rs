// ABOUTME: Illustrative host-side standard catalog: print/println/len/type
// plus a small math module. Not part of the core contract -- the core only
// requires the `declare_native`/`NativeFn` registration hook in `env.rs`.

use crate::config;
use crate::env::Environment;
use crate::error::ZoxError;
use crate::module::ModuleSource;
use crate::value::Value;
use std::rc::Rc;

fn print(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    for arg in args {
        print!("{arg}");
    }
    Ok(Value::Nil)
}

fn println(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    for arg in args {
        print!("{arg}");
    }
    println!();
    Ok(Value::Nil)
}

fn len(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    let length = match &args[0] {
        Value::String(bytes) => bytes.len(),
        Value::List(items) => items.borrow().len(),
        Value::Dict(dict) => dict.borrow().len(),
        Value::Table(table) => table.borrow().rows.len(),
        other => return Err(ZoxError::type_error(format!("'len' has no meaning for a {}", other.type_name()))),
    };
    Ok(Value::Number(length as f64))
}

fn type_of(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    Ok(Value::String(args[0].type_name().as_bytes().to_vec()))
}

fn math_abs(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.abs())),
        other => Err(ZoxError::type_error(format!("'abs' expects a number, got {}", other.type_name()))),
    }
}

fn math_sqrt(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, ZoxError> {
    match &args[0] {
        Value::Number(n) if *n >= 0.0 => Ok(Value::Number(n.sqrt())),
        Value::Number(_) => Err(ZoxError::value("'sqrt' of a negative number")),
        other => Err(ZoxError::type_error(format!("'sqrt' expects a number, got {}", other.type_name()))),
    }
}

/// Registers the globally-callable illustrative built-ins (no import
/// needed) into `env` -- typically the global scope, before the REPL or
/// batch runner starts. Also declares the `PI` bootstrap constant; `nil`/
/// `true`/`false` need no such declaration since they are literals the
/// lexer/parser produce directly rather than names the evaluator looks up.
pub fn register_globals(env: &Rc<Environment>) -> Result<(), ZoxError> {
    env.declare("PI", Value::Number(config::PI))?;
    env.declare_native("print", 1, print)?;
    env.declare_native("println", 1, println)?;
    env.declare_native("len", 1, len)?;
    env.declare_native("type", 1, type_of)?;
    Ok(())
}

/// The illustrative `math` native module, resolved through `~> math;` or
/// `~> math { abs, sqrt };` rather than being globally callable.
pub fn math_module() -> ModuleSource {
    ModuleSource::Native(Box::new(|env| {
        env.declare_native("abs", 1, math_abs)?;
        env.declare_native("sqrt", 1, math_sqrt)?;
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_of_string_and_list() {
        let env = Environment::global();
        assert_eq!(len(&env, &[Value::String(b"abcd".to_vec())]).unwrap(), Value::Number(4.0));
        assert_eq!(
            len(&env, &[Value::list_from(vec![Value::Nil, Value::Nil])]).unwrap(),
            Value::Number(2.0)
        );
    }

    #[test]
    fn type_of_reports_category() {
        let env = Environment::global();
        assert_eq!(type_of(&env, &[Value::Number(1.0)]).unwrap(), Value::String(b"number".to_vec()));
    }

    #[test]
    fn abs_and_sqrt() {
        let env = Environment::global();
        assert_eq!(math_abs(&env, &[Value::Number(-3.0)]).unwrap(), Value::Number(3.0));
        assert_eq!(math_sqrt(&env, &[Value::Number(9.0)]).unwrap(), Value::Number(3.0));
        assert!(math_sqrt(&env, &[Value::Number(-1.0)]).is_err());
    }

    #[test]
    fn register_globals_binds_catalog_into_global_scope() {
        let env = Environment::global();
        register_globals(&env).unwrap();
        assert!(env.lookup("print").is_ok());
        assert!(env.lookup("math").is_err());
    }

    #[test]
    fn register_globals_declares_pi() {
        let env = Environment::global();
        register_globals(&env).unwrap();
        assert_eq!(env.lookup("PI").unwrap(), Value::Number(std::f64::consts::PI));
    }

    #[test]
    fn math_module_populates_a_fresh_environment() {
        let env = Environment::global();
        match math_module() {
            ModuleSource::Native(populate) => populate(&env).unwrap(),
            _ => panic!("expected Native variant"),
        }
        assert!(env.lookup("abs").is_ok());
        assert!(env.lookup("sqrt").is_ok());
    }
}
