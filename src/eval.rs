// ABOUTME: Tree-walking evaluator -- executes a parsed Program against an
// Environment, dispatching by AST node kind and, for binary operators, by
// the (left, right) runtime-value type pair.

use crate::ast::{IfExpr, ImportItem, Program, Stmt};
use crate::env::Environment;
use crate::error::ZoxError;
use crate::lexer::Lexer;
use crate::module::{ModuleResolver, ModuleSource};
use crate::parser::Parser;
use crate::value::{Dict, Function, Table, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Walks a `Program`/`Stmt` tree against an `Environment`. Holds an optional
/// module resolver so the core stays agnostic to how `import` finds code;
/// a host without modules can use `Evaluator::new()`.
pub struct Evaluator {
    resolver: Option<Rc<dyn ModuleResolver>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator { resolver: None }
    }

    pub fn with_resolver(resolver: Rc<dyn ModuleResolver>) -> Self {
        Evaluator { resolver: Some(resolver) }
    }

    pub fn eval_program(&self, program: &Program, env: &Rc<Environment>) -> Result<Value, ZoxError> {
        self.eval_block(&program.body, env)
    }

    fn eval_block(&self, body: &[Stmt], env: &Rc<Environment>) -> Result<Value, ZoxError> {
        let mut last = Value::Nil;
        for stmt in body {
            last = self.eval_stmt(stmt, env)?;
        }
        Ok(last)
    }

    fn eval_stmt(&self, stmt: &Stmt, env: &Rc<Environment>) -> Result<Value, ZoxError> {
        match stmt {
            Stmt::Program(program) => self.eval_program(program, env),
            Stmt::Nil => Ok(Value::Nil),
            Stmt::Boolean(b) => Ok(Value::Boolean(*b)),
            Stmt::Number(n) => Ok(Value::Number(*n)),
            Stmt::String(bytes) => Ok(Value::String(bytes.clone())),
            Stmt::List(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval_stmt(element, env)?);
                }
                Ok(Value::list_from(items))
            }
            Stmt::Dict { keys, values } => {
                let mut dict = Dict::new();
                for (key_expr, value_expr) in keys.iter().zip(values.iter()) {
                    let key = self.eval_stmt(key_expr, env)?.stringify_key()?;
                    let value = self.eval_stmt(value_expr, env)?;
                    dict.set(&key, value);
                }
                Ok(Value::dict_from(dict))
            }
            Stmt::Table { columns } => Ok(Value::table_from(Table::new(columns.clone()))),

            Stmt::Identifier(name) => env.lookup(name),

            Stmt::Unary { op, expr } => {
                let value = self.eval_stmt(expr, env)?;
                eval_unary(op, value)
            }
            Stmt::Binary { op, left, right } => {
                let left = self.eval_stmt(left, env)?;
                let right = self.eval_stmt(right, env)?;
                eval_binary(op, left, right)
            }

            Stmt::VarDeclaration { name, initializer } => {
                let value = self.eval_stmt(initializer, env)?;
                env.declare(name, value.clone())?;
                Ok(value)
            }
            Stmt::AssignVar { name, value } => {
                let value = self.eval_stmt(value, env)?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
            Stmt::AssignListVar { name, index, value } => {
                let index = as_index(self.eval_stmt(index, env)?)?;
                let value = self.eval_stmt(value, env)?;
                let target = env.lookup(name)?;
                match target {
                    Value::List(items) => {
                        let mut items = items.borrow_mut();
                        let idx = resolve_index(index, items.len())
                            .ok_or_else(|| ZoxError::value("list index out of bounds"))?;
                        items[idx] = value.clone();
                        Ok(value)
                    }
                    other => Err(ZoxError::type_error(format!("cannot index-assign a {}", other.type_name()))),
                }
            }
            Stmt::AssignDictVar { name, key, value } => {
                let key = self.eval_stmt(key, env)?.stringify_key()?;
                let value = self.eval_stmt(value, env)?;
                let target = env.lookup(name)?;
                match target {
                    Value::Dict(dict) => {
                        dict.borrow_mut().set(&key, value.clone());
                        Ok(value)
                    }
                    other => Err(ZoxError::type_error(format!("cannot key-assign a {}", other.type_name()))),
                }
            }

            Stmt::ListIndex { target, start, end, is_slice } => {
                self.eval_list_index(target, start, end.as_deref(), *is_slice, env)
            }
            Stmt::DictKey { target, key } => {
                let target = self.eval_stmt(target, env)?;
                let dict = match target {
                    Value::Dict(dict) => dict,
                    other => return Err(ZoxError::type_error(format!("attempted to key a {}", other.type_name()))),
                };
                let key = self.eval_stmt(key, env)?.stringify_key()?;
                Ok(dict.borrow().get(&key).cloned().unwrap_or(Value::Nil))
            }

            Stmt::If(if_expr) => self.eval_if(if_expr, env),
            Stmt::While { condition, body } => self.eval_while(condition, body, env),
            Stmt::For { init, condition, step, body } => self.eval_for(init, condition, step, body, env),

            Stmt::FuncDef { name, params, body } => {
                let func = Value::Function(Rc::new(Function::User {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    env: Rc::clone(env),
                }));
                env.declare(name, func.clone())?;
                Ok(func)
            }
            Stmt::Call { callee, arguments } => self.eval_call(callee, arguments, env),

            Stmt::Import { module_name, imports, has_list } => {
                self.eval_import(module_name, imports, *has_list, env)
            }
        }
    }

    fn eval_if(&self, if_expr: &IfExpr, env: &Rc<Environment>) -> Result<Value, ZoxError> {
        let scope = Environment::child(env);
        let condition = self.eval_stmt(&if_expr.condition, &scope)?.is_truthy_condition()?;
        if condition {
            return self.eval_block(&if_expr.body, &scope);
        }
        if let Some(else_if) = &if_expr.else_if {
            return self.eval_if(else_if, env);
        }
        if let Some(else_body) = &if_expr.else_body {
            let else_scope = Environment::child(env);
            return self.eval_block(else_body, &else_scope);
        }
        Ok(Value::Nil)
    }

    fn eval_while(&self, condition: &Stmt, body: &[Stmt], env: &Rc<Environment>) -> Result<Value, ZoxError> {
        let scope = Environment::child(env);
        let mut last = Value::Nil;
        while self.eval_stmt(condition, &scope)?.is_truthy_condition()? {
            last = self.eval_block(body, &scope)?;
        }
        Ok(last)
    }

    fn eval_for(
        &self,
        init: &Stmt,
        condition: &Stmt,
        step: &Stmt,
        body: &[Stmt],
        env: &Rc<Environment>,
    ) -> Result<Value, ZoxError> {
        let scope = Environment::child(env);
        self.eval_stmt(init, &scope)?;
        let mut last = Value::Nil;
        while self.eval_stmt(condition, &scope)?.is_truthy_condition()? {
            let iteration_scope = Environment::child(&scope);
            last = self.eval_block(body, &iteration_scope)?;
            self.eval_stmt(step, &scope)?;
        }
        Ok(last)
    }

    fn eval_call(&self, callee: &Stmt, arguments: &[Stmt], env: &Rc<Environment>) -> Result<Value, ZoxError> {
        let callee = self.eval_stmt(callee, env)?;
        let func = match callee {
            Value::Function(func) => func,
            other => return Err(ZoxError::type_error(format!("attempted to call a {}", other.type_name()))),
        };
        if arguments.len() != func.arity() {
            return Err(ZoxError::type_error(format!(
                "function '{}' expected {} argument(s) but got {}",
                func.name(),
                func.arity(),
                arguments.len()
            )));
        }
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval_stmt(argument, env)?);
        }
        match func.as_ref() {
            Function::Native { func, .. } => func(env, &args),
            Function::User { params, body, env: closure_env, .. } => {
                let call_env = Environment::child(closure_env);
                for (param, arg) in params.iter().zip(args.into_iter()) {
                    call_env.declare(param, arg)?;
                }
                self.eval_block(body, &call_env)
            }
        }
    }

    fn eval_list_index(
        &self,
        target: &Stmt,
        start: &Stmt,
        end: Option<&Stmt>,
        is_slice: bool,
        env: &Rc<Environment>,
    ) -> Result<Value, ZoxError> {
        let target = self.eval_stmt(target, env)?;
        let start = as_index(self.eval_stmt(start, env)?)?;

        match target {
            Value::String(bytes) => {
                if !is_slice {
                    let idx = resolve_index(start, bytes.len())
                        .ok_or_else(|| ZoxError::value("string index out of bounds"))?;
                    Ok(Value::String(vec![bytes[idx]]))
                } else {
                    let end = match end {
                        Some(end) => as_index(self.eval_stmt(end, env)?)?,
                        None => bytes.len() as i64,
                    };
                    let (start, end) = resolve_string_slice(start, end, bytes.len())?;
                    Ok(Value::String(bytes[start..end].to_vec()))
                }
            }
            Value::List(items) => {
                let items = items.borrow();
                if !is_slice {
                    let idx = resolve_index(start, items.len())
                        .ok_or_else(|| ZoxError::value("list index out of bounds"))?;
                    Ok(items[idx].clone())
                } else {
                    let end = match end {
                        Some(end) => as_index(self.eval_stmt(end, env)?)?,
                        None => items.len() as i64,
                    };
                    let (start, end) = clamp_range(start, end, items.len());
                    Ok(Value::list_from(items[start..end].to_vec()))
                }
            }
            Value::Table(table) => {
                let table = table.borrow();
                if !is_slice {
                    let idx = resolve_index(start, table.rows.len())
                        .ok_or_else(|| ZoxError::value("table row index out of bounds"))?;
                    Ok(Value::dict_from(table.rows[idx].clone()))
                } else {
                    let end = match end {
                        Some(end) => as_index(self.eval_stmt(end, env)?)?,
                        None => table.rows.len() as i64,
                    };
                    let (start, end) = clamp_range(start, end, table.rows.len());
                    let mut slice = Table::new(table.columns.clone());
                    slice.rows = table.rows[start..end].to_vec();
                    Ok(Value::table_from(slice))
                }
            }
            other => Err(ZoxError::type_error(format!("attempted to index a {}", other.type_name()))),
        }
    }

    fn eval_import(
        &self,
        module_name: &str,
        imports: &[ImportItem],
        has_list: bool,
        env: &Rc<Environment>,
    ) -> Result<Value, ZoxError> {
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| ZoxError::module(format!("no module resolver configured; cannot import '{module_name}'")))?;
        let source = resolver
            .resolve(module_name)
            .ok_or_else(|| ZoxError::module(format!("module '{module_name}' not found")))?;

        let module_env = Environment::child(env);
        match source {
            ModuleSource::Native(populate) => populate(&module_env)?,
            ModuleSource::Source(code) => {
                let tokens = Lexer::tokenize(&code)?;
                let program = Parser::parse(tokens)?;
                self.eval_program(&program, &module_env)?;
            }
        }

        if has_list {
            for item in imports {
                let value = module_env.lookup(&item.name).map_err(|_| {
                    ZoxError::module(format!("cannot find '{}' in module '{module_name}'", item.name))
                })?;
                env.declare(item.alias.as_deref().unwrap_or(&item.name), value)?;
            }
        } else {
            env.declare(module_name, Value::Module(module_env))?;
        }
        Ok(Value::Nil)
    }
}

fn eval_unary(op: &str, value: Value) -> Result<Value, ZoxError> {
    match (op, value) {
        ("-", Value::Number(n)) => Ok(Value::Number(-n)),
        ("+", Value::Number(n)) => Ok(Value::Number(n)),
        ("-", Value::Boolean(b)) => Ok(Value::Number(if b { -1.0 } else { 0.0 })),
        ("+", Value::Boolean(b)) => Ok(Value::Number(if b { 1.0 } else { 0.0 })),
        (op, other) => Err(ZoxError::type_error(format!(
            "unsupported unary operator '{op}' for {}",
            other.type_name()
        ))),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn eval_numeric_binary(op: &str, l: f64, r: f64) -> Result<Value, ZoxError> {
    match op {
        "+" => Ok(Value::Number(l + r)),
        "-" => Ok(Value::Number(l - r)),
        "*" => Ok(Value::Number(l * r)),
        "/" => {
            if r == 0.0 {
                Err(ZoxError::value("division by zero"))
            } else {
                Ok(Value::Number(l / r))
            }
        }
        "%" => Ok(Value::Number(((l as i64) % (r as i64)) as f64)),
        "**" => Ok(Value::Number(l.powf(r))),
        ">" => Ok(Value::Boolean(l > r)),
        ">=" => Ok(Value::Boolean(l >= r)),
        "<" => Ok(Value::Boolean(l < r)),
        "<=" => Ok(Value::Boolean(l <= r)),
        "&&" => Ok(Value::Boolean(l != 0.0 && r != 0.0)),
        "||" => Ok(Value::Boolean(l != 0.0 || r != 0.0)),
        "&" => Ok(Value::Number(((l as i64) & (r as i64)) as f64)),
        "|" => Ok(Value::Number(((l as i64) | (r as i64)) as f64)),
        "^" => Ok(Value::Number(((l as i64) ^ (r as i64)) as f64)),
        "<<" => Ok(Value::Number(((l as i64) << (r as i64)) as f64)),
        ">>" => Ok(Value::Number(((l as i64) >> (r as i64)) as f64)),
        _ => Err(ZoxError::type_error(format!("unknown operator '{op}'"))),
    }
}

fn remove_all_occurrences(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::new();
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn eval_string_binary(op: &str, l: &[u8], r: &[u8]) -> Result<Value, ZoxError> {
    match op {
        "+" => {
            let mut result = l.to_vec();
            result.extend_from_slice(r);
            Ok(Value::String(result))
        }
        "-" => Ok(Value::String(remove_all_occurrences(l, r))),
        _ => Err(ZoxError::type_error(format!("unsupported operator '{op}' for strings"))),
    }
}

fn eval_string_repeat(s: &[u8], count: f64) -> Result<Value, ZoxError> {
    let n = count as i64;
    if n < 0 {
        return Err(ZoxError::value("cannot repeat a string a negative number of times"));
    }
    let mut out = Vec::with_capacity(s.len() * n as usize);
    for _ in 0..n {
        out.extend_from_slice(s);
    }
    Ok(Value::String(out))
}

fn eval_list_binary(op: &str, l: &[Value], r: &[Value]) -> Result<Value, ZoxError> {
    match op {
        "+" => {
            let mut result = l.to_vec();
            result.extend_from_slice(r);
            Ok(Value::list_from(result))
        }
        "*" => {
            let mut result = Vec::with_capacity(l.len() * r.len());
            for a in l {
                for b in r {
                    result.push(Value::list_from(vec![a.clone(), b.clone()]));
                }
            }
            Ok(Value::list_from(result))
        }
        "^" => {
            let mut result = Vec::new();
            for a in l {
                if !r.iter().any(|b| b == a) {
                    result.push(a.clone());
                }
            }
            for b in r {
                if !l.iter().any(|a| a == b) {
                    result.push(b.clone());
                }
            }
            Ok(Value::list_from(result))
        }
        _ => Err(ZoxError::type_error(format!("unsupported operator '{op}' for lists"))),
    }
}

fn append_dict_row(table: &Rc<RefCell<Table>>, dict: &Rc<RefCell<Dict>>) -> Result<Value, ZoxError> {
    let row = {
        let dict = dict.borrow();
        let columns = table.borrow().columns.len();
        if dict.len() != columns {
            return Err(ZoxError::value("dictionary size does not match table column count"));
        }
        dict.clone()
    };
    table.borrow_mut().rows.push(row);
    Ok(Value::Table(Rc::clone(table)))
}

fn append_list_rows(table: &Rc<RefCell<Table>>, items: &[Value]) -> Result<Value, ZoxError> {
    let columns = table.borrow().columns.clone();
    let mut new_rows = Vec::with_capacity(items.len());
    for item in items {
        let row = match item {
            Value::Dict(dict) => {
                let dict = dict.borrow();
                if dict.len() != columns.len() {
                    return Err(ZoxError::value("dictionary size does not match table column count"));
                }
                dict.clone()
            }
            Value::List(list) => {
                let list = list.borrow();
                if list.len() != columns.len() {
                    return Err(ZoxError::value("list size does not match table column count"));
                }
                let mut row = Dict::new();
                for (column, value) in columns.iter().zip(list.iter()) {
                    row.set(column, value.clone());
                }
                row
            }
            other => {
                return Err(ZoxError::type_error(format!(
                    "table rows must be dicts or lists, got {}",
                    other.type_name()
                )));
            }
        };
        new_rows.push(row);
    }
    table.borrow_mut().rows.extend(new_rows);
    Ok(Value::Table(Rc::clone(table)))
}

/// Dispatches a binary operator by the runtime-value type pair. `==`/`!=`
/// are handled uniformly up front via structural equality (except two
/// `Function`s, which is always a type error); every other operator is
/// dispatched by type pair, matching only the combinations the language
/// actually supports. Mismatched types that fall through every pair below
/// are a type error, not the silent `false` the reference evaluator falls
/// back to for unhandled combinations.
fn eval_binary(op: &str, left: Value, right: Value) -> Result<Value, ZoxError> {
    if op == "==" || op == "!=" {
        if matches!((&left, &right), (Value::Function(_), Value::Function(_))) {
            return Err(ZoxError::type_error("functions cannot be compared"));
        }
        let equal = left == right;
        return Ok(Value::Boolean(if op == "==" { equal } else { !equal }));
    }

    match (&left, &right) {
        (Value::Number(_) | Value::Boolean(_), Value::Number(_) | Value::Boolean(_)) => {
            eval_numeric_binary(op, as_number(&left).unwrap(), as_number(&right).unwrap())
        }
        (Value::String(l), Value::String(r)) => eval_string_binary(op, l, r),
        (Value::String(s), Value::Number(n)) if op == "*" => eval_string_repeat(s, *n),
        (Value::List(l), Value::List(r)) => eval_list_binary(op, &l.borrow(), &r.borrow()),
        (Value::List(l), _) if op == "<<" => {
            l.borrow_mut().push(right.clone());
            Ok(Value::List(Rc::clone(l)))
        }
        (Value::Dict(l), Value::Dict(r)) if op == "+" => Ok(Value::dict_from(l.borrow().merged_with(&r.borrow()))),
        (Value::Table(t), Value::Dict(d)) if op == "+" => append_dict_row(t, d),
        (Value::Table(t), Value::List(items)) if op == "+" => {
            let items = items.borrow().clone();
            append_list_rows(t, &items)
        }
        _ if left.type_name() == right.type_name() => Err(ZoxError::type_error(format!(
            "unsupported operator '{op}' for {}",
            left.type_name()
        ))),
        _ => Err(ZoxError::type_error(format!(
            "mismatched types {} and {} for operator '{op}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn as_index(value: Value) -> Result<i64, ZoxError> {
    match value {
        Value::Number(n) => Ok(n as i64),
        other => Err(ZoxError::type_error(format!("index must be a number, got {}", other.type_name()))),
    }
}

/// Negative-from-end index resolution for direct (non-slice) access.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

/// Clamping range resolution for list/table slices: out-of-range bounds
/// are clamped rather than rejected.
fn clamp_range(start: i64, end: i64, len: usize) -> (usize, usize) {
    let len_i = len as i64;
    let start = if start < 0 { start + len_i } else { start }.clamp(0, len_i) as usize;
    let end = if end < 0 { end + len_i } else { end }.clamp(0, len_i) as usize;
    if start >= end {
        (0, 0)
    } else {
        (start, end)
    }
}

/// String slices reject out-of-range bounds instead of clamping, unlike
/// list/table slices -- kept deliberately asymmetric (see DESIGN.md).
fn resolve_string_slice(start: i64, end: i64, len: usize) -> Result<(usize, usize), ZoxError> {
    let len_i = len as i64;
    let start = if start < 0 { start + len_i } else { start };
    if start < 0 || start > len_i {
        return Err(ZoxError::value("string index out of bounds"));
    }
    let end = if end < 0 { end + len_i } else { end };
    if end < 0 || end > len_i {
        return Err(ZoxError::value("string index out of bounds"));
    }
    if start >= end {
        Ok((0, 0))
    } else {
        Ok((start as usize, end as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Value {
        let tokens = Lexer::tokenize(source).unwrap();
        let program = Parser::parse(tokens).unwrap();
        let env = Environment::global();
        Evaluator::new().eval_program(&program, &env).unwrap()
    }

    #[test]
    fn arithmetic() {
        assert_eq!(run("1 + 2 * 3;"), Value::Number(7.0));
    }

    #[test]
    fn boolean_is_coerced_to_number_in_arithmetic() {
        assert_eq!(run("true + 1;"), Value::Number(2.0));
    }

    #[test]
    fn division_by_zero_is_value_error() {
        let tokens = Lexer::tokenize("1 / 0;").unwrap();
        let program = Parser::parse(tokens).unwrap();
        let env = Environment::global();
        assert!(matches!(Evaluator::new().eval_program(&program, &env), Err(ZoxError::Value { .. })));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run(r#""a" + "b";"#), Value::String(b"ab".to_vec()));
    }

    #[test]
    fn string_repeat() {
        assert_eq!(run(r#""ab" * 3;"#), Value::String(b"ababab".to_vec()));
    }

    #[test]
    fn list_append_mutates_in_place() {
        assert_eq!(
            run("let xs = {1, 2}; xs << 3; xs;"),
            Value::list_from(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn equality_is_structural_across_types() {
        assert_eq!(run("1 == true;"), Value::Boolean(false));
        assert_eq!(run("nil == nil;"), Value::Boolean(true));
    }

    #[test]
    fn comparing_functions_is_type_error() {
        let tokens = Lexer::tokenize("$f(){1;} $g(){2;} f == g;").unwrap();
        let program = Parser::parse(tokens).unwrap();
        let env = Environment::global();
        assert!(matches!(Evaluator::new().eval_program(&program, &env), Err(ZoxError::Type { .. })));
    }

    #[test]
    fn while_loop_accumulates() {
        assert_eq!(
            run("let i = 0; let sum = 0; # (i < 5) { sum = sum + i; i = i + 1; } sum;"),
            Value::Number(10.0)
        );
    }

    #[test]
    fn for_loop_binds_fresh_scope_per_iteration() {
        assert_eq!(
            run("let sum = 0; @ (let i = 0; i < 5; i = i + 1) { sum = sum + i; } sum;"),
            Value::Number(10.0)
        );
    }

    #[test]
    fn if_else_if_else_chain() {
        assert_eq!(run("? (false) { 1; } : ? (false) { 2; } : { 3; }"), Value::Number(3.0));
    }

    #[test]
    fn function_call_uses_captured_environment() {
        let source = "let x = 10; $addx(y) { x + y; } let x = 99; addx(5);";
        assert_eq!(run(source), Value::Number(15.0));
    }

    #[test]
    fn recursive_function_via_name_binding() {
        let source = "$fact(n) { ? (n <= 1) { 1; } : { n * fact(n - 1); } } fact(5);";
        assert_eq!(run(source), Value::Number(120.0));
    }

    #[test]
    fn list_index_and_negative_index() {
        assert_eq!(run("let xs = {1, 2, 3}; xs[0];"), Value::Number(1.0));
        assert_eq!(run("let xs = {1, 2, 3}; xs[-1];"), Value::Number(3.0));
    }

    #[test]
    fn list_slice_clamps() {
        assert_eq!(
            run("let xs = {1, 2, 3}; xs[1:100];"),
            Value::list_from(vec![Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn dict_literal_and_key_access() {
        assert_eq!(run(r#"let d = ["a" -> 1; "b" -> 2]; d{"a"};"#), Value::Number(1.0));
    }

    #[test]
    fn dict_missing_key_is_nil() {
        assert_eq!(run(r#"let d = ["a" -> 1]; d{"missing"};"#), Value::Nil);
    }

    #[test]
    fn table_append_dict_row() {
        let value = run(r#"let t = |> name; age <|; t + ["name" -> "Ann"; "age" -> 30]; t;"#);
        match value {
            Value::Table(table) => assert_eq!(table.borrow().rows.len(), 1),
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn assign_list_var_mutates_list() {
        assert_eq!(
            run("let xs = {1, 2, 3}; xs[1] = 9; xs;"),
            Value::list_from(vec![Value::Number(1.0), Value::Number(9.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn assign_dict_var_sets_key() {
        assert_eq!(run(r#"let d = ["a" -> 1]; d{"a"} = 2; d{"a"};"#), Value::Number(2.0));
    }
}
