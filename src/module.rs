// ABOUTME: Module resolution contract. The evaluator is agnostic to how a
// module name maps to code; the host supplies a resolver implementation.

use crate::env::Environment;
use crate::error::ZoxError;
use std::rc::Rc;

/// What an `import` statement's module name resolved to.
pub enum ModuleSource {
    /// A host-defined module that populates an environment directly,
    /// without going through the lexer/parser (e.g. `math`).
    Native(Box<dyn Fn(&Rc<Environment>) -> Result<(), ZoxError>>),
    /// Zox source text to be lexed, parsed and evaluated in a fresh module
    /// environment.
    Source(String),
}

/// Host-supplied strategy for turning an `import` module name into code.
/// The core evaluator never touches the filesystem directly; it only calls
/// through this trait (spec §6.3).
pub trait ModuleResolver {
    fn resolve(&self, module_name: &str) -> Option<ModuleSource>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver(HashMap<&'static str, &'static str>);

    impl ModuleResolver for MapResolver {
        fn resolve(&self, module_name: &str) -> Option<ModuleSource> {
            self.0.get(module_name).map(|src| ModuleSource::Source(src.to_string()))
        }
    }

    #[test]
    fn resolves_known_module_to_source() {
        let mut map = HashMap::new();
        map.insert("greet", "let x = 1;");
        let resolver = MapResolver(map);
        match resolver.resolve("greet") {
            Some(ModuleSource::Source(src)) => assert_eq!(src, "let x = 1;"),
            _ => panic!("expected Source variant"),
        }
    }

    #[test]
    fn unknown_module_resolves_to_none() {
        let resolver = MapResolver(HashMap::new());
        assert!(resolver.resolve("missing").is_none());
    }

    #[test]
    fn native_module_can_populate_environment() {
        struct NativeResolver;
        impl ModuleResolver for NativeResolver {
            fn resolve(&self, module_name: &str) -> Option<ModuleSource> {
                if module_name == "math" {
                    Some(ModuleSource::Native(Box::new(|env| {
                        env.declare("pi", crate::value::Value::Number(3.0))
                    })))
                } else {
                    None
                }
            }
        }
        let resolver = NativeResolver;
        let env = Environment::global();
        match resolver.resolve("math") {
            Some(ModuleSource::Native(populate)) => populate(&env).unwrap(),
            _ => panic!("expected Native variant"),
        }
        assert!(env.lookup("pi").is_ok());
    }
}
