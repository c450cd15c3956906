//! Built-in functions

pub mod math;
pub mod sequence;
pub mod text;

use crate::error::{FormulaError, FormulaResult};
use pipe_sheets_core::Value;
use std::collections::HashMap;
use std::fmt;

/// Function implementation signature
///
/// Arguments arrive evaluated, with sequences already spliced in. Failures
/// are returned as [`Value::Error`].
pub type FunctionImpl = fn(&[Value]) -> Value;

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

impl FunctionDef {
    /// Check an argument count against this function's bounds
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human readable arity, e.g. "2..3" or "1.."
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("{}..", self.min_args),
        }
    }

    /// Call the function after checking its arity
    pub fn call(&self, args: &[Value]) -> FormulaResult<Value> {
        if !self.accepts(args.len()) {
            return Err(FormulaError::ArgumentCount {
                function: self.name.to_string(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        Ok((self.implementation)(args))
    }
}

/// Function registry
///
/// No registered name may be a suffix of another, so a name read off the end
/// of a longer token can never pick the wrong function.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    ///
    /// # Panics
    ///
    /// Panics if two built-in names are suffixes of each other.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|e| panic!("invalid built-in function table: {}", e))
    }

    /// Create a new registry with all built-in functions, failing if two of
    /// their names are suffixes of each other
    pub fn try_new() -> FormulaResult<Self> {
        let mut registry = Self::empty();
        for def in builtins() {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Create a registry without any functions
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    /// Look up a function by name, failing with `UnknownFunction`
    pub fn lookup(&self, name: &str) -> FormulaResult<&FunctionDef> {
        self.get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }

    /// Register a function
    ///
    /// Fails when the name is a suffix of a registered name or the other way
    /// round (which includes registering the same name twice).
    pub fn register(&mut self, def: FunctionDef) -> FormulaResult<()> {
        let name = def.name.to_ascii_uppercase();
        if let Some(existing) = self
            .functions
            .keys()
            .find(|existing| names_overlap(existing, &name))
        {
            return Err(FormulaError::AmbiguousFunctionName {
                name,
                existing: existing.clone(),
            });
        }
        self.functions.insert(name, def);
        Ok(())
    }

    /// Verify that no two registered names are suffixes of each other
    pub fn check_unambiguous(&self) -> FormulaResult<()> {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        for (i, a) in names.iter().enumerate() {
            if let Some(b) = names[i + 1..].iter().find(|b| names_overlap(a, b)) {
                return Err(FormulaError::AmbiguousFunctionName {
                    name: (*b).clone(),
                    existing: (*a).clone(),
                });
            }
        }
        Ok(())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn names_overlap(a: &str, b: &str) -> bool {
    a.ends_with(b) || b.ends_with(a)
}

fn builtins() -> [FunctionDef; 6] {
    [
        FunctionDef {
            name: "CONCAT",
            min_args: 0,
            max_args: None,
            implementation: text::fn_concat,
        },
        FunctionDef {
            name: "TEXT",
            min_args: 1,
            max_args: None,
            implementation: text::fn_text,
        },
        FunctionDef {
            name: "SUM",
            min_args: 0,
            max_args: None,
            implementation: math::fn_sum,
        },
        FunctionDef {
            name: "SPREAD",
            min_args: 0,
            max_args: None,
            implementation: sequence::fn_spread,
        },
        FunctionDef {
            name: "SPLIT",
            min_args: 2,
            max_args: None,
            implementation: sequence::fn_split,
        },
        FunctionDef {
            name: "INCFROM",
            min_args: 1,
            max_args: None,
            implementation: sequence::fn_incfrom,
        },
    ]
}
