use std::collections::HashSet;

use super::NativeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// Visible to whoever executes the module, e.g. entry points
    External,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFunction {
    pub name: String,
    /// Always a function type
    pub ty: NativeType,
    pub linkage: Linkage,
    pub param_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeGlobal {
    pub name: String,
    /// The stored type, not a pointer to it
    pub ty: NativeType,
    pub address_space: u32,
    pub linkage: Linkage,
}

/// A generated code module: the functions and globals produced by one conversion.
/// Symbol names are unique inside a module; clashing names get a `.N` suffix.
#[derive(Debug, Clone, Default)]
pub struct NativeModule {
    pub name: String,
    pub functions: Vec<NativeFunction>,
    pub globals: Vec<NativeGlobal>,
    symbols: HashSet<String>,
}
impl NativeModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn claim_symbol(&mut self, name: &str) -> String {
        let mut candidate = name.to_owned();
        let mut suffix = 1;
        while self.symbols.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        self.symbols.insert(candidate.clone());
        candidate
    }

    /// Add a function, returning its index in [NativeModule::functions]
    pub fn add_function(&mut self, name: &str, ty: NativeType, linkage: Linkage, param_names: Vec<String>) -> usize {
        let name = self.claim_symbol(name);
        self.functions.push(NativeFunction {
            name,
            ty,
            linkage,
            param_names,
        });
        self.functions.len() - 1
    }

    /// Add a global, returning its index in [NativeModule::globals]
    pub fn add_global(&mut self, name: &str, ty: NativeType, address_space: u32, linkage: Linkage) -> usize {
        let name = self.claim_symbol(name);
        self.globals.push(NativeGlobal {
            name,
            ty,
            address_space,
            linkage,
        });
        self.globals.len() - 1
    }

    pub fn get_function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_global(&self, name: &str) -> Option<&NativeGlobal> {
        self.globals.iter().find(|g| g.name == name)
    }
}
