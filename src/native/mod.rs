//! The native code-generation backend the converter targets.
//!
//! Types live in a [NativeContext] and are referred to through copyable [NativeType] handles.
//! Structural types (integers, vectors, pointers, functions...) are uniqued, so asking for the same shape twice gives the same handle.
//! Named structs are never uniqued: each [NativeContext::struct_create_named] call makes a new opaque struct,
//! which later gets its body through [NativeContext::struct_set_body] exactly once.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

pub mod display;
pub mod module;

pub use module::{Linkage, NativeFunction, NativeGlobal, NativeModule};

pub const DEFAULT_ADDRESS_SPACE: u32 = 0;

/// Handle to a type owned by a [NativeContext]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeType(usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeStruct {
    pub name: String,
    /// None while the struct is opaque
    pub body: Option<Vec<NativeType>>,
    pub packed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeTypeData {
    Void,
    Int { bits: u32 },
    Float { bits: u32 },
    Vector { element: NativeType, count: u32 },
    /// An array with `count == 0` is unbounded (a runtime array)
    Array { element: NativeType, count: u64 },
    Pointer { pointee: NativeType, address_space: u32 },
    Function {
        return_type: NativeType,
        params: Vec<NativeType>,
        var_arg: bool,
    },
    Struct(NativeStruct),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("type {0:?} is not a named struct")]
    NotAStruct(NativeType),
    #[error("struct '{0}' already has a body")]
    BodyAlreadySet(String),
    #[error("vector of {0} elements is not allowed")]
    BadVectorLength(u32),
    #[error("{0}-bit {1} types are not supported")]
    BadBitWidth(u32, &'static str),
}

/// Owns every type created during a conversion.
#[derive(Debug, Default)]
pub struct NativeContext {
    types: Vec<NativeTypeData>,
    uniqued: HashMap<NativeTypeData, NativeType>,
}
impl NativeContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: NativeTypeData) -> NativeType {
        let ty = NativeType(self.types.len());
        self.types.push(data);
        ty
    }

    fn intern(&mut self, data: NativeTypeData) -> NativeType {
        if let Some(&ty) = self.uniqued.get(&data) {
            return ty;
        }
        let ty = self.push(data.clone());
        self.uniqued.insert(data, ty);
        ty
    }

    pub fn data(&self, ty: NativeType) -> &NativeTypeData {
        &self.types[ty.0]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn void_type(&mut self) -> NativeType {
        self.intern(NativeTypeData::Void)
    }

    pub fn int_type(&mut self, bits: u32) -> Result<NativeType, NativeError> {
        match bits {
            1 | 8 | 16 | 32 | 64 => Ok(self.intern(NativeTypeData::Int { bits })),
            _ => Err(NativeError::BadBitWidth(bits, "integer")),
        }
    }

    pub fn bool_type(&mut self) -> NativeType {
        self.intern(NativeTypeData::Int { bits: 1 })
    }

    pub fn float_type(&mut self, bits: u32) -> Result<NativeType, NativeError> {
        match bits {
            16 | 32 | 64 => Ok(self.intern(NativeTypeData::Float { bits })),
            _ => Err(NativeError::BadBitWidth(bits, "float")),
        }
    }

    pub fn vector_type(&mut self, element: NativeType, count: u32) -> Result<NativeType, NativeError> {
        if count < 2 {
            return Err(NativeError::BadVectorLength(count));
        }
        Ok(self.intern(NativeTypeData::Vector { element, count }))
    }

    pub fn array_type(&mut self, element: NativeType, count: u64) -> NativeType {
        self.intern(NativeTypeData::Array { element, count })
    }

    pub fn pointer_type(&mut self, pointee: NativeType, address_space: u32) -> NativeType {
        self.intern(NativeTypeData::Pointer {
            pointee,
            address_space,
        })
    }

    pub fn function_type(&mut self, return_type: NativeType, params: &[NativeType], var_arg: bool) -> NativeType {
        self.intern(NativeTypeData::Function {
            return_type,
            params: params.to_vec(),
            var_arg,
        })
    }

    /// Create a new opaque struct. Names don't need to be unique.
    pub fn struct_create_named(&mut self, name: &str) -> NativeType {
        self.push(NativeTypeData::Struct(NativeStruct {
            name: name.to_owned(),
            body: None,
            packed: false,
        }))
    }

    pub fn struct_set_body(&mut self, ty: NativeType, members: &[NativeType], packed: bool) -> Result<(), NativeError> {
        match &mut self.types[ty.0] {
            NativeTypeData::Struct(s) => {
                if s.body.is_some() {
                    return Err(NativeError::BodyAlreadySet(s.name.clone()));
                }
                s.body = Some(members.to_vec());
                s.packed = packed;
                Ok(())
            }
            _ => Err(NativeError::NotAStruct(ty)),
        }
    }

    pub fn is_opaque_struct(&self, ty: NativeType) -> bool {
        matches!(self.data(ty), NativeTypeData::Struct(NativeStruct { body: None, .. }))
    }

    pub fn struct_body(&self, ty: NativeType) -> Option<&[NativeType]> {
        match self.data(ty) {
            NativeTypeData::Struct(s) => s.body.as_deref(),
            _ => None,
        }
    }

    pub fn struct_name(&self, ty: NativeType) -> Option<&str> {
        match self.data(ty) {
            NativeTypeData::Struct(s) => Some(&s.name),
            _ => None,
        }
    }

    /// Every named struct, in creation order
    pub fn named_structs(&self) -> impl Iterator<Item = NativeType> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, data)| matches!(data, NativeTypeData::Struct(_)))
            .map(|(i, _)| NativeType(i))
    }

    /// Returns true if a value of this type can be stored: no opaque structs or void reachable by value,
    /// and no struct that contains itself by value.
    pub fn is_sized(&self, ty: NativeType) -> bool {
        self.is_sized_inner(ty, &mut HashSet::new())
    }

    fn is_sized_inner(&self, ty: NativeType, visiting: &mut HashSet<NativeType>) -> bool {
        match self.data(ty) {
            NativeTypeData::Void | NativeTypeData::Function { .. } => false,
            NativeTypeData::Int { .. } | NativeTypeData::Float { .. } | NativeTypeData::Pointer { .. } => true,
            NativeTypeData::Vector { element, .. } | NativeTypeData::Array { element, .. } => {
                self.is_sized_inner(*element, visiting)
            }
            NativeTypeData::Struct(s) => {
                let body = match &s.body {
                    Some(body) => body,
                    None => return false,
                };
                if !visiting.insert(ty) {
                    return false;
                }
                let sized = body.iter().all(|&m| self.is_sized_inner(m, visiting));
                visiting.remove(&ty);
                sized
            }
        }
    }
}
