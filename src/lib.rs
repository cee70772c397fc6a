//! The crate converts SPIR-V shader modules into the type and value graph of a native code-generation backend.
//!
//! A conversion has three layers:
//! - [spirv] decodes a binary word stream into randomly-indexable [spirv::Instruction]s,
//!   and holds the SPIR-V enumerations and the per-opcode operand-shape table.
//! - [native] is the backend: a [native::NativeContext] owning uniqued types and named structs,
//!   and the [native::NativeModule] that generated functions and globals are added to.
//! - [convert] walks the decoded module, builds one [convert::TypeDescriptor] per SPIR-V type and
//!   produces the native types on demand, returning a [convert::ConvertedModule].
//!
//! Structs are produced in two fidelities: an opaque named type (enough to form pointers to it)
//! and a complete type with a laid-out body. Only structs used by value are ever completed,
//! so self-referential structs through pointers resolve without infinite descent.

#[macro_use]
extern crate num_derive;

pub mod convert;
pub mod native;
pub mod spirv;

pub use convert::{spirv_to_native, ConversionError, ConvertedModule, EntryPoint, TypeDescriptor};
pub use native::{NativeContext, NativeModule, NativeType};
