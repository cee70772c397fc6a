//! Converts a decoded SPIR-V module into native types, globals and function declarations.
//!
//! The conversion is a single walk over the instruction stream. Type declarations build a graph of
//! [TypeDescriptor] nodes; nothing native is produced for them until something asks, so a pointer may be
//! declared before the struct it points to is fully known.
//! After the walk the interface struct is completed, then globals, entry wrappers and functions are emitted.

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use arrayvec::ArrayVec;
use num_traits::FromPrimitive;
use tracing::{debug, trace, warn};

use crate::{
    native::{Linkage, NativeContext, NativeError, NativeModule, NativeType, NativeTypeData, DEFAULT_ADDRESS_SPACE},
    spirv::{
        decode_enum,
        operands::{read_literal_number, LiteralWidth},
        parse_module, Decoration, DecorationWithParameters, ExecutionMode, ExecutionModel, FunctionControl, Id,
        Instruction, Opcode, SpirvModule, StorageClass, Word,
    },
};

mod error;
pub mod types;

pub use error::ConversionError;
pub use types::{
    ArrayType, FunctionType, Member, PointerType, RecursionChecker, RecursionCheckerState, SimpleType, StructType,
    TypeDescriptor, MAX_RECURSION_COUNT,
};

/// Name of the synthesized struct holding every Input/Output variable
pub const IO_STRUCT_NAME: &str = "io_struct";

#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub name: String,
    pub execution_model: ExecutionModel,
    /// Id of the SPIR-V function this entry point runs
    pub function_id: Id,
    pub execution_modes: Vec<ExecutionMode>,
    /// Workgroup size from `OpExecutionMode LocalSize`
    pub local_size: Option<[u32; 3]>,
    /// io struct member index of each Input/Output variable the entry point lists in its interface
    pub interface_members: Vec<usize>,
    /// The same node as [ConvertedModule::io_struct]
    pub io_struct: Option<Rc<TypeDescriptor>>,
    /// Index of the entry wrapper in [NativeModule::functions].
    /// Wrappers are named after their entry point, so when several entry points share a name
    /// (one per execution model) the later wrappers get a `.N` suffix. Look them up through this index.
    pub native_function: usize,
}

#[derive(Debug)]
pub struct ConvertedModule {
    pub module: NativeModule,
    pub entry_points: Vec<EntryPoint>,
    /// The completed interface struct, if the module has any Input/Output variables.
    ///
    /// Its members' native types and indices stay valid, but pointer nodes anywhere in the converted type graph
    /// have their pointee detached once conversion finishes: [PointerType::base_type] returns None for them
    /// while [TypeDescriptor::get_or_make_type] keeps returning the memoized pointer type.
    pub io_struct: Option<Rc<TypeDescriptor>>,
}
impl ConvertedModule {
    pub fn io_struct_type(&self) -> Option<&StructType> {
        self.io_struct.as_deref().and_then(TypeDescriptor::as_struct)
    }

    pub fn entry_point(&self, name: &str) -> Option<&EntryPoint> {
        self.entry_points.iter().find(|e| e.name == name)
    }
}

/// Decode and convert a SPIR-V word stream into a module named `shader`.
pub fn spirv_to_native(ctx: &mut NativeContext, words: &[Word]) -> Result<ConvertedModule, ConversionError> {
    let module = parse_module(words)?;
    convert_module(ctx, &module, "shader")
}

/// Convert an already decoded module.
///
/// On failure no partial module is returned, and `ctx` may hold types that nothing refers to.
pub fn convert_module(
    ctx: &mut NativeContext,
    module: &SpirvModule,
    module_name: &str,
) -> Result<ConvertedModule, ConversionError> {
    debug!(
        "converting SPIR-V {}.{} module, generator {:#x}, id bound {}",
        module.header.version_major, module.header.version_minor, module.header.generator, module.header.id_bound
    );
    let mut converter = Converter::new(ctx);
    for instruction in &module.instructions {
        converter.visit(instruction)?;
    }
    converter.finish(module_name)
}

#[derive(Debug)]
struct PendingEntryPoint {
    name: String,
    execution_model: ExecutionModel,
    function_id: Id,
    interface: Vec<Id>,
    execution_modes: Vec<ExecutionMode>,
    local_size: Option<[u32; 3]>,
    start_index: usize,
}

#[derive(Debug)]
struct PendingGlobal {
    id: Id,
    pointer_type: Rc<TypeDescriptor>,
    storage_class: StorageClass,
    start_index: usize,
}

#[derive(Debug)]
struct PendingFunction {
    id: Id,
    function_type: Rc<TypeDescriptor>,
    control: FunctionControl,
    parameters: Vec<Id>,
    start_index: usize,
}

struct Converter<'ctx> {
    ctx: &'ctx mut NativeContext,
    types: HashMap<Id, Rc<TypeDescriptor>>,
    names: HashMap<Id, String>,
    decorations: HashMap<Id, Vec<DecorationWithParameters>>,
    member_decorations: HashMap<(Id, u32), Vec<DecorationWithParameters>>,
    /// Bit width of every scalar type, for sizing constant literals
    scalar_widths: HashMap<Id, u32>,
    constants: HashMap<Id, u64>,
    entry_points: Vec<PendingEntryPoint>,
    globals: Vec<PendingGlobal>,
    functions: Vec<PendingFunction>,
    /// Index into `functions` while between OpFunction and OpFunctionEnd
    current_function: Option<usize>,
    io_struct: Option<Rc<TypeDescriptor>>,
    io_members: HashMap<Id, usize>,
    /// Variable id and start index of each io struct member, in member order
    io_variables: Vec<(Id, usize)>,
}
impl<'ctx> Converter<'ctx> {
    fn new(ctx: &'ctx mut NativeContext) -> Self {
        Self {
            ctx,
            types: HashMap::new(),
            names: HashMap::new(),
            decorations: HashMap::new(),
            member_decorations: HashMap::new(),
            scalar_widths: HashMap::new(),
            constants: HashMap::new(),
            entry_points: vec![],
            globals: vec![],
            functions: vec![],
            current_function: None,
            io_struct: None,
            io_members: HashMap::new(),
            io_variables: vec![],
        }
    }

    fn lookup_type(&self, id: Id, instruction: &Instruction) -> Result<Rc<TypeDescriptor>, ConversionError> {
        self.types
            .get(&id)
            .cloned()
            .ok_or_else(|| instruction.error(format!("id {} is not a type", id)))
    }

    fn define_type(&mut self, id: Id, node: TypeDescriptor, instruction: &Instruction) -> Result<(), ConversionError> {
        if self.types.contains_key(&id) {
            return Err(instruction.error(format!("id {} is already defined", id)));
        }
        debug!("type %{} = {:?}", id, node);
        self.types.insert(id, Rc::new(node));
        Ok(())
    }

    fn define_simple_type(
        &mut self,
        id: Id,
        ty: NativeType,
        instruction: &Instruction,
    ) -> Result<(), ConversionError> {
        self.define_type(id, TypeDescriptor::Simple(SimpleType::new(ty)), instruction)
    }

    /// Read a decoration and its parameters starting at operand `index`.
    /// Returns None for decorations the converter ignores.
    fn read_decoration(
        instruction: &Instruction,
        index: usize,
    ) -> Result<Option<DecorationWithParameters>, ConversionError> {
        let raw = instruction.operand(index)?;
        let decoration = match Decoration::from_u32(raw) {
            Some(decoration) => decoration,
            None => {
                warn!("ignoring unknown decoration {} at word {}", raw, instruction.start_index);
                return Ok(None);
            }
        };
        let parameters = match ArrayVec::try_from(instruction.operands_from(index + 1)) {
            Ok(parameters) => parameters,
            Err(_) => {
                warn!(
                    "ignoring {:?} decoration with {} parameter words at word {}",
                    decoration,
                    instruction.operands_from(index + 1).len(),
                    instruction.start_index
                );
                return Ok(None);
            }
        };
        Ok(Some(DecorationWithParameters { decoration, parameters }))
    }

    fn visit(&mut self, instruction: &Instruction) -> Result<(), ConversionError> {
        let op = instruction.op();
        if let Some(function_index) = self.current_function {
            return self.visit_function_body(function_index, op, instruction);
        }
        let op = match op {
            Some(op) => op,
            None => {
                trace!("skipping opcode {} at word {}", instruction.opcode, instruction.start_index);
                return Ok(());
            }
        };
        match op {
            Opcode::Name => {
                let target = instruction.operand(0)?;
                let (name, _) = instruction.literal_string(1)?;
                self.names.insert(target, name);
            }
            Opcode::Decorate => {
                let target = instruction.operand(0)?;
                if let Some(decoration) = Self::read_decoration(instruction, 1)? {
                    self.decorations.entry(target).or_default().push(decoration);
                }
            }
            Opcode::MemberDecorate => {
                let target = instruction.operand(0)?;
                let member = instruction.operand(1)?;
                if let Some(decoration) = Self::read_decoration(instruction, 2)? {
                    self.member_decorations.entry((target, member)).or_default().push(decoration);
                }
            }
            Opcode::DecorationGroup | Opcode::GroupDecorate | Opcode::GroupMemberDecorate => {
                return Err(instruction.error(format!("{} is not supported", op.name())));
            }
            Opcode::EntryPoint => self.visit_entry_point(instruction)?,
            Opcode::ExecutionMode => self.visit_execution_mode(instruction)?,
            Opcode::Constant | Opcode::SpecConstant => {
                let result_type = instruction.operand(0)?;
                let result = instruction.operand(1)?;
                let value = read_literal_number(instruction, 2, |shape| match shape {
                    LiteralWidth::MatchesResultType => self
                        .scalar_widths
                        .get(&result_type)
                        .copied()
                        .ok_or_else(|| instruction.error(format!("constant result type {} is not a scalar", result_type))),
                    _ => Err(instruction.error("unexpected literal shape for a constant")),
                })?;
                trace!("constant %{} = {}", result, value);
                self.constants.insert(result, value);
            }
            Opcode::Variable => self.visit_global_variable(instruction)?,
            Opcode::Function => {
                let result_type = instruction.operand(0)?;
                let id = instruction.operand(1)?;
                let control = FunctionControl::from_bits_truncate(instruction.operand(2)?);
                let function_type = self.lookup_type(instruction.operand(3)?, instruction)?;
                if function_type.as_function().is_none() {
                    return Err(instruction.error(format!("function %{} has a non-function type", id)));
                }
                if !self.types.contains_key(&result_type) {
                    return Err(instruction.error(format!("function %{} has unknown result type {}", id, result_type)));
                }
                self.functions.push(PendingFunction {
                    id,
                    function_type,
                    control,
                    parameters: vec![],
                    start_index: instruction.start_index,
                });
                self.current_function = Some(self.functions.len() - 1);
            }
            Opcode::FunctionParameter | Opcode::FunctionEnd => {
                return Err(instruction.error(format!("{} outside of a function", op.name())));
            }
            op if op.is_type_declaration() => self.visit_type(op, instruction)?,
            _ => trace!("skipping {} at word {}", op.name(), instruction.start_index),
        }
        Ok(())
    }

    fn visit_function_body(
        &mut self,
        function_index: usize,
        op: Option<Opcode>,
        instruction: &Instruction,
    ) -> Result<(), ConversionError> {
        match op {
            Some(Opcode::FunctionParameter) => {
                let id = instruction.operand(1)?;
                self.functions[function_index].parameters.push(id);
            }
            Some(Opcode::FunctionEnd) => self.current_function = None,
            Some(Opcode::Function) => return Err(instruction.error("OpFunction inside another function")),
            _ => trace!("skipping function body opcode {} at word {}", instruction.opcode, instruction.start_index),
        }
        Ok(())
    }

    fn visit_entry_point(&mut self, instruction: &Instruction) -> Result<(), ConversionError> {
        let execution_model: ExecutionModel = decode_enum(instruction.operand(0)?, instruction.start_index)?;
        let function_id = instruction.operand(1)?;
        let (name, next) = instruction.literal_string(2)?;
        let interface = instruction.operands_from(next).to_vec();
        debug!("entry point '{}': {:?} function %{}", name, execution_model, function_id);
        self.entry_points.push(PendingEntryPoint {
            name,
            execution_model,
            function_id,
            interface,
            execution_modes: vec![],
            local_size: None,
            start_index: instruction.start_index,
        });
        Ok(())
    }

    fn visit_execution_mode(&mut self, instruction: &Instruction) -> Result<(), ConversionError> {
        let function_id = instruction.operand(0)?;
        let raw_mode = instruction.operand(1)?;
        let mode = match ExecutionMode::from_u32(raw_mode) {
            Some(mode) => mode,
            None => {
                trace!("ignoring execution mode {} for %{}", raw_mode, function_id);
                return Ok(());
            }
        };
        let local_size = match mode {
            ExecutionMode::LocalSize => Some([
                instruction.operand(2)?,
                instruction.operand(3)?,
                instruction.operand(4)?,
            ]),
            _ => None,
        };
        let mut found = false;
        for entry_point in self.entry_points.iter_mut().filter(|e| e.function_id == function_id) {
            entry_point.execution_modes.push(mode);
            if local_size.is_some() {
                entry_point.local_size = local_size;
            }
            found = true;
        }
        if !found {
            return Err(instruction.error(format!("execution mode for %{}, which is not an entry point", function_id)));
        }
        Ok(())
    }

    fn visit_type(&mut self, op: Opcode, instruction: &Instruction) -> Result<(), ConversionError> {
        let id = instruction.operand(0)?;
        let native_error = |e: NativeError| instruction.error(e.to_string());
        match op {
            Opcode::TypeVoid => {
                let ty = self.ctx.void_type();
                self.define_simple_type(id, ty, instruction)?;
            }
            Opcode::TypeBool => {
                let ty = self.ctx.bool_type();
                self.define_simple_type(id, ty, instruction)?;
            }
            Opcode::TypeInt => {
                let width = instruction.operand(1)?;
                let ty = self.ctx.int_type(width).map_err(native_error)?;
                self.define_simple_type(id, ty, instruction)?;
                self.scalar_widths.insert(id, width);
            }
            Opcode::TypeFloat => {
                let width = instruction.operand(1)?;
                let ty = self.ctx.float_type(width).map_err(native_error)?;
                self.define_simple_type(id, ty, instruction)?;
                self.scalar_widths.insert(id, width);
            }
            Opcode::TypeVector | Opcode::TypeMatrix => {
                // components are scalars and columns are vectors, so these never wait on a struct
                let component = self.lookup_type(instruction.operand(1)?, instruction)?;
                let count = instruction.operand(2)?;
                let component = component.get_or_make_type(self.ctx, true)?;
                let ty = match op {
                    Opcode::TypeVector => self.ctx.vector_type(component, count).map_err(native_error)?,
                    _ => self.ctx.array_type(component, u64::from(count)),
                };
                self.define_simple_type(id, ty, instruction)?;
            }
            Opcode::TypeArray => {
                let element = self.lookup_type(instruction.operand(1)?, instruction)?;
                let length_id = instruction.operand(2)?;
                let length = self
                    .constants
                    .get(&length_id)
                    .copied()
                    .ok_or_else(|| instruction.error(format!("array length %{} is not an integer constant", length_id)))?;
                let node = ArrayType::new(element, length, instruction.start_index);
                self.define_type(id, TypeDescriptor::Array(node), instruction)?;
            }
            Opcode::TypeRuntimeArray => {
                let element = self.lookup_type(instruction.operand(1)?, instruction)?;
                let node = ArrayType::new(element, 0, instruction.start_index);
                self.define_type(id, TypeDescriptor::Array(node), instruction)?;
            }
            Opcode::TypeStruct => {
                let mut members = vec![];
                for (member_index, &member_type) in instruction.operands_from(1).iter().enumerate() {
                    let type_ = self.lookup_type(member_type, instruction)?;
                    let decorations = self
                        .member_decorations
                        .remove(&(id, member_index as u32))
                        .unwrap_or_default();
                    members.push(Member::new(decorations, type_));
                }
                let name = self.names.get(&id).cloned().unwrap_or_else(|| format!("struct_{}", id));
                let node = StructType::new(self.ctx, &name, instruction.start_index, members);
                self.define_type(id, TypeDescriptor::Struct(node), instruction)?;
            }
            Opcode::TypeForwardPointer => {
                let storage_class: StorageClass = decode_enum(instruction.operand(1)?, instruction.start_index)?;
                let node = PointerType::new_forward_declaration(storage_class, instruction.start_index);
                self.define_type(id, TypeDescriptor::Pointer(node), instruction)?;
            }
            Opcode::TypePointer => {
                let storage_class: StorageClass = decode_enum(instruction.operand(1)?, instruction.start_index)?;
                let base = self.lookup_type(instruction.operand(2)?, instruction)?;
                match self.types.get(&id).cloned() {
                    Some(existing) => {
                        let forward = existing
                            .as_pointer()
                            .filter(|p| p.base_type().is_none())
                            .ok_or_else(|| instruction.error(format!("id {} is already defined", id)))?;
                        if forward.storage_class() != storage_class {
                            return Err(instruction.error(format!(
                                "pointer %{} was forward declared as {:?} but defined as {:?}",
                                id,
                                forward.storage_class(),
                                storage_class
                            )));
                        }
                        debug!("binding forward declared pointer %{}", id);
                        forward.set_base_type(base)?;
                    }
                    None => {
                        let node = PointerType::new(base, storage_class, instruction.start_index);
                        self.define_type(id, TypeDescriptor::Pointer(node), instruction)?;
                    }
                }
            }
            Opcode::TypeFunction => {
                let return_type = self.lookup_type(instruction.operand(1)?, instruction)?;
                let args = instruction
                    .operands_from(2)
                    .iter()
                    .map(|&arg| self.lookup_type(arg, instruction))
                    .collect::<Result<Vec<_>, _>>()?;
                let node = FunctionType::new(return_type, args, instruction.start_index, false);
                self.define_type(id, TypeDescriptor::Function(node), instruction)?;
            }
            _ => return Err(instruction.error(format!("unsupported type: {}", op.name()))),
        }
        Ok(())
    }

    fn visit_global_variable(&mut self, instruction: &Instruction) -> Result<(), ConversionError> {
        let pointer_type = self.lookup_type(instruction.operand(0)?, instruction)?;
        let id = instruction.operand(1)?;
        let storage_class: StorageClass = decode_enum(instruction.operand(2)?, instruction.start_index)?;
        if storage_class == StorageClass::Function {
            return Err(instruction.error(format!("variable %{} has Function storage outside a function", id)));
        }
        let pointee = pointer_type
            .as_pointer()
            .ok_or_else(|| instruction.error(format!("variable %{} does not have a pointer type", id)))?
            .base_type()
            .ok_or_else(|| instruction.error(format!("variable %{} has a forward declared pointer type", id)))?;
        if !storage_class.is_interface() {
            self.globals.push(PendingGlobal {
                id,
                pointer_type,
                storage_class,
                start_index: instruction.start_index,
            });
            return Ok(());
        }

        let io_struct = match self.io_struct.clone() {
            Some(io_struct) => io_struct,
            None => {
                let node = StructType::new(self.ctx, IO_STRUCT_NAME, instruction.start_index, vec![]);
                let io_struct = Rc::new(TypeDescriptor::Struct(node));
                self.io_struct = Some(io_struct.clone());
                io_struct
            }
        };
        let io = io_struct
            .as_struct()
            .ok_or_else(|| instruction.error("interface struct is not a struct"))?;
        let decorations = self.decorations.get(&id).cloned().unwrap_or_default();
        io.add_member(Member::new(decorations, pointee))?;
        let member_index = io.member_count() - 1;
        debug!("{:?} variable %{} is io struct member {}", storage_class, id, member_index);
        self.io_members.insert(id, member_index);
        self.io_variables.push((id, instruction.start_index));
        Ok(())
    }

    fn finish(mut self, module_name: &str) -> Result<ConvertedModule, ConversionError> {
        if let Some(function_index) = self.current_function {
            return Err(ConversionError::new(
                self.functions[function_index].start_index,
                "function is missing OpFunctionEnd",
            ));
        }
        let mut module = NativeModule::new(module_name);

        let io_pointer = match self.io_struct.clone() {
            Some(io_struct) => {
                let io_type = io_struct.get_or_make_type(self.ctx, true)?;
                self.check_io_members_sized(&io_struct)?;
                Some(self.ctx.pointer_type(io_type, DEFAULT_ADDRESS_SPACE))
            }
            None => None,
        };

        for global in &self.globals {
            let pointee = global
                .pointer_type
                .as_pointer()
                .and_then(PointerType::base_type)
                .ok_or_else(|| ConversionError::new(global.start_index, "global variable lost its pointee type"))?;
            let ty = pointee.get_or_make_type(self.ctx, true)?;
            if !self.ctx.is_sized(ty) {
                return Err(ConversionError::new(
                    global.start_index,
                    format!("global variable %{} has an unsized type", global.id),
                ));
            }
            let linkage = match global.storage_class {
                StorageClass::Private | StorageClass::Workgroup => Linkage::Internal,
                _ => Linkage::External,
            };
            let name = self.names.get(&global.id).cloned().unwrap_or_else(|| format!("global_{}", global.id));
            module.add_global(&name, ty, DEFAULT_ADDRESS_SPACE, linkage);
        }

        // entry wrappers go in before internal functions so their names only clash with each other,
        // which happens when one name is used for several execution models
        let defined_functions: HashSet<Id> = self.functions.iter().map(|f| f.id).collect();
        let void_type = self.ctx.void_type();
        let wrapper_type = match io_pointer {
            Some(io_pointer) => self.ctx.function_type(void_type, &[io_pointer], false),
            None => self.ctx.function_type(void_type, &[], false),
        };
        let mut entry_points = Vec::with_capacity(self.entry_points.len());
        for entry_point in std::mem::take(&mut self.entry_points) {
            if !defined_functions.contains(&entry_point.function_id) {
                return Err(ConversionError::new(
                    entry_point.start_index,
                    format!("entry point '{}' refers to undefined function %{}", entry_point.name, entry_point.function_id),
                ));
            }
            let param_names = match io_pointer {
                Some(_) => vec![IO_STRUCT_NAME.to_owned()],
                None => vec![],
            };
            let native_function = module.add_function(&entry_point.name, wrapper_type, Linkage::External, param_names);
            let interface_members = entry_point
                .interface
                .iter()
                .filter_map(|id| self.io_members.get(id).copied())
                .collect();
            entry_points.push(EntryPoint {
                name: entry_point.name,
                execution_model: entry_point.execution_model,
                function_id: entry_point.function_id,
                execution_modes: entry_point.execution_modes,
                local_size: entry_point.local_size,
                interface_members,
                io_struct: self.io_struct.clone(),
                native_function,
            });
        }

        for function in &self.functions {
            let ty = function.function_type.get_or_make_type(self.ctx, true)?;
            let arg_count = function.function_type.as_function().map_or(0, |f| f.args().len());
            self.check_function_sized(function, ty)?;
            if arg_count != function.parameters.len() {
                return Err(ConversionError::new(
                    function.start_index,
                    format!(
                        "function %{} has {} parameters but its type takes {}",
                        function.id,
                        function.parameters.len(),
                        arg_count
                    ),
                ));
            }
            let name = self.names.get(&function.id).cloned().unwrap_or_else(|| format!("function_{}", function.id));
            let param_names = function
                .parameters
                .iter()
                .enumerate()
                .map(|(i, id)| self.names.get(id).cloned().unwrap_or_else(|| format!("param_{}", i)))
                .collect();
            debug!("function %{} '{}' ({:?})", function.id, name, function.control);
            module.add_function(&name, ty, Linkage::Internal, param_names);
        }

        Ok(ConvertedModule {
            module,
            entry_points,
            io_struct: self.io_struct.clone(),
        })
    }

    /// Every Input/Output variable must be storable inside the io struct.
    fn check_io_members_sized(&self, io_struct: &TypeDescriptor) -> Result<(), ConversionError> {
        let io = match io_struct.as_struct() {
            Some(io) => io,
            None => return Ok(()),
        };
        let body = self.ctx.struct_body(io.native_type()).unwrap_or_default();
        for (&member_type, &(id, start_index)) in body.iter().zip(&self.io_variables) {
            if !self.ctx.is_sized(member_type) {
                return Err(ConversionError::new(
                    start_index,
                    format!("interface variable %{} has an unsized type", id),
                ));
            }
        }
        Ok(())
    }

    /// Parameters and non-void results are passed by value, so they must be sized.
    fn check_function_sized(&self, function: &PendingFunction, ty: NativeType) -> Result<(), ConversionError> {
        let (return_type, params) = match self.ctx.data(ty) {
            NativeTypeData::Function {
                return_type, params, ..
            } => (*return_type, params),
            _ => return Ok(()),
        };
        if self.ctx.data(return_type) != &NativeTypeData::Void && !self.ctx.is_sized(return_type) {
            return Err(ConversionError::new(
                function.start_index,
                format!("function %{} returns an unsized type", function.id),
            ));
        }
        if let Some(index) = params.iter().position(|&param| !self.ctx.is_sized(param)) {
            return Err(ConversionError::new(
                function.start_index,
                format!("parameter {} of function %{} has an unsized type", index, function.id),
            ));
        }
        Ok(())
    }
}
impl<'ctx> Drop for Converter<'ctx> {
    fn drop(&mut self) {
        // pointers are the only place the type graph can loop back on itself
        for node in self.types.values() {
            if let Some(pointer) = node.as_pointer() {
                pointer.detach_base();
            }
        }
    }
}
