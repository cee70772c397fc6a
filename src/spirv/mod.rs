//! SPIR-V vocabulary as described in [the SPIR-V specification](https://registry.khronos.org/SPIR-V/specs/unified1/SPIRV.html).
//!
//! Only the enumerants the converter acts on are listed. Anything else decodes to an error through [decode_enum],
//! except opcodes, which are kept raw in [Instruction] so unknown instructions inside function bodies can be skipped.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use num_traits::FromPrimitive;

use crate::convert::ConversionError;

pub mod decode;
pub mod operands;

pub use decode::{parse_module, words_from_bytes, Instruction, SpirvHeader, SpirvModule};

pub type Word = u32;
pub type Id = Word;

pub const MAGIC_NUMBER: Word = 0x0723_0203;
pub const HEADER_WORD_COUNT: usize = 5;

/// Decode a raw enumerant, naming the enum type in the error.
pub fn decode_enum<T: FromPrimitive>(value: Word, instruction_start_index: usize) -> Result<T, ConversionError> {
    T::from_u32(value).ok_or_else(|| {
        ConversionError::new(
            instruction_start_index,
            format!("bad {} value: {}", short_type_name::<T>(), value),
        )
    })
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Opcode {
    Nop = 0,
    Undef = 1,
    SourceContinued = 2,
    Source = 3,
    SourceExtension = 4,
    Name = 5,
    MemberName = 6,
    String = 7,
    Line = 8,
    Extension = 10,
    ExtInstImport = 11,
    MemoryModel = 14,
    EntryPoint = 15,
    ExecutionMode = 16,
    Capability = 17,
    TypeVoid = 19,
    TypeBool = 20,
    TypeInt = 21,
    TypeFloat = 22,
    TypeVector = 23,
    TypeMatrix = 24,
    TypeImage = 25,
    TypeSampler = 26,
    TypeSampledImage = 27,
    TypeArray = 28,
    TypeRuntimeArray = 29,
    TypeStruct = 30,
    TypeOpaque = 31,
    TypePointer = 32,
    TypeFunction = 33,
    TypeEvent = 34,
    TypeDeviceEvent = 35,
    TypeReserveId = 36,
    TypeQueue = 37,
    TypePipe = 38,
    TypeForwardPointer = 39,
    ConstantTrue = 41,
    ConstantFalse = 42,
    Constant = 43,
    ConstantComposite = 44,
    ConstantSampler = 45,
    ConstantNull = 46,
    SpecConstantTrue = 48,
    SpecConstantFalse = 49,
    SpecConstant = 50,
    SpecConstantComposite = 51,
    SpecConstantOp = 52,
    Function = 54,
    FunctionParameter = 55,
    FunctionEnd = 56,
    Variable = 59,
    ArrayLength = 68,
    Decorate = 71,
    MemberDecorate = 72,
    DecorationGroup = 73,
    GroupDecorate = 74,
    GroupMemberDecorate = 75,
    VectorShuffle = 79,
    CompositeExtract = 81,
    CompositeInsert = 82,
    BranchConditional = 250,
    Switch = 251,
    LifetimeStart = 256,
    LifetimeStop = 257,
    NoLine = 317,
    ConstantPipeStorage = 323,
    ModuleProcessed = 330,
}
impl Opcode {
    /// The name used by the SPIR-V grammar, e.g. `OpTypeInt`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nop => "OpNop",
            Self::Undef => "OpUndef",
            Self::SourceContinued => "OpSourceContinued",
            Self::Source => "OpSource",
            Self::SourceExtension => "OpSourceExtension",
            Self::Name => "OpName",
            Self::MemberName => "OpMemberName",
            Self::String => "OpString",
            Self::Line => "OpLine",
            Self::Extension => "OpExtension",
            Self::ExtInstImport => "OpExtInstImport",
            Self::MemoryModel => "OpMemoryModel",
            Self::EntryPoint => "OpEntryPoint",
            Self::ExecutionMode => "OpExecutionMode",
            Self::Capability => "OpCapability",
            Self::TypeVoid => "OpTypeVoid",
            Self::TypeBool => "OpTypeBool",
            Self::TypeInt => "OpTypeInt",
            Self::TypeFloat => "OpTypeFloat",
            Self::TypeVector => "OpTypeVector",
            Self::TypeMatrix => "OpTypeMatrix",
            Self::TypeImage => "OpTypeImage",
            Self::TypeSampler => "OpTypeSampler",
            Self::TypeSampledImage => "OpTypeSampledImage",
            Self::TypeArray => "OpTypeArray",
            Self::TypeRuntimeArray => "OpTypeRuntimeArray",
            Self::TypeStruct => "OpTypeStruct",
            Self::TypeOpaque => "OpTypeOpaque",
            Self::TypePointer => "OpTypePointer",
            Self::TypeFunction => "OpTypeFunction",
            Self::TypeEvent => "OpTypeEvent",
            Self::TypeDeviceEvent => "OpTypeDeviceEvent",
            Self::TypeReserveId => "OpTypeReserveId",
            Self::TypeQueue => "OpTypeQueue",
            Self::TypePipe => "OpTypePipe",
            Self::TypeForwardPointer => "OpTypeForwardPointer",
            Self::ConstantTrue => "OpConstantTrue",
            Self::ConstantFalse => "OpConstantFalse",
            Self::Constant => "OpConstant",
            Self::ConstantComposite => "OpConstantComposite",
            Self::ConstantSampler => "OpConstantSampler",
            Self::ConstantNull => "OpConstantNull",
            Self::SpecConstantTrue => "OpSpecConstantTrue",
            Self::SpecConstantFalse => "OpSpecConstantFalse",
            Self::SpecConstant => "OpSpecConstant",
            Self::SpecConstantComposite => "OpSpecConstantComposite",
            Self::SpecConstantOp => "OpSpecConstantOp",
            Self::Function => "OpFunction",
            Self::FunctionParameter => "OpFunctionParameter",
            Self::FunctionEnd => "OpFunctionEnd",
            Self::Variable => "OpVariable",
            Self::ArrayLength => "OpArrayLength",
            Self::Decorate => "OpDecorate",
            Self::MemberDecorate => "OpMemberDecorate",
            Self::DecorationGroup => "OpDecorationGroup",
            Self::GroupDecorate => "OpGroupDecorate",
            Self::GroupMemberDecorate => "OpGroupMemberDecorate",
            Self::VectorShuffle => "OpVectorShuffle",
            Self::CompositeExtract => "OpCompositeExtract",
            Self::CompositeInsert => "OpCompositeInsert",
            Self::BranchConditional => "OpBranchConditional",
            Self::Switch => "OpSwitch",
            Self::LifetimeStart => "OpLifetimeStart",
            Self::LifetimeStop => "OpLifetimeStop",
            Self::NoLine => "OpNoLine",
            Self::ConstantPipeStorage => "OpConstantPipeStorage",
            Self::ModuleProcessed => "OpModuleProcessed",
        }
    }

    /// Returns true for every `OpType*` instruction, supported or not.
    pub fn is_type_declaration(&self) -> bool {
        (Self::TypeVoid as u16..=Self::TypeForwardPointer as u16).contains(&(*self as u16))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Decoration {
    RelaxedPrecision = 0,
    SpecId = 1,
    Block = 2,
    BufferBlock = 3,
    RowMajor = 4,
    ColMajor = 5,
    ArrayStride = 6,
    MatrixStride = 7,
    GLSLShared = 8,
    GLSLPacked = 9,
    CPacked = 10,
    BuiltIn = 11,
    NoPerspective = 13,
    Flat = 14,
    Patch = 15,
    Centroid = 16,
    Sample = 17,
    Invariant = 18,
    Restrict = 19,
    Aliased = 20,
    Volatile = 21,
    Constant = 22,
    Coherent = 23,
    NonWritable = 24,
    NonReadable = 25,
    Uniform = 26,
    SaturatedConversion = 28,
    Stream = 29,
    Location = 30,
    Component = 31,
    Index = 32,
    Binding = 33,
    DescriptorSet = 34,
    Offset = 35,
    XfbBuffer = 36,
    XfbStride = 37,
    FuncParamAttr = 38,
    FPRoundingMode = 39,
    FPFastMathMode = 40,
    LinkageAttributes = 41,
    NoContraction = 42,
    InputAttachmentIndex = 43,
    Alignment = 44,
    MaxByteOffset = 45,
}

/// Fixed, format-defined interface slots a variable or struct member can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BuiltIn {
    Position = 0,
    PointSize = 1,
    ClipDistance = 3,
    CullDistance = 4,
    VertexId = 5,
    InstanceId = 6,
    PrimitiveId = 7,
    InvocationId = 8,
    Layer = 9,
    ViewportIndex = 10,
    TessLevelOuter = 11,
    TessLevelInner = 12,
    TessCoord = 13,
    PatchVertices = 14,
    FragCoord = 15,
    PointCoord = 16,
    FrontFacing = 17,
    SampleId = 18,
    SamplePosition = 19,
    SampleMask = 20,
    FragDepth = 22,
    HelperInvocation = 23,
    NumWorkgroups = 24,
    WorkgroupSize = 25,
    WorkgroupId = 26,
    LocalInvocationId = 27,
    GlobalInvocationId = 28,
    LocalInvocationIndex = 29,
    WorkDim = 30,
    GlobalSize = 31,
    EnqueuedWorkgroupSize = 32,
    GlobalOffset = 33,
    GlobalLinearId = 34,
    SubgroupSize = 36,
    SubgroupMaxSize = 37,
    NumSubgroups = 38,
    NumEnqueuedSubgroups = 39,
    SubgroupId = 40,
    SubgroupLocalInvocationId = 41,
    VertexIndex = 42,
    InstanceIndex = 43,
    BaseVertex = 4424,
    BaseInstance = 4425,
    DrawIndex = 4426,
    DeviceIndex = 4438,
    ViewIndex = 4440,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum StorageClass {
    UniformConstant = 0,
    Input = 1,
    Uniform = 2,
    Output = 3,
    Workgroup = 4,
    CrossWorkgroup = 5,
    Private = 6,
    Function = 7,
    Generic = 8,
    PushConstant = 9,
    AtomicCounter = 10,
    Image = 11,
    StorageBuffer = 12,
}
impl StorageClass {
    /// Input and Output variables are gathered into the shader's interface struct instead of becoming globals.
    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum ExecutionModel {
    Vertex = 0,
    TessellationControl = 1,
    TessellationEvaluation = 2,
    Geometry = 3,
    Fragment = 4,
    GLCompute = 5,
    Kernel = 6,
}

/// The execution modes the converter records. Other modes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum ExecutionMode {
    OriginUpperLeft = 7,
    OriginLowerLeft = 8,
    EarlyFragmentTests = 9,
    DepthReplacing = 12,
    LocalSize = 17,
}

bitflags! {
    pub struct FunctionControl: u32 {
        const INLINE = 0b0001;
        const DONT_INLINE = 0b0010;
        const PURE = 0b0100;
        const CONST = 0b1000;
    }
}

pub const MAX_DECORATION_PARAMETERS: usize = 4;

/// A decoration together with its literal operands, as attached by `OpDecorate`/`OpMemberDecorate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationWithParameters {
    pub decoration: Decoration,
    pub parameters: ArrayVec<Word, MAX_DECORATION_PARAMETERS>,
}
impl DecorationWithParameters {
    pub fn new(decoration: Decoration) -> Self {
        Self {
            decoration,
            parameters: ArrayVec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Word) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn built_in(built_in: BuiltIn) -> Self {
        Self::new(Decoration::BuiltIn).with_parameter(built_in as Word)
    }

    /// The built-in role this decoration binds, if it is a `BuiltIn` decoration.
    pub fn built_in_role(&self) -> Option<BuiltIn> {
        if self.decoration != Decoration::BuiltIn {
            return None;
        }
        self.parameters.first().and_then(|&v| BuiltIn::from_u32(v))
    }

    pub fn location(&self) -> Option<Word> {
        match self.decoration {
            Decoration::Location => self.parameters.first().copied(),
            _ => None,
        }
    }
}
