mod common;

use std::rc::Rc;

use common::ModuleBuilder;
use spirv_native_convert::{
    convert::convert_module,
    native::{Linkage, NativeContext, NativeType, NativeTypeData},
    spirv::{
        operands::{literal_width, LiteralWidth},
        parse_module, words_from_bytes, BuiltIn, Decoration, ExecutionMode, ExecutionModel, Opcode, StorageClass,
        Word,
    },
    spirv_to_native,
};

const PRIVATE: Word = StorageClass::Private as Word;
const INPUT: Word = StorageClass::Input as Word;
const OUTPUT: Word = StorageClass::Output as Word;

fn find_struct(ctx: &NativeContext, name: &str) -> NativeType {
    ctx.named_structs()
        .find(|&ty| ctx.struct_name(ty) == Some(name))
        .unwrap_or_else(|| panic!("no struct named {}", name))
}

#[test]
fn test_struct_used_by_value() {
    let mut b = ModuleBuilder::new();
    b.name(2, "S");
    b.name(4, "s");
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypeStruct, &[2, 1]);
    b.op(Opcode::TypePointer, &[3, PRIVATE, 2]);
    b.op(Opcode::Variable, &[3, 4, PRIVATE]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();

    let s = find_struct(&ctx, "S");
    let body = ctx.struct_body(s).expect("S should be complete");
    assert_eq!(body.len(), 1);
    assert_eq!(ctx.data(body[0]), &NativeTypeData::Int { bits: 32 });

    let global = converted.module.get_global("s").unwrap();
    assert_eq!(global.ty, s);
    assert_eq!(global.linkage, Linkage::Internal);
    assert!(converted.io_struct.is_none());
    assert!(converted.entry_points.is_empty());
}

#[test]
fn test_struct_pointing_to_itself() {
    let mut b = ModuleBuilder::new();
    b.name(2, "S");
    b.name(4, "g");
    b.op(Opcode::TypeForwardPointer, &[3, PRIVATE]);
    b.op(Opcode::TypeStruct, &[2, 3]);
    b.op(Opcode::TypePointer, &[3, PRIVATE, 2]);
    b.op(Opcode::Variable, &[3, 4, PRIVATE]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();

    let s = find_struct(&ctx, "S");
    let body = ctx.struct_body(s).unwrap();
    assert_eq!(
        ctx.data(body[0]),
        &NativeTypeData::Pointer {
            pointee: s,
            address_space: 0
        }
    );
    let text = ctx.display_module(&converted.module).to_string();
    assert!(text.contains("%S = type { %S* }"), "{}", text);
    assert!(text.contains("@g = internal global %S"), "{}", text);
}

#[test]
fn test_undefined_pointee_fails_at_pointer_declaration() {
    let mut b = ModuleBuilder::new();
    let forward_pointer = b.op(Opcode::TypeForwardPointer, &[3, PRIVATE]);
    b.op(Opcode::TypeStruct, &[2, 3]);
    b.op(Opcode::TypePointer, &[5, PRIVATE, 2]);
    let without_use = b.words();
    b.op(Opcode::Variable, &[5, 6, PRIVATE]);

    // nothing asks for the pointer's native type, so nothing fails
    let mut ctx = NativeContext::new();
    assert!(spirv_to_native(&mut ctx, &without_use).is_ok());

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.message, "attempting to create type from pointer forward declaration");
    assert_eq!(err.start_index, forward_pointer);
}

#[test]
fn test_entry_points_share_io_struct() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::Capability, &[1]);
    b.op(Opcode::MemoryModel, &[0, 1]);
    b.entry_point(ExecutionModel::Vertex as Word, 10, "main_a", &[20, 21]);
    b.entry_point(ExecutionModel::Fragment as Word, 11, "main_b", &[21]);
    b.op(Opcode::ExecutionMode, &[11, ExecutionMode::OriginUpperLeft as Word]);
    b.op(Opcode::Decorate, &[20, Decoration::Location as Word, 0]);
    b.op(Opcode::Decorate, &[21, Decoration::BuiltIn as Word, BuiltIn::Position as Word]);
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFloat, &[2, 32]);
    b.op(Opcode::TypeVector, &[3, 2, 4]);
    b.op(Opcode::TypePointer, &[4, INPUT, 3]);
    b.op(Opcode::TypePointer, &[5, OUTPUT, 3]);
    b.op(Opcode::TypeFunction, &[6, 1]);
    b.op(Opcode::Variable, &[4, 20, INPUT]);
    b.op(Opcode::Variable, &[5, 21, OUTPUT]);
    b.function(1, 10, 6, &[]);
    b.function(1, 11, 6, &[]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();

    let io_struct = converted.io_struct.as_ref().unwrap();
    let main_a = converted.entry_point("main_a").unwrap();
    let main_b = converted.entry_point("main_b").unwrap();
    assert!(Rc::ptr_eq(io_struct, main_a.io_struct.as_ref().unwrap()));
    assert!(Rc::ptr_eq(io_struct, main_b.io_struct.as_ref().unwrap()));

    let io = converted.io_struct_type().unwrap();
    assert!(io.is_complete());
    assert_eq!(io.member_count(), 2);
    assert_eq!(io.builtin_member(BuiltIn::Position), Some(1));
    assert_eq!(io.members()[0].decorations[0].location(), Some(0));
    let float = ctx.float_type(32).unwrap();
    let vec4 = ctx.vector_type(float, 4).unwrap();
    assert_eq!(ctx.struct_body(io.native_type()).unwrap(), &[vec4, vec4]);

    assert_eq!(main_a.execution_model, ExecutionModel::Vertex);
    assert_eq!(main_a.interface_members, vec![0, 1]);
    assert_eq!(main_b.interface_members, vec![1]);
    assert_eq!(main_b.execution_modes, vec![ExecutionMode::OriginUpperLeft]);
    assert!(main_a.execution_modes.is_empty());

    let wrapper = &converted.module.functions[main_a.native_function];
    assert_eq!(wrapper.name, "main_a");
    assert_eq!(wrapper.linkage, Linkage::External);
    assert_eq!(ctx.display_type(wrapper.ty).to_string(), "void (%io_struct*)");
    assert_eq!(converted.module.get_function("function_10").unwrap().linkage, Linkage::Internal);
    assert!(converted.module.get_function("function_11").is_some());
}

#[test]
fn test_compute_entry_point_without_interface() {
    let mut b = ModuleBuilder::new();
    b.entry_point(ExecutionModel::GLCompute as Word, 10, "main", &[]);
    b.op(Opcode::ExecutionMode, &[10, ExecutionMode::LocalSize as Word, 8, 4, 1]);
    b.name(10, "main");
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFunction, &[6, 1]);
    b.function(1, 10, 6, &[]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let main = converted.entry_point("main").unwrap();
    assert_eq!(main.local_size, Some([8, 4, 1]));
    assert!(main.io_struct.is_none());

    let wrapper = &converted.module.functions[main.native_function];
    assert_eq!(ctx.display_type(wrapper.ty).to_string(), "void ()");
    // the wrapper keeps the entry point's name, the function it runs gets a suffix
    assert_eq!(wrapper.name, "main");
    assert!(converted.module.get_function("main.1").is_some());
}

#[test]
fn test_entry_points_sharing_a_name() {
    let mut b = ModuleBuilder::new();
    b.entry_point(ExecutionModel::Vertex as Word, 10, "main", &[]);
    b.entry_point(ExecutionModel::Fragment as Word, 11, "main", &[]);
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFunction, &[6, 1]);
    b.function(1, 10, 6, &[]);
    b.function(1, 11, 6, &[]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    assert_eq!(converted.entry_points.len(), 2);
    let vertex = &converted.entry_points[0];
    let fragment = &converted.entry_points[1];
    assert_eq!(vertex.execution_model, ExecutionModel::Vertex);
    assert_eq!(fragment.execution_model, ExecutionModel::Fragment);

    let vertex_wrapper = &converted.module.functions[vertex.native_function];
    let fragment_wrapper = &converted.module.functions[fragment.native_function];
    assert_eq!(vertex_wrapper.name, "main");
    assert_eq!(fragment_wrapper.name, "main.1");
    assert_eq!(fragment_wrapper.linkage, Linkage::External);
    assert_ne!(vertex.native_function, fragment.native_function);
    assert_eq!(converted.module.get_function("function_11").unwrap().linkage, Linkage::Internal);
}

#[test]
fn test_interface_variable_must_be_sized() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFunction, &[2, 1]);
    b.op(Opcode::TypeInt, &[3, 32, 1]);
    b.op(Opcode::TypePointer, &[4, INPUT, 3]);
    b.op(Opcode::TypePointer, &[5, INPUT, 2]);
    b.op(Opcode::TypePointer, &[6, OUTPUT, 1]);
    b.op(Opcode::Variable, &[4, 20, INPUT]);
    let function_input = b.op(Opcode::Variable, &[5, 21, INPUT]);
    b.op(Opcode::Variable, &[6, 22, OUTPUT]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, function_input);
    assert_eq!(err.message, "interface variable %21 has an unsized type");

    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeInt, &[3, 32, 1]);
    b.op(Opcode::TypePointer, &[4, INPUT, 3]);
    b.op(Opcode::TypePointer, &[6, OUTPUT, 1]);
    b.op(Opcode::Variable, &[4, 20, INPUT]);
    let void_output = b.op(Opcode::Variable, &[6, 22, OUTPUT]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, void_output);
    assert_eq!(err.message, "interface variable %22 has an unsized type");
}

#[test]
fn test_function_types_must_be_sized() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeStruct, &[2, 1]);
    b.op(Opcode::TypeFunction, &[3, 1, 2]);
    let takes_struct = b.function(1, 10, 3, &[(2, 11)]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, takes_struct);
    assert_eq!(err.message, "parameter 0 of function %10 has an unsized type");

    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeStruct, &[2, 1]);
    b.op(Opcode::TypeFunction, &[3, 2]);
    let returns_struct = b.function(2, 10, 3, &[]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, returns_struct);
    assert_eq!(err.message, "function %10 returns an unsized type");

    // a void result is fine
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFunction, &[3, 1]);
    b.function(1, 10, 3, &[]);
    let mut ctx = NativeContext::new();
    assert!(spirv_to_native(&mut ctx, &b.words()).is_ok());
}

#[test]
fn test_io_struct_pointers_are_detached_after_conversion() {
    let mut b = ModuleBuilder::new();
    b.name(2, "Node");
    b.op(Opcode::TypeForwardPointer, &[3, PRIVATE]);
    b.op(Opcode::TypeStruct, &[2, 3]);
    b.op(Opcode::TypePointer, &[3, PRIVATE, 2]);
    b.op(Opcode::TypePointer, &[4, OUTPUT, 2]);
    b.op(Opcode::Variable, &[4, 20, OUTPUT]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let node = find_struct(&ctx, "Node");
    let io = converted.io_struct_type().unwrap();
    let member = io.members()[0].type_.clone();
    assert_eq!(member.get_or_make_type(&mut ctx, false).unwrap(), node);

    let next = member.as_struct().unwrap().members()[0].type_.clone();
    let pointer = next.as_pointer().unwrap();
    assert!(pointer.base_type().is_none());
    // the memoized native type survives the detach
    let next_ty = next.get_or_make_type(&mut ctx, true).unwrap();
    assert_eq!(
        ctx.data(next_ty),
        &NativeTypeData::Pointer {
            pointee: node,
            address_space: 0
        }
    );
    assert_eq!(ctx.struct_body(node).unwrap(), &[next_ty]);
}

#[test]
fn test_function_declarations() {
    let mut b = ModuleBuilder::new();
    b.name(10, "add");
    b.name(11, "x");
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypeFunction, &[2, 1, 1, 1]);
    b.function(1, 10, 2, &[(1, 11), (1, 12)]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let add = converted.module.get_function("add").unwrap();
    assert_eq!(add.param_names, vec!["x".to_owned(), "param_1".to_owned()]);
    let text = ctx.display_module(&converted.module).to_string();
    assert!(text.contains("declare internal i32 @add(i32 %x, i32 %param_1)"), "{}", text);
}

#[test]
fn test_function_parameter_count_mismatch() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypeFunction, &[2, 1, 1]);
    let function = b.function(1, 10, 2, &[]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, function);
}

#[test]
fn test_array_lengths_from_constants() {
    let mut b = ModuleBuilder::new();
    b.name(9, "data");
    b.op(Opcode::TypeInt, &[1, 32, 0]);
    b.op(Opcode::TypeInt, &[2, 64, 0]);
    b.op(Opcode::Constant, &[1, 3, 4]);
    b.op(Opcode::Constant, &[2, 4, 3, 0]);
    b.op(Opcode::TypeArray, &[5, 1, 3]);
    b.op(Opcode::TypeArray, &[6, 5, 4]);
    b.op(Opcode::TypePointer, &[7, PRIVATE, 6]);
    b.op(Opcode::Variable, &[7, 9, PRIVATE]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let data = converted.module.get_global("data").unwrap();
    assert_eq!(ctx.display_type(data.ty).to_string(), "[3 x [4 x i32]]");
}

#[test]
fn test_array_length_must_be_constant() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeInt, &[1, 32, 0]);
    let array = b.op(Opcode::TypeArray, &[5, 1, 3]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, array);
}

#[test]
fn test_matrix_and_runtime_array() {
    let mut b = ModuleBuilder::new();
    b.name(6, "Buffer");
    b.name(8, "buffer");
    b.op(Opcode::TypeFloat, &[1, 32]);
    b.op(Opcode::TypeVector, &[2, 1, 4]);
    b.op(Opcode::TypeMatrix, &[3, 2, 4]);
    b.op(Opcode::TypeRuntimeArray, &[4, 1]);
    b.op(Opcode::TypeStruct, &[6, 3, 4]);
    b.op(Opcode::TypePointer, &[7, StorageClass::StorageBuffer as Word, 6]);
    b.op(Opcode::Variable, &[7, 8, StorageClass::StorageBuffer as Word]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let buffer = find_struct(&ctx, "Buffer");
    let text = ctx.display_module(&converted.module).to_string();
    assert!(text.contains("%Buffer = type { [4 x <4 x float>], [0 x float] }"), "{}", text);
    let global = converted.module.get_global("buffer").unwrap();
    assert_eq!(global.ty, buffer);
    assert_eq!(global.linkage, Linkage::External);
}

#[test]
fn test_pointer_only_struct_stays_opaque() {
    let mut b = ModuleBuilder::new();
    b.name(2, "Node");
    b.name(4, "head");
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypeStruct, &[2, 1]);
    b.op(Opcode::TypePointer, &[3, PRIVATE, 2]);
    b.op(Opcode::TypePointer, &[5, PRIVATE, 3]);
    b.op(Opcode::Variable, &[5, 4, PRIVATE]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let node = find_struct(&ctx, "Node");
    assert!(ctx.is_opaque_struct(node));
    let head = converted.module.get_global("head").unwrap();
    assert_eq!(ctx.display_type(head.ty).to_string(), "%Node*");
    assert!(ctx.display_module(&converted.module).to_string().contains("%Node = type opaque"));
}

#[test]
fn test_forward_pointer_storage_class_mismatch() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypeForwardPointer, &[3, PRIVATE]);
    let pointer = b.op(Opcode::TypePointer, &[3, StorageClass::Workgroup as Word, 1]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, pointer);
}

#[test]
fn test_duplicate_type_id() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    let duplicate = b.op(Opcode::TypeFloat, &[1, 32]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, duplicate);
    assert_eq!(err.message, "id 1 is already defined");
}

#[test]
fn test_unsupported_instructions() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeFloat, &[1, 32]);
    let image = b.op(Opcode::TypeImage, &[2, 1, 1, 0, 0, 0, 1, 0]);
    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.message, "unsupported type: OpTypeImage");
    assert_eq!(err.start_index, image);

    let mut b = ModuleBuilder::new();
    b.op(Opcode::DecorationGroup, &[1]);
    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.message, "OpDecorationGroup is not supported");
}

#[test]
fn test_function_without_end() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    b.op(Opcode::TypeFunction, &[2, 1]);
    let function = b.op(Opcode::Function, &[1, 10, 0, 2]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, function);
    assert_eq!(err.message, "function is missing OpFunctionEnd");
}

#[test]
fn test_entry_point_without_function() {
    let mut b = ModuleBuilder::new();
    let entry_point = b.entry_point(ExecutionModel::Vertex as Word, 10, "main", &[]);

    let mut ctx = NativeContext::new();
    let err = spirv_to_native(&mut ctx, &b.words()).unwrap_err();
    assert_eq!(err.start_index, entry_point);
}

#[test]
fn test_unknown_decorations_are_ignored() {
    let mut b = ModuleBuilder::new();
    b.name(4, "v");
    b.op(Opcode::Decorate, &[4, 5999]);
    b.op(Opcode::TypeInt, &[1, 32, 1]);
    b.op(Opcode::TypePointer, &[3, INPUT, 1]);
    b.op(Opcode::Variable, &[3, 4, INPUT]);

    let mut ctx = NativeContext::new();
    let converted = spirv_to_native(&mut ctx, &b.words()).unwrap();
    let io = converted.io_struct_type().unwrap();
    assert!(io.members()[0].decorations.is_empty());
}

#[test]
fn test_header_errors() {
    let mut words = ModuleBuilder::new().words();
    words[0] = 0xdead_beef;
    let err = parse_module(&words).unwrap_err();
    assert_eq!(err.message, "invalid SPIR-V magic number");

    let err = parse_module(&words[..3]).unwrap_err();
    assert_eq!(err.message, "SPIR-V module is too short to hold a header");

    let mut words = ModuleBuilder::new().words();
    words[1] = 0x0002_0000;
    assert_eq!(parse_module(&words).unwrap_err().start_index, 1);
}

#[test]
fn test_instruction_word_count_errors() {
    let mut words = ModuleBuilder::new().words();
    words.push(Opcode::Nop as Word);
    let err = parse_module(&words).unwrap_err();
    assert_eq!(err.start_index, 5);
    assert_eq!(err.message, "instruction has a word count of zero");

    let mut words = ModuleBuilder::new().words();
    words.push(3 << 16 | Opcode::TypeInt as Word);
    words.push(1);
    let err = parse_module(&words).unwrap_err();
    assert_eq!((err.start_index, err.end_index), (5, 7));
}

#[test]
fn test_byte_order() {
    let mut b = ModuleBuilder::new();
    b.name(1, "counter");
    b.op(Opcode::TypeInt, &[2, 32, 0]);
    let words = b.words();

    let big_endian: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    assert_eq!(words_from_bytes(&big_endian).unwrap(), words);
    let little_endian: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    assert_eq!(words_from_bytes(&little_endian).unwrap(), words);
    assert!(words_from_bytes(&little_endian[..7]).is_err());

    let swapped: Vec<Word> = words.iter().map(|w| w.swap_bytes()).collect();
    let module = parse_module(&swapped).unwrap();
    assert_eq!(module.instructions.len(), 2);
    assert_eq!(module.instructions[0].literal_string(1).unwrap().0, "counter");
    assert_eq!(module.instructions[1].op(), Some(Opcode::TypeInt));
    assert_eq!(module.instructions[1].start_index, 5 + 4);
}

#[test]
fn test_operand_shapes() {
    assert_eq!(literal_width("OpTypeInt", 1), Some(LiteralWidth::Always32Bits));
    assert_eq!(literal_width("OpTypeInt", 0), None);
    // selector, default label, then (literal, label) pairs
    assert_eq!(literal_width("OpSwitch", 1), None);
    assert_eq!(literal_width("OpSwitch", 2), Some(LiteralWidth::MatchesTypeOfOperand(0)));
    assert_eq!(literal_width("OpSwitch", 3), None);
    assert_eq!(literal_width("OpSwitch", 4), Some(LiteralWidth::MatchesTypeOfOperand(0)));
    assert_eq!(literal_width("OpSwitch", 5), None);
    assert_eq!(literal_width("OpSwitch", 6), Some(LiteralWidth::MatchesTypeOfOperand(0)));
    assert_eq!(literal_width("OpSwitch", 7), None);
    // other tails repeat the last listed shape
    assert_eq!(literal_width("OpVectorShuffle", 9), Some(LiteralWidth::Always32Bits));
    assert_eq!(literal_width("OpConstant", 2), Some(LiteralWidth::MatchesResultType));
    assert_eq!(literal_width("OpTypeVoid", 0), None);
}

#[test]
fn test_named_module() {
    let mut b = ModuleBuilder::new();
    b.op(Opcode::TypeVoid, &[1]);
    let module = parse_module(&b.words()).unwrap();
    let mut ctx = NativeContext::new();
    let converted = convert_module(&mut ctx, &module, "fragment_shader").unwrap();
    assert_eq!(converted.module.name, "fragment_shader");
    assert!(ctx.display_module(&converted.module).to_string().starts_with("; module 'fragment_shader'"));
}
