//! Type descriptors: one node per SPIR-V type, each producing its native type on demand.
//!
//! Nodes are shared through [Rc] wherever the same SPIR-V type is referenced, and are only mutated through
//! [Cell]s/[RefCell]s, so a node can be asked for its native type while it's already in the middle of producing it.
//!
//! Structs come in two fidelities. The named native struct is created opaque when the node is created,
//! which is all a pointer needs. Completing it lays out the body, and only happens when someone asks with
//! `need_complete_structs = true`. A struct which is reached again while it's being completed hands out its
//! opaque handle instead of recursing. Pointers only ever ask for the opaque handle, so `struct S { S* next; }`
//! never gets that far. Reaching a struct again with completion still requested means it contains itself by
//! value, and its completion fails with the recursion error.

use std::{
    cell::{Cell, Ref, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use crate::{
    native::{NativeContext, NativeType, DEFAULT_ADDRESS_SPACE},
    spirv::{BuiltIn, DecorationWithParameters, StorageClass},
};

use super::ConversionError;

/// Upper bound on how many times a single node may be re-entered while producing its native type.
pub const MAX_RECURSION_COUNT: usize = 5;

#[derive(Debug, Default)]
pub struct RecursionCheckerState {
    recursion_count: Cell<usize>,
}

/// Scoped reentrancy counter for one node.
///
/// Acquiring increments the node's count and fails once it exceeds [MAX_RECURSION_COUNT].
/// Dropping decrements it again, whichever way the guarded scope is left.
#[derive(Debug)]
pub struct RecursionChecker<'a> {
    state: &'a RecursionCheckerState,
}
impl<'a> RecursionChecker<'a> {
    pub fn new(state: &'a RecursionCheckerState, instruction_start_index: usize) -> Result<Self, ConversionError> {
        state.recursion_count.set(state.recursion_count.get() + 1);
        // constructed before the check so a failed acquire is released by Drop too
        let checker = Self { state };
        if checker.recursion_count() > MAX_RECURSION_COUNT {
            return Err(ConversionError::new(
                instruction_start_index,
                "too many recursions making type",
            ));
        }
        Ok(checker)
    }

    pub fn recursion_count(&self) -> usize {
        self.state.recursion_count.get()
    }

    /// True if this node was already being produced further up the stack
    pub fn is_nested_recursion(&self) -> bool {
        self.recursion_count() > 1
    }
}
impl<'a> Drop for RecursionChecker<'a> {
    fn drop(&mut self) {
        self.state.recursion_count.set(self.state.recursion_count.get() - 1);
    }
}

/// A SPIR-V type with a closed set of variants.
#[derive(Debug)]
pub enum TypeDescriptor {
    Simple(SimpleType),
    Pointer(PointerType),
    Function(FunctionType),
    Array(ArrayType),
    Struct(StructType),
}
impl TypeDescriptor {
    /// Produce (or return the memoized) native type.
    ///
    /// `need_complete_structs` asks for structs reached by value to have their bodies laid out.
    /// Once a node has produced a type, every later call returns that same type whatever flag is passed.
    pub fn get_or_make_type(
        &self,
        ctx: &mut NativeContext,
        need_complete_structs: bool,
    ) -> Result<NativeType, ConversionError> {
        match self {
            Self::Simple(t) => Ok(t.get_or_make_type()),
            Self::Pointer(t) => t.get_or_make_type(ctx, need_complete_structs),
            Self::Function(t) => t.get_or_make_type(ctx, need_complete_structs),
            Self::Array(t) => t.get_or_make_type(ctx, need_complete_structs),
            Self::Struct(t) => t.get_or_make_type(ctx, need_complete_structs),
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerType> {
        match self {
            Self::Pointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// A type with no dependencies on other nodes: void, bools, ints, floats, vectors and matrices.
#[derive(Debug)]
pub struct SimpleType {
    ty: NativeType,
}
impl SimpleType {
    pub fn new(ty: NativeType) -> Self {
        Self { ty }
    }

    pub fn get_or_make_type(&self) -> NativeType {
        self.ty
    }
}

pub struct PointerType {
    base: RefCell<Option<Rc<TypeDescriptor>>>,
    storage_class: StorageClass,
    instruction_start_index: usize,
    ty: Cell<Option<NativeType>>,
    recursion_checker_state: RecursionCheckerState,
}
impl PointerType {
    pub fn new(base: Rc<TypeDescriptor>, storage_class: StorageClass, instruction_start_index: usize) -> Self {
        Self {
            base: RefCell::new(Some(base)),
            storage_class,
            instruction_start_index,
            ty: Cell::new(None),
            recursion_checker_state: Default::default(),
        }
    }

    /// A pointer whose pointee isn't known yet, as declared by `OpTypeForwardPointer`
    pub fn new_forward_declaration(storage_class: StorageClass, instruction_start_index: usize) -> Self {
        Self {
            base: RefCell::new(None),
            storage_class,
            instruction_start_index,
            ty: Cell::new(None),
            recursion_checker_state: Default::default(),
        }
    }

    pub fn base_type(&self) -> Option<Rc<TypeDescriptor>> {
        self.base.borrow().clone()
    }

    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    pub fn instruction_start_index(&self) -> usize {
        self.instruction_start_index
    }

    /// Bind the pointee of a forward declaration. A pointee is never rebound.
    pub fn set_base_type(&self, new_base: Rc<TypeDescriptor>) -> Result<(), ConversionError> {
        let mut base = self.base.borrow_mut();
        if base.is_some() {
            return Err(ConversionError::new(
                self.instruction_start_index,
                "pointer base type is already bound",
            ));
        }
        *base = Some(new_base);
        Ok(())
    }

    /// Drop the reference to the pointee so pointer cycles don't outlive their conversion.
    /// The memoized native type is kept.
    pub(crate) fn detach_base(&self) {
        self.base.borrow_mut().take();
    }

    pub fn get_or_make_type(
        &self,
        ctx: &mut NativeContext,
        _need_complete_structs: bool,
    ) -> Result<NativeType, ConversionError> {
        if let Some(ty) = self.ty.get() {
            return Ok(ty);
        }
        let _checker = RecursionChecker::new(&self.recursion_checker_state, self.instruction_start_index)?;
        let base = self.base_type().ok_or_else(|| {
            ConversionError::new(
                self.instruction_start_index,
                "attempting to create type from pointer forward declaration",
            )
        })?;
        // an opaque pointee is always enough to form the pointer
        let base_type = base.get_or_make_type(ctx, false)?;
        let ty = ctx.pointer_type(base_type, DEFAULT_ADDRESS_SPACE);
        self.ty.set(Some(ty));
        Ok(ty)
    }
}
// the pointee is left out: pointers are where type cycles close
impl fmt::Debug for PointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerType")
            .field("base_bound", &self.base.borrow().is_some())
            .field("storage_class", &self.storage_class)
            .field("instruction_start_index", &self.instruction_start_index)
            .field("ty", &self.ty.get())
            .finish()
    }
}

#[derive(Debug)]
pub struct FunctionType {
    return_type: Rc<TypeDescriptor>,
    args: Vec<Rc<TypeDescriptor>>,
    is_var_arg: bool,
    instruction_start_index: usize,
    ty: Cell<Option<NativeType>>,
    recursion_checker_state: RecursionCheckerState,
}
impl FunctionType {
    pub fn new(
        return_type: Rc<TypeDescriptor>,
        args: Vec<Rc<TypeDescriptor>>,
        instruction_start_index: usize,
        is_var_arg: bool,
    ) -> Self {
        Self {
            return_type,
            args,
            is_var_arg,
            instruction_start_index,
            ty: Cell::new(None),
            recursion_checker_state: Default::default(),
        }
    }

    pub fn return_type(&self) -> &Rc<TypeDescriptor> {
        &self.return_type
    }

    pub fn args(&self) -> &[Rc<TypeDescriptor>] {
        &self.args
    }

    pub fn get_or_make_type(
        &self,
        ctx: &mut NativeContext,
        need_complete_structs: bool,
    ) -> Result<NativeType, ConversionError> {
        if let Some(ty) = self.ty.get() {
            return Ok(ty);
        }
        let _checker = RecursionChecker::new(&self.recursion_checker_state, self.instruction_start_index)?;
        let return_type = self.return_type.get_or_make_type(ctx, need_complete_structs)?;
        let args = self
            .args
            .iter()
            .map(|arg| arg.get_or_make_type(ctx, need_complete_structs))
            .collect::<Result<Vec<_>, _>>()?;
        let ty = ctx.function_type(return_type, &args, self.is_var_arg);
        self.ty.set(Some(ty));
        Ok(ty)
    }
}

/// Fixed-length and runtime arrays. The element is resolved lazily, so an array of a struct
/// may be declared before everything that struct points to is known.
#[derive(Debug)]
pub struct ArrayType {
    element: Rc<TypeDescriptor>,
    /// 0 for runtime arrays
    element_count: u64,
    instruction_start_index: usize,
    ty: Cell<Option<NativeType>>,
    recursion_checker_state: RecursionCheckerState,
}
impl ArrayType {
    pub fn new(element: Rc<TypeDescriptor>, element_count: u64, instruction_start_index: usize) -> Self {
        Self {
            element,
            element_count,
            instruction_start_index,
            ty: Cell::new(None),
            recursion_checker_state: Default::default(),
        }
    }

    pub fn element(&self) -> &Rc<TypeDescriptor> {
        &self.element
    }

    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    pub fn get_or_make_type(
        &self,
        ctx: &mut NativeContext,
        need_complete_structs: bool,
    ) -> Result<NativeType, ConversionError> {
        if let Some(ty) = self.ty.get() {
            return Ok(ty);
        }
        let _checker = RecursionChecker::new(&self.recursion_checker_state, self.instruction_start_index)?;
        let element = self.element.get_or_make_type(ctx, need_complete_structs)?;
        let ty = ctx.array_type(element, self.element_count);
        self.ty.set(Some(ty));
        Ok(ty)
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    pub decorations: Vec<DecorationWithParameters>,
    /// Position in the native struct body. None until the struct is complete.
    pub native_member_index: Option<usize>,
    pub type_: Rc<TypeDescriptor>,
}
impl Member {
    pub fn new(decorations: Vec<DecorationWithParameters>, type_: Rc<TypeDescriptor>) -> Self {
        Self {
            decorations,
            native_member_index: None,
            type_,
        }
    }
}

/// A struct with ordered, decorated members.
///
/// Members are never reordered, so the built-in role map only needs updating on append.
pub struct StructType {
    members: RefCell<Vec<Member>>,
    builtin_members: RefCell<HashMap<BuiltIn, usize>>,
    ty: NativeType,
    is_complete: Cell<bool>,
    /// Set when the struct was asked for its complete type while already laying out its body
    contains_itself: Cell<bool>,
    recursion_checker_state: RecursionCheckerState,
    instruction_start_index: usize,
}
impl StructType {
    /// Create the node along with its opaque named native struct.
    pub fn new(ctx: &mut NativeContext, name: &str, instruction_start_index: usize, members: Vec<Member>) -> Self {
        let s = Self {
            members: RefCell::new(vec![]),
            builtin_members: RefCell::new(HashMap::new()),
            ty: ctx.struct_create_named(name),
            is_complete: Cell::new(false),
            contains_itself: Cell::new(false),
            recursion_checker_state: Default::default(),
            instruction_start_index,
        };
        for member in members {
            s.push_member(member);
        }
        s
    }

    fn push_member(&self, member: Member) {
        let mut members = self.members.borrow_mut();
        let added_member_index = members.len();
        let mut builtin_members = self.builtin_members.borrow_mut();
        for role in member.decorations.iter().filter_map(DecorationWithParameters::built_in_role) {
            builtin_members.insert(role, added_member_index);
        }
        members.push(member);
    }

    /// Append a member. Members can only be added while the struct is still opaque.
    pub fn add_member(&self, member: Member) -> Result<(), ConversionError> {
        if self.is_complete.get() {
            return Err(ConversionError::new(
                self.instruction_start_index,
                "can't add a member to a struct whose layout is already complete",
            ));
        }
        self.push_member(member);
        Ok(())
    }

    /// Borrow the members. Don't hold on to this while the struct might be completed or appended to.
    pub fn members(&self) -> Ref<'_, Vec<Member>> {
        self.members.borrow()
    }

    /// Borrow the members, first completing the struct if their native member indices are needed.
    pub fn get_members(
        &self,
        ctx: &mut NativeContext,
        need_native_member_indexes: bool,
    ) -> Result<Ref<'_, Vec<Member>>, ConversionError> {
        if need_native_member_indexes {
            self.get_or_make_type(ctx, true)?;
        }
        Ok(self.members.borrow())
    }

    pub fn member_count(&self) -> usize {
        self.members.borrow().len()
    }

    /// The index of the member bound to the given built-in role, if any.
    pub fn builtin_member(&self, built_in: BuiltIn) -> Option<usize> {
        self.builtin_members.borrow().get(&built_in).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete.get()
    }

    /// True once a completion found this struct among its own by-value members
    pub fn contains_itself(&self) -> bool {
        self.contains_itself.get()
    }

    /// The named native struct, complete or not
    pub fn native_type(&self) -> NativeType {
        self.ty
    }

    pub fn instruction_start_index(&self) -> usize {
        self.instruction_start_index
    }

    fn complete_type(&self, ctx: &mut NativeContext, need_complete_structs: bool) -> Result<(), ConversionError> {
        // release the borrow before recursing: members may lead back here
        let member_types: Vec<Rc<TypeDescriptor>> =
            self.members.borrow().iter().map(|m| m.type_.clone()).collect();
        let mut native_members = Vec::with_capacity(member_types.len());
        for member_type in &member_types {
            native_members.push(member_type.get_or_make_type(ctx, need_complete_structs)?);
        }
        if self.contains_itself.get() {
            return Err(ConversionError::new(
                self.instruction_start_index,
                "too many recursions making type",
            ));
        }
        ctx.struct_set_body(self.ty, &native_members, false)
            .map_err(|e| ConversionError::new(self.instruction_start_index, e.to_string()))?;
        for (index, member) in self.members.borrow_mut().iter_mut().enumerate() {
            member.native_member_index = Some(index);
        }
        self.is_complete.set(true);
        Ok(())
    }

    pub fn get_or_make_type(
        &self,
        ctx: &mut NativeContext,
        need_complete_structs: bool,
    ) -> Result<NativeType, ConversionError> {
        if need_complete_structs && !self.is_complete.get() {
            let checker = RecursionChecker::new(&self.recursion_checker_state, self.instruction_start_index)?;
            if checker.is_nested_recursion() {
                // the opaque handle stands in, and the outer completion fails once its members are resolved
                self.contains_itself.set(true);
            } else {
                self.complete_type(ctx, need_complete_structs)?;
            }
        }
        Ok(self.ty)
    }
}
impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("ty", &self.ty)
            .field("member_count", &self.members.borrow().len())
            .field("builtin_members", &self.builtin_members.borrow())
            .field("is_complete", &self.is_complete.get())
            .field("contains_itself", &self.contains_itself.get())
            .field("instruction_start_index", &self.instruction_start_index)
            .finish()
    }
}
