use std::fmt::{Display, Formatter, Result};

use super::{Linkage, NativeContext, NativeModule, NativeStruct, NativeType, NativeTypeData};

/// Displays a type in LLVM-like syntax. Named structs print by name only.
pub struct DisplayType<'a> {
    pub ctx: &'a NativeContext,
    pub ty: NativeType,
}
impl<'a> Display for DisplayType<'a> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let sub = |ty| DisplayType { ctx: self.ctx, ty };
        match self.ctx.data(self.ty) {
            NativeTypeData::Void => write!(f, "void"),
            NativeTypeData::Int { bits } => write!(f, "i{}", bits),
            NativeTypeData::Float { bits: 16 } => write!(f, "half"),
            NativeTypeData::Float { bits: 32 } => write!(f, "float"),
            NativeTypeData::Float { .. } => write!(f, "double"),
            NativeTypeData::Vector { element, count } => write!(f, "<{} x {}>", count, sub(*element)),
            NativeTypeData::Array { element, count } => write!(f, "[{} x {}]", count, sub(*element)),
            NativeTypeData::Pointer {
                pointee,
                address_space: 0,
            } => write!(f, "{}*", sub(*pointee)),
            NativeTypeData::Pointer {
                pointee,
                address_space,
            } => write!(f, "{} addrspace({})*", sub(*pointee), address_space),
            NativeTypeData::Function {
                return_type,
                params,
                var_arg,
            } => {
                write!(f, "{} (", sub(*return_type))?;
                write!(f, "{}", DisplaySep { ctx: self.ctx, types: params })?;
                if *var_arg {
                    if params.is_empty() {
                        write!(f, "...")?;
                    } else {
                        write!(f, ", ...")?;
                    }
                }
                write!(f, ")")
            }
            NativeTypeData::Struct(NativeStruct { name, .. }) => write!(f, "%{}", name),
        }
    }
}

struct DisplaySep<'a> {
    ctx: &'a NativeContext,
    types: &'a [NativeType],
}
impl<'a> Display for DisplaySep<'a> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let mut first = true;
        for &ty in self.types {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", DisplayType { ctx: self.ctx, ty })?;
        }
        Ok(())
    }
}

/// Displays a struct definition line: `%name = type { ... }` or `%name = type opaque`
pub struct DisplayStructDefinition<'a> {
    pub ctx: &'a NativeContext,
    pub ty: NativeType,
}
impl<'a> Display for DisplayStructDefinition<'a> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self.ctx.data(self.ty) {
            NativeTypeData::Struct(NativeStruct { name, body: None, .. }) => write!(f, "%{} = type opaque", name),
            NativeTypeData::Struct(NativeStruct {
                name,
                body: Some(body),
                packed,
            }) => {
                let (open, close) = if *packed { ("<{ ", " }>") } else { ("{ ", " }") };
                if body.is_empty() {
                    write!(f, "%{} = type {{}}", name)
                } else {
                    write!(
                        f,
                        "%{} = type {}{}{}",
                        name,
                        open,
                        DisplaySep { ctx: self.ctx, types: body },
                        close
                    )
                }
            }
            _ => write!(f, "{}", DisplayType { ctx: self.ctx, ty: self.ty }),
        }
    }
}

/// Displays every named struct in the context followed by the module's globals and function declarations.
pub struct DisplayModule<'a> {
    pub ctx: &'a NativeContext,
    pub module: &'a NativeModule,
}
impl<'a> Display for DisplayModule<'a> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "; module '{}'", self.module.name)?;
        for ty in self.ctx.named_structs() {
            writeln!(f, "{}", DisplayStructDefinition { ctx: self.ctx, ty })?;
        }
        for global in &self.module.globals {
            let linkage = match global.linkage {
                Linkage::External => "",
                Linkage::Internal => "internal ",
            };
            write!(f, "@{} = {}global {}", global.name, linkage, DisplayType { ctx: self.ctx, ty: global.ty })?;
            if global.address_space != 0 {
                write!(f, " addrspace({})", global.address_space)?;
            }
            writeln!(f)?;
        }
        for function in &self.module.functions {
            match self.ctx.data(function.ty) {
                NativeTypeData::Function {
                    return_type,
                    params,
                    var_arg,
                } => {
                    let linkage = match function.linkage {
                        Linkage::External => "",
                        Linkage::Internal => "internal ",
                    };
                    write!(
                        f,
                        "declare {}{} @{}(",
                        linkage,
                        DisplayType { ctx: self.ctx, ty: *return_type },
                        function.name
                    )?;
                    for (i, &param) in params.iter().enumerate() {
                        if i != 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", DisplayType { ctx: self.ctx, ty: param })?;
                        if let Some(name) = function.param_names.get(i) {
                            write!(f, " %{}", name)?;
                        }
                    }
                    if *var_arg {
                        write!(f, "{}...", if params.is_empty() { "" } else { ", " })?;
                    }
                    writeln!(f, ")")?;
                }
                _ => writeln!(f, "; @{} has non-function type", function.name)?,
            }
        }
        Ok(())
    }
}

impl NativeContext {
    pub fn display_type(&self, ty: NativeType) -> DisplayType<'_> {
        DisplayType { ctx: self, ty }
    }

    pub fn display_module<'a>(&'a self, module: &'a NativeModule) -> DisplayModule<'a> {
        DisplayModule { ctx: self, module }
    }
}
