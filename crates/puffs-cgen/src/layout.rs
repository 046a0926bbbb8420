//! Struct layout and constructor/destructor synthesis.
//!
//! Field order is ABI. A suspendible struct always starts with two
//! synthesized fields, `status` then `magic`, ahead of the declared fields
//! in declaration order.
//!
//! Every suspendible struct gets exactly one constructor and one
//! destructor. The constructor:
//! 1. returns if `self` is null;
//! 2. on a version token mismatch, writes `status` and nothing else, so a
//!    caller built against a different struct size is never overrun;
//! 3. zeroes the struct unless told it is already zeroed;
//! 4. stamps [`MAGIC`] and applies field defaults.

use puffs_types::ast::{StructDecl, TypeExpr};

use crate::buffer::Buffer;
use crate::compiler::Generator;
use crate::error::{CodegenError, CodegenResult};
use crate::status::ERROR_BAD_VERSION;
use crate::types::{self, FIELD_PREFIX};

/// Stamped into `magic` by constructors; methods check it.
pub const MAGIC: u32 = 0xCB36_99CC;

/// Passed as `for_internal_use_only` when the memory is already zeroed.
pub const ALREADY_ZEROED: u32 = 0x6860_2EF1;

/// The `PUFFS_MAGIC` and `PUFFS_ALREADY_ZEROED` definitions.
pub fn write_magic_defines(out: &mut Buffer) {
    out.writes(
        "// PUFFS_MAGIC is a magic number to check that constructors are called. It's\n\
         // not foolproof, given C doesn't automatically zero memory before use, but it\n\
         // should catch 99.99% of cases.\n\
         //\n\
         // Its (non-zero) value is arbitrary, based on md5sum(\"puffs\").\n",
    );
    printf!(out, "#define PUFFS_MAGIC (0x{MAGIC:08X}U)\n\n");
    out.writes(
        "// PUFFS_ALREADY_ZEROED is passed from a container struct's constructor to a\n\
         // containee struct's constructor when the container has already zeroed the\n\
         // containee's memory.\n\
         //\n\
         // Its (non-zero) value is arbitrary, based on md5sum(\"zeroed\").\n",
    );
    printf!(out, "#define PUFFS_ALREADY_ZEROED (0x{ALREADY_ZEROED:08X}U)\n\n");
}

impl<'a> Generator<'a> {
    fn struct_context(&self, s: &StructDecl) -> CodegenResult<String> {
        Ok(format!("struct {}", self.name(s.name)?))
    }

    pub(crate) fn write_struct(&mut self, s: &StructDecl) -> CodegenResult<()> {
        let pkg = self.pkg_name();
        let name = self.name(s.name)?;
        let context = self.struct_context(s)?;
        let ids = &self.pkg.ids;

        self.out.writes("typedef struct {\n");
        if s.suspendible {
            printf!(self.out, "puffs_{pkg}_status status;\n");
            self.out.writes("uint32_t magic;\n");
        }
        for field in &s.fields {
            types::write_field(&mut self.out, ids, field, FIELD_PREFIX, &|| context.clone())?;
            self.out.writes(";\n");
        }
        printf!(self.out, "}} puffs_{pkg}_{name};\n\n");
        Ok(())
    }

    fn write_ctor_signature(&mut self, s: &StructDecl, ctor: bool) -> CodegenResult<()> {
        let pkg = self.pkg_name();
        let name = self.name(s.name)?;
        if ctor {
            printf!(
                self.out,
                "void puffs_{pkg}_{name}_constructor(puffs_{pkg}_{name} *self, \
                 uint32_t puffs_version, uint32_t for_internal_use_only)"
            );
        } else {
            printf!(self.out, "void puffs_{pkg}_{name}_destructor(puffs_{pkg}_{name} *self)");
        }
        Ok(())
    }

    pub(crate) fn write_ctor_prototypes(&mut self, s: &StructDecl) -> CodegenResult<()> {
        if !s.suspendible {
            return Ok(());
        }
        let pkg = self.pkg_name();
        let name = self.name(s.name)?;
        if s.public {
            printf!(
                self.out,
                "// puffs_{pkg}_{name}_constructor is a constructor function.\n\
                 //\n\
                 // It should be called before any other puffs_{pkg}_{name}_* function.\n\
                 //\n\
                 // Pass PUFFS_VERSION and 0 for puffs_version and for_internal_use_only.\n"
            );
        }
        self.write_ctor_signature(s, true)?;
        self.out.writes(";\n\n");
        self.write_ctor_signature(s, false)?;
        self.out.writes(";\n\n");
        Ok(())
    }

    pub(crate) fn write_ctor_impls(&mut self, s: &StructDecl) -> CodegenResult<()> {
        if !s.suspendible {
            return Ok(());
        }
        let pkg = self.pkg_name();
        let context = self.struct_context(s)?;

        self.write_ctor_signature(s, true)?;
        self.out.writes(" {\n");
        self.out.writes("if (!self) {\nreturn;\n}\n");
        printf!(
            self.out,
            "if (puffs_version != PUFFS_VERSION) {{\n\
             self->status = puffs_{pkg}_{ERROR_BAD_VERSION};\n\
             return;\n\
             }}\n"
        );
        self.out.writes(
            "if (for_internal_use_only != PUFFS_ALREADY_ZEROED) {\n\
             memset(self, 0, sizeof(*self));\n\
             }\n",
        );
        self.out.writes("self->magic = PUFFS_MAGIC;\n");

        for field in &s.fields {
            let Some(default) = &field.default else {
                continue;
            };
            let field_name = self.name(field.name)?;
            if matches!(field.xtype, TypeExpr::Array { .. }) {
                return Err(CodegenError::Unsupported {
                    construct: format!("default value for array field {field_name:?}"),
                    context,
                    span: default.span,
                });
            }
            let Some(value) = default.const_value else {
                return Err(CodegenError::NonConstant {
                    what: "field default",
                    context,
                    span: default.span,
                });
            };
            printf!(self.out, "self->{FIELD_PREFIX}{field_name} = {value};\n");
        }
        self.out.writes("}\n\n");

        self.write_ctor_signature(s, false)?;
        self.out.writes(" {\n");
        self.out.writes("if (!self) {\nreturn;\n}\n");
        self.out.writes("}\n\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_constants_are_distinct_and_non_zero() {
        assert_ne!(MAGIC, 0);
        assert_ne!(ALREADY_ZEROED, 0);
        assert_ne!(MAGIC, ALREADY_ZEROED);
    }

    #[test]
    fn defines_spell_the_constants() {
        let mut out = Buffer::new();
        write_magic_defines(&mut out);
        assert!(out.as_str().contains("#define PUFFS_MAGIC (0xCB3699CCU)"));
        assert!(out.as_str().contains("#define PUFFS_ALREADY_ZEROED (0x68602EF1U)"));
    }
}
