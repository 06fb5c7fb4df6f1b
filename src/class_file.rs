//! The top-level `ClassFile` structure and its parse algorithm.
//!
//! Split into `parse` (structural, always succeeds on well-formed bytes)
//! and the opt-in `check_access_flags` (semantic, run separately).

use crate::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::attributes::{read_attribute, Attribute, AttributeContext};
use crate::constant_pool::{read_constant_pool, ConstantPool};
use crate::error::{ClassFormatError, ContextStack, FormatCause};
use crate::flags_rules::{self, FlagSet};
use crate::read::Reader;
use crate::version::ClassFileVersion;

const MAGIC: u32 = 0xCAFE_BABE;

/// A field or method: an access-flag set, a name/descriptor index pair, and
/// its own attribute table. Parameterized over the flag enum so the same
/// shape serves both.
#[derive(Clone, Debug)]
pub struct Member<F> {
    pub access_flags: F,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

pub type FieldInfo = Member<FieldAccessFlags>;
pub type MethodInfo = Member<MethodAccessFlags>;

#[derive(Clone, Debug)]
pub struct ClassFile {
    pub version: ClassFileVersion,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: u16,
    /// 0 only for `java/lang/Object`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<Attribute>,
}

/// Parses a complete class file from `data`.
/// Performs only structural parsing: constant-pool index bounds and
/// attribute length consistency are checked, but access-flag combinations
/// are not — call [`ClassFile::check_access_flags`] separately for that.
pub fn parse(data: &[u8]) -> Result<ClassFile, ClassFormatError> {
    let mut reader = Reader::new(data);
    let mut ctx = ContextStack::new();
    ctx.scoped("class file", |ctx| parse_class_file(&mut reader, ctx))
}

fn parse_class_file(reader: &mut Reader<'_>, ctx: &mut ContextStack) -> Result<ClassFile, ClassFormatError> {
    let magic = reader.u32(ctx)?;
    if magic != MAGIC {
        return Err(ClassFormatError::new(0, FormatCause::MagicMismatch { found: magic }, ctx));
    }

    let minor = reader.u16(ctx)?;
    let major = reader.u16(ctx)?;
    let version = ClassFileVersion::from_raw(major, minor);

    let constant_pool_count = reader.u16(ctx)?;
    let constant_pool =
        ctx.scoped("constant pool", |ctx| read_constant_pool(reader, constant_pool_count, ctx))?;

    let access_flags = ClassAccessFlags::from_bits_truncate(reader.u16(ctx)?);
    let this_class = reader.u16(ctx)?;
    let super_class = reader.u16(ctx)?;

    let interfaces_count = reader.u16(ctx)?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        interfaces.push(reader.u16(ctx)?);
    }

    let fields_count = reader.u16(ctx)?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for i in 0..fields_count {
        let description = format!("field #{i}");
        fields.push(ctx.scoped(description, |ctx| {
            read_member(reader, &constant_pool, AttributeContext::FIELD_INFO, version, ctx, |bits| {
                FieldAccessFlags::from_bits_truncate(bits)
            })
        })?);
    }

    let methods_count = reader.u16(ctx)?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for i in 0..methods_count {
        let description = format!("method #{i}");
        methods.push(ctx.scoped(description, |ctx| {
            read_member(reader, &constant_pool, AttributeContext::METHOD_INFO, version, ctx, |bits| {
                MethodAccessFlags::from_bits_truncate(bits)
            })
        })?);
    }

    let attributes_count = reader.u16(ctx)?;
    let mut attributes = Vec::with_capacity(attributes_count as usize);
    for _ in 0..attributes_count {
        attributes.push(read_attribute(reader, &constant_pool, AttributeContext::CLASS_FILE, version, ctx)?);
    }

    Ok(ClassFile {
        version,
        constant_pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

fn read_member<F>(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
    context: AttributeContext,
    version: ClassFileVersion,
    ctx: &mut ContextStack,
    from_bits: impl FnOnce(u16) -> F,
) -> Result<Member<F>, ClassFormatError> {
    let access_flags = from_bits(reader.u16(ctx)?);
    let name_index = reader.u16(ctx)?;
    let descriptor_index = reader.u16(ctx)?;
    let attributes_count = reader.u16(ctx)?;
    let mut attributes = Vec::with_capacity(attributes_count as usize);
    for _ in 0..attributes_count {
        attributes.push(read_attribute(reader, pool, context, version, ctx)?);
    }
    Ok(Member { access_flags, name_index, descriptor_index, attributes })
}

impl ClassFile {
    /// Validates every class/field/method access-flag set against the
    /// version-scoped rule families in [`crate::flags_rules`]. Not run
    /// automatically by [`parse`]: flag-combination validity is a distinct
    /// concern from structural well-formedness.
    pub fn check_access_flags(&self) -> Result<(), ClassFormatError> {
        let ctx = ContextStack::new();
        let bad_flags = |message: &str| {
            ClassFormatError::new(0, FormatCause::BadFlagCombination { message: message.into() }, &ctx)
        };

        flags_rules::validate(flags_rules::CLASS_RULES, self.version, self.access_flags)
            .map_err(bad_flags)?;

        let is_interface = self.access_flags.contains(ClassAccessFlags::INTERFACE);
        let field_family = if is_interface {
            flags_rules::FIELD_INTERFACE_CONTEXT_RULES
        } else {
            flags_rules::FIELD_CLASS_CONTEXT_RULES
        };
        for field in &self.fields {
            flags_rules::validate(field_family, self.version, field.access_flags).map_err(bad_flags)?;
        }

        for method in &self.methods {
            let name = self.constant_pool.utf8(method.name_index, &ctx)?;
            let method_family = if name == "<init>" {
                flags_rules::METHOD_INSTANCE_INIT_RULES
            } else if is_interface {
                flags_rules::METHOD_INTERFACE_CONTEXT_RULES
            } else {
                flags_rules::METHOD_CLASS_CONTEXT_RULES
            };
            flags_rules::validate(method_family, self.version, method.access_flags).map_err(bad_flags)?;
        }

        Ok(())
    }

    pub fn this_class_name(&self) -> Result<&str, ClassFormatError> {
        self.constant_pool.class_name(self.this_class, &ContextStack::new())
    }

    /// `None` only for `java/lang/Object`, whose `super_class` index is 0.
    pub fn super_class_name(&self) -> Result<Option<&str>, ClassFormatError> {
        if self.super_class == 0 {
            Ok(None)
        } else {
            self.constant_pool.class_name(self.super_class, &ContextStack::new()).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal well-formed class file: empty pool beyond its own name and
    /// superclass, no fields/methods/attributes.
    #[test]
    fn magic_smoke_scenario() {
        let bytes: &[u8] = &[
            0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x35, 0x00, 0x05, 0x07, 0x00, 0x03, 0x07, 0x00,
            0x04, 0x01, 0x00, 0x01, 0x41, 0x01, 0x00, 0x10, 0x6A, 0x61, 0x76, 0x61, 0x2F, 0x6C, 0x61,
            0x6E, 0x67, 0x2F, 0x4F, 0x62, 0x6A, 0x65, 0x63, 0x74, 0x06, 0x00, 0x00, 0x01, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let class_file = parse(bytes).unwrap();
        assert_eq!(class_file.version, ClassFileVersion::new(53, 0));
        assert_eq!(class_file.constant_pool.count(), 5);
        assert_eq!(class_file.access_flags.bits(), 0x0600);
        assert_eq!(class_file.this_class, 1);
        assert_eq!(class_file.super_class, 2);
        assert!(class_file.interfaces.is_empty());
        assert!(class_file.fields.is_empty());
        assert!(class_file.methods.is_empty());
        assert!(class_file.attributes.is_empty());
        assert_eq!(class_file.this_class_name().unwrap(), "A");
        assert_eq!(class_file.super_class_name().unwrap(), Some("java/lang/Object"));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x00];
        let err = parse(bytes).unwrap_err();
        assert!(matches!(err.cause, FormatCause::MagicMismatch { found: 0 }));
    }

    #[test]
    fn class_flag_rule_violation_surfaces_through_check_access_flags() {
        let mut class_file = parse(&[
            0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x35, 0x00, 0x05, 0x07, 0x00, 0x03, 0x07, 0x00,
            0x04, 0x01, 0x00, 0x01, 0x41, 0x01, 0x00, 0x10, 0x6A, 0x61, 0x76, 0x61, 0x2F, 0x6C, 0x61,
            0x6E, 0x67, 0x2F, 0x4F, 0x62, 0x6A, 0x65, 0x63, 0x74, 0x06, 0x00, 0x00, 0x01, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ])
        .unwrap();
        class_file.access_flags = ClassAccessFlags::FINAL | ClassAccessFlags::ABSTRACT;
        assert!(class_file.check_access_flags().is_err());
    }
}
