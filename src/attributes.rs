//! Attribute kinds, their context masks, and parsing dispatch.
//!
//! One tagged `Attribute` enum plus a `const` `AttributeKind` metadata table
//! (canonical name, permitted context, first supporting version) drives
//! dispatch, rather than a standalone struct and parsing routine per kind.

use bitflags::bitflags;

use crate::access_flags::{InnerClassAccessFlags, ParameterAccessFlags};
use crate::annotations::{
    read_annotation, read_element_value, read_parameter_annotations, read_type_annotation,
    Annotation, ElementValue, TypeAnnotation,
};
use crate::constant_pool::ConstantPool;
use crate::error::{ClassFormatError, ContextStack, FormatCause};
use crate::module::{read_module, Module};
use crate::read::Reader;
use crate::stack_map::{read_stack_map_table, StackMapFrame};
use crate::version::{ClassFileVersion, Versioned};

bitflags! {
    /// Where an attribute kind is permitted to appear.
    pub struct AttributeContext: u8 {
        const CLASS_FILE = 0b0001;
        const FIELD_INFO = 0b0010;
        const METHOD_INFO = 0b0100;
        const CODE = 0b1000;
        const ALL = 0b1111;
    }
}

/// Which attribute structure a name dispatches to. The static metadata
/// (canonical name, context mask, first supporting version) lives in one
/// table indexed by this kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    AnnotationDefault,
    BootstrapMethods,
    Code,
    ConstantValue,
    Deprecated,
    EnclosingMethod,
    Exceptions,
    InnerClasses,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    MethodParameters,
    Module,
    ModuleMainClass,
    ModulePackages,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
    Signature,
    SourceDebugExtension,
    SourceFile,
    StackMapTable,
    Synthetic,
    /// Not a real JVM-spec kind: the fallback for an unrecognized name or a
    /// predefined name seen in the wrong context.
    Unknown,
}

struct KindMeta {
    kind: AttributeKind,
    name: &'static str,
    context: AttributeContext,
    first_version: ClassFileVersion,
}

const KIND_TABLE: &[KindMeta] = &[
    KindMeta { kind: AttributeKind::AnnotationDefault, name: "AnnotationDefault", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::BootstrapMethods, name: "BootstrapMethods", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA7 },
    KindMeta { kind: AttributeKind::Code, name: "Code", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::ConstantValue, name: "ConstantValue", context: AttributeContext::FIELD_INFO, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::Deprecated, name: "Deprecated", context: AttributeContext::ALL.difference(AttributeContext::CODE), first_version: ClassFileVersion::JAVA1_1 },
    KindMeta { kind: AttributeKind::EnclosingMethod, name: "EnclosingMethod", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::Exceptions, name: "Exceptions", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::InnerClasses, name: "InnerClasses", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA1_1 },
    KindMeta { kind: AttributeKind::LineNumberTable, name: "LineNumberTable", context: AttributeContext::CODE, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::LocalVariableTable, name: "LocalVariableTable", context: AttributeContext::CODE, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::LocalVariableTypeTable, name: "LocalVariableTypeTable", context: AttributeContext::CODE, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::MethodParameters, name: "MethodParameters", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA8 },
    KindMeta { kind: AttributeKind::Module, name: "Module", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA9 },
    KindMeta { kind: AttributeKind::ModuleMainClass, name: "ModuleMainClass", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA9 },
    KindMeta { kind: AttributeKind::ModulePackages, name: "ModulePackages", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA9 },
    KindMeta { kind: AttributeKind::RuntimeVisibleAnnotations, name: "RuntimeVisibleAnnotations", context: AttributeContext::ALL.difference(AttributeContext::CODE), first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::RuntimeInvisibleAnnotations, name: "RuntimeInvisibleAnnotations", context: AttributeContext::ALL.difference(AttributeContext::CODE), first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::RuntimeVisibleParameterAnnotations, name: "RuntimeVisibleParameterAnnotations", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::RuntimeInvisibleParameterAnnotations, name: "RuntimeInvisibleParameterAnnotations", context: AttributeContext::METHOD_INFO, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::RuntimeVisibleTypeAnnotations, name: "RuntimeVisibleTypeAnnotations", context: AttributeContext::ALL, first_version: ClassFileVersion::JAVA8 },
    KindMeta { kind: AttributeKind::RuntimeInvisibleTypeAnnotations, name: "RuntimeInvisibleTypeAnnotations", context: AttributeContext::ALL, first_version: ClassFileVersion::JAVA8 },
    KindMeta { kind: AttributeKind::Signature, name: "Signature", context: AttributeContext::ALL.difference(AttributeContext::CODE), first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::SourceDebugExtension, name: "SourceDebugExtension", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA5 },
    KindMeta { kind: AttributeKind::SourceFile, name: "SourceFile", context: AttributeContext::CLASS_FILE, first_version: ClassFileVersion::JAVA1_0_2 },
    KindMeta { kind: AttributeKind::StackMapTable, name: "StackMapTable", context: AttributeContext::CODE, first_version: ClassFileVersion::JAVA6 },
    KindMeta { kind: AttributeKind::Synthetic, name: "Synthetic", context: AttributeContext::ALL.difference(AttributeContext::CODE), first_version: ClassFileVersion::JAVA1_1 },
];

impl AttributeKind {
    fn meta(self) -> Option<&'static KindMeta> {
        KIND_TABLE.iter().find(|m| m.kind == self)
    }

    pub fn canonical_name(self) -> &'static str {
        self.meta().map_or("Unknown", |m| m.name)
    }

    /// Resolves a raw attribute name seen in `context` to its kind, falling
    /// back to `Unknown` for unrecognized names or predefined names used
    /// outside their permitted context.
    pub fn resolve(name: &str, context: AttributeContext) -> AttributeKind {
        KIND_TABLE
            .iter()
            .find(|m| m.name == name && m.context.intersects(context))
            .map_or(AttributeKind::Unknown, |m| m.kind)
    }
}

impl Versioned for AttributeKind {
    fn first_version_supporting(&self) -> ClassFileVersion {
        // Open Question 3 (DESIGN.md): Unknown is Versioned too, with the
        // lowest supported version, since this trait requires a non-null
        // answer for every value.
        self.meta().map_or(ClassFileVersion::JAVA1_0_2, |m| m.first_version)
    }
}

#[derive(Clone, Debug)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// 0 means "catches everything" (a `finally` handler).
    pub catch_type: u16,
}

#[derive(Clone, Debug)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Clone, Debug)]
pub struct InnerClassEntry {
    pub inner_class_info_index: u16,
    /// 0 if the inner class is not a member of its enclosing class (e.g. a
    /// local or anonymous class).
    pub outer_class_info_index: u16,
    /// 0 if the inner class is anonymous.
    pub inner_name_index: u16,
    pub inner_class_access_flags: InnerClassAccessFlags,
}

#[derive(Copy, Clone, Debug)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Clone, Debug)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Clone, Debug)]
pub struct LocalVariableTypeEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub signature_index: u16,
    pub index: u16,
}

#[derive(Clone, Debug)]
pub struct MethodParameterEntry {
    pub name_index: u16,
    pub access_flags: ParameterAccessFlags,
}

/// The sum type over every recognized attribute body, plus `Unknown` for
/// everything else.
#[derive(Clone, Debug)]
pub enum Attribute {
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    Code(Code),
    ConstantValue { constantvalue_index: u16 },
    Deprecated,
    EnclosingMethod { class_index: u16, method_index: u16 },
    Exceptions(Vec<u16>),
    InnerClasses(Vec<InnerClassEntry>),
    LineNumberTable(Vec<LineNumberEntry>),
    LocalVariableTable(Vec<LocalVariableEntry>),
    LocalVariableTypeTable(Vec<LocalVariableTypeEntry>),
    MethodParameters(Vec<MethodParameterEntry>),
    Module(Module),
    ModuleMainClass { main_class_index: u16 },
    ModulePackages(Vec<u16>),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    Signature { signature_index: u16 },
    SourceDebugExtension(Vec<u8>),
    SourceFile { sourcefile_index: u16 },
    StackMapTable(Vec<StackMapFrame>),
    Synthetic,
    Unknown { name_index: u16, raw_name: String, bytes: Vec<u8> },
}

fn read_u16_index_list(reader: &mut Reader<'_>, ctx: &ContextStack) -> Result<Vec<u16>, ClassFormatError> {
    let count = reader.u16(ctx)?;
    let mut indices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        indices.push(reader.u16(ctx)?);
    }
    Ok(indices)
}

/// Reads one length-prefixed attribute: `attribute_name_index` (u16),
/// `attribute_length` (u32), then a body dispatched on the resolved name.
/// The body must consume exactly `attribute_length` bytes or a
/// [`ClassFormatError`] is raised.
pub fn read_attribute(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
    context: AttributeContext,
    version: ClassFileVersion,
    ctx: &mut ContextStack,
) -> Result<Attribute, ClassFormatError> {
    let name_index = reader.u16(ctx)?;
    let length = reader.u32(ctx)?;
    let name = pool.utf8(name_index, ctx)?.to_string();
    let kind = AttributeKind::resolve(&name, context);
    let recognized = kind != AttributeKind::Unknown && kind.supports(version);

    let start = reader.position();
    let description = format!("attribute of kind {name}");
    let attribute = ctx.scoped(description, |ctx| {
        if recognized {
            read_known_attribute(kind, reader, pool, version, length, ctx)
        } else {
            let bytes = reader.owned_bytes(length as usize, ctx)?;
            Ok(Attribute::Unknown { name_index, raw_name: name.clone(), bytes })
        }
    })?;

    if recognized {
        let consumed = reader.position() - start;
        if consumed != length as u64 {
            return Err(ClassFormatError::new(
                start,
                FormatCause::ConstraintViolation {
                    message: format!(
                        "attribute {name} declared length {length} but consumed {consumed} bytes"
                    ),
                },
                ctx,
            ));
        }
    }

    Ok(attribute)
}

fn read_known_attribute(
    kind: AttributeKind,
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
    version: ClassFileVersion,
    length: u32,
    ctx: &mut ContextStack,
) -> Result<Attribute, ClassFormatError> {
    Ok(match kind {
        AttributeKind::AnnotationDefault => Attribute::AnnotationDefault(read_element_value(reader, ctx)?),
        AttributeKind::BootstrapMethods => {
            let count = reader.u16(ctx)?;
            let mut methods = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let bootstrap_method_ref = reader.u16(ctx)?;
                let bootstrap_arguments = read_u16_index_list(reader, ctx)?;
                methods.push(BootstrapMethod { bootstrap_method_ref, bootstrap_arguments });
            }
            Attribute::BootstrapMethods(methods)
        }
        AttributeKind::Code => Attribute::Code(read_code(reader, pool, version, ctx)?),
        AttributeKind::ConstantValue => Attribute::ConstantValue { constantvalue_index: reader.u16(ctx)? },
        AttributeKind::Deprecated => Attribute::Deprecated,
        AttributeKind::EnclosingMethod => Attribute::EnclosingMethod {
            class_index: reader.u16(ctx)?,
            method_index: reader.u16(ctx)?,
        },
        AttributeKind::Exceptions => Attribute::Exceptions(read_u16_index_list(reader, ctx)?),
        AttributeKind::InnerClasses => {
            let count = reader.u16(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(InnerClassEntry {
                    inner_class_info_index: reader.u16(ctx)?,
                    outer_class_info_index: reader.u16(ctx)?,
                    inner_name_index: reader.u16(ctx)?,
                    inner_class_access_flags: InnerClassAccessFlags::from_bits_truncate(reader.u16(ctx)?),
                });
            }
            Attribute::InnerClasses(entries)
        }
        AttributeKind::LineNumberTable => {
            let count = reader.u16(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LineNumberEntry { start_pc: reader.u16(ctx)?, line_number: reader.u16(ctx)? });
            }
            Attribute::LineNumberTable(entries)
        }
        AttributeKind::LocalVariableTable => {
            let count = reader.u16(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableEntry {
                    start_pc: reader.u16(ctx)?,
                    length: reader.u16(ctx)?,
                    name_index: reader.u16(ctx)?,
                    descriptor_index: reader.u16(ctx)?,
                    index: reader.u16(ctx)?,
                });
            }
            Attribute::LocalVariableTable(entries)
        }
        AttributeKind::LocalVariableTypeTable => {
            let count = reader.u16(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableTypeEntry {
                    start_pc: reader.u16(ctx)?,
                    length: reader.u16(ctx)?,
                    name_index: reader.u16(ctx)?,
                    signature_index: reader.u16(ctx)?,
                    index: reader.u16(ctx)?,
                });
            }
            Attribute::LocalVariableTypeTable(entries)
        }
        AttributeKind::MethodParameters => {
            let count = reader.u8(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(MethodParameterEntry {
                    name_index: reader.u16(ctx)?,
                    access_flags: ParameterAccessFlags::from_bits_truncate(reader.u16(ctx)?),
                });
            }
            Attribute::MethodParameters(entries)
        }
        AttributeKind::Module => Attribute::Module(read_module(reader, ctx)?),
        AttributeKind::ModuleMainClass => Attribute::ModuleMainClass { main_class_index: reader.u16(ctx)? },
        AttributeKind::ModulePackages => Attribute::ModulePackages(read_u16_index_list(reader, ctx)?),
        AttributeKind::RuntimeVisibleAnnotations => {
            Attribute::RuntimeVisibleAnnotations(read_annotation_list(reader, ctx)?)
        }
        AttributeKind::RuntimeInvisibleAnnotations => {
            Attribute::RuntimeInvisibleAnnotations(read_annotation_list(reader, ctx)?)
        }
        AttributeKind::RuntimeVisibleParameterAnnotations => {
            Attribute::RuntimeVisibleParameterAnnotations(read_parameter_annotations(reader, ctx)?)
        }
        AttributeKind::RuntimeInvisibleParameterAnnotations => {
            Attribute::RuntimeInvisibleParameterAnnotations(read_parameter_annotations(reader, ctx)?)
        }
        AttributeKind::RuntimeVisibleTypeAnnotations => {
            Attribute::RuntimeVisibleTypeAnnotations(read_type_annotation_list(reader, ctx)?)
        }
        AttributeKind::RuntimeInvisibleTypeAnnotations => {
            Attribute::RuntimeInvisibleTypeAnnotations(read_type_annotation_list(reader, ctx)?)
        }
        AttributeKind::Signature => Attribute::Signature { signature_index: reader.u16(ctx)? },
        AttributeKind::SourceDebugExtension => {
            // Unlike every other known kind, this body has no internal
            // structure: it is exactly attribute_length bytes of UTF-8-ish
            // debug text, so the length comes from the caller rather than
            // being derivable from what's read.
            Attribute::SourceDebugExtension(reader.owned_bytes(length as usize, ctx)?)
        }
        AttributeKind::SourceFile => Attribute::SourceFile { sourcefile_index: reader.u16(ctx)? },
        AttributeKind::StackMapTable => Attribute::StackMapTable(read_stack_map_table(reader, ctx)?),
        AttributeKind::Synthetic => Attribute::Synthetic,
        AttributeKind::Unknown => unreachable!("Unknown is handled by read_attribute before dispatch"),
    })
}

fn read_annotation_list(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<Vec<Annotation>, ClassFormatError> {
    let count = reader.u16(ctx)?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(ctx.scoped("annotation", |ctx| read_annotation(reader, ctx))?);
    }
    Ok(annotations)
}

fn read_type_annotation_list(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<Vec<TypeAnnotation>, ClassFormatError> {
    let count = reader.u16(ctx)?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(ctx.scoped("type annotation", |ctx| read_type_annotation(reader, ctx))?);
    }
    Ok(annotations)
}

fn read_code(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
    version: ClassFileVersion,
    ctx: &mut ContextStack,
) -> Result<Code, ClassFormatError> {
    let max_stack = reader.u16(ctx)?;
    let max_locals = reader.u16(ctx)?;
    let code_length = reader.u32(ctx)?;
    let code = reader.owned_bytes(code_length as usize, ctx)?;

    let exception_table_length = reader.u16(ctx)?;
    let mut exception_table = Vec::with_capacity(exception_table_length as usize);
    for _ in 0..exception_table_length {
        exception_table.push(ExceptionTableEntry {
            start_pc: reader.u16(ctx)?,
            end_pc: reader.u16(ctx)?,
            handler_pc: reader.u16(ctx)?,
            catch_type: reader.u16(ctx)?,
        });
    }

    let attributes_count = reader.u16(ctx)?;
    let mut attributes = Vec::with_capacity(attributes_count as usize);
    for _ in 0..attributes_count {
        attributes.push(read_attribute(reader, pool, AttributeContext::CODE, version, ctx)?);
    }

    Ok(Code { max_stack, max_locals, code, exception_table, attributes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_name_becomes_unknown() {
        let mut pool_bytes = vec![1u8]; // UTF8 tag
        pool_bytes.extend_from_slice(&11u16.to_be_bytes());
        pool_bytes.extend_from_slice(b"NotARealOne");
        let mut pool_reader = Reader::new(&pool_bytes);
        let mut ctx = ContextStack::new();
        let pool = crate::constant_pool::read_constant_pool(&mut pool_reader, 2, &mut ctx).unwrap();

        let mut body = vec![0x00, 0x01]; // name_index = 1
        body.extend_from_slice(&3u32.to_be_bytes()); // length = 3
        body.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let mut reader = Reader::new(&body);

        let attribute = read_attribute(
            &mut reader,
            &pool,
            AttributeContext::CLASS_FILE,
            ClassFileVersion::JAVA8,
            &mut ctx,
        )
        .unwrap();
        match attribute {
            Attribute::Unknown { raw_name, bytes, .. } => {
                assert_eq!(raw_name, "NotARealOne");
                assert_eq!(bytes, vec![0xAA, 0xBB, 0xCC]);
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn predefined_name_in_wrong_context_becomes_unknown() {
        let mut pool_bytes = vec![1u8];
        pool_bytes.extend_from_slice(&10u16.to_be_bytes());
        pool_bytes.extend_from_slice(b"SourceFile");
        let mut pool_reader = Reader::new(&pool_bytes);
        let mut ctx = ContextStack::new();
        let pool = crate::constant_pool::read_constant_pool(&mut pool_reader, 2, &mut ctx).unwrap();

        // SourceFile only belongs in CLASS_FILE context; ask for it in CODE.
        let mut body = vec![0x00, 0x01];
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x01]);
        let mut reader = Reader::new(&body);

        let attribute =
            read_attribute(&mut reader, &pool, AttributeContext::CODE, ClassFileVersion::JAVA8, &mut ctx)
                .unwrap();
        assert!(matches!(attribute, Attribute::Unknown { .. }));
    }

    #[test]
    fn length_mismatch_on_known_attribute_is_format_error() {
        let mut pool_bytes = vec![1u8];
        pool_bytes.extend_from_slice(&10u16.to_be_bytes());
        pool_bytes.extend_from_slice(b"SourceFile");
        let mut pool_reader = Reader::new(&pool_bytes);
        let mut ctx = ContextStack::new();
        let pool = crate::constant_pool::read_constant_pool(&mut pool_reader, 2, &mut ctx).unwrap();

        // SourceFile's body is 2 bytes; declare length 4.
        let mut body = vec![0x00, 0x01];
        body.extend_from_slice(&4u32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x01, 0xFF, 0xFF]);
        let mut reader = Reader::new(&body);

        let err = read_attribute(
            &mut reader,
            &pool,
            AttributeContext::CLASS_FILE,
            ClassFileVersion::JAVA8,
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err.cause, FormatCause::ConstraintViolation { .. }));
    }
}
