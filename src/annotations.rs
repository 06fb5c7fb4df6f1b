//! Annotations, element values, and type annotations.
//!
//! `ElementValue` and `TargetInfo` are single tagged enums covering every
//! element-value kind and type-annotation target rather than a flattened
//! per-field struct for each.

use crate::error::{ClassFormatError, ContextStack, FormatCause};
use crate::read::Reader;

/// `element_value_pairs` entry name plus value, and the annotation's own
/// type index (JVM spec §4.7.16).
#[derive(Clone, Debug)]
pub struct Annotation {
    pub type_index: u16,
    pub element_value_pairs: Vec<(u16, ElementValue)>,
}

/// A single annotation element's value, tag-discriminated (JVM spec
/// §4.7.16.1).
#[derive(Clone, Debug)]
pub enum ElementValue {
    /// `tag` one of B, C, D, F, I, J, S, Z, s — a constant value index.
    Constant { tag: u8, const_value_index: u16 },
    EnumConst { type_name_index: u16, const_name_index: u16 },
    ClassInfo { class_info_index: u16 },
    Nested(Box<Annotation>),
    Array(Vec<ElementValue>),
}

pub fn read_annotation(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<Annotation, ClassFormatError> {
    let type_index = reader.u16(ctx)?;
    let count = reader.u16(ctx)?;
    let mut element_value_pairs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.u16(ctx)?;
        let value = ctx.scoped("element value", |ctx| read_element_value(reader, ctx))?;
        element_value_pairs.push((name_index, value));
    }
    Ok(Annotation { type_index, element_value_pairs })
}

pub(crate) fn read_element_value(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<ElementValue, ClassFormatError> {
    let position = reader.position();
    let tag = reader.u8(ctx)?;
    Ok(match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Constant {
            tag,
            const_value_index: reader.u16(ctx)?,
        },
        b'e' => ElementValue::EnumConst {
            type_name_index: reader.u16(ctx)?,
            const_name_index: reader.u16(ctx)?,
        },
        b'c' => ElementValue::ClassInfo { class_info_index: reader.u16(ctx)? },
        b'@' => ElementValue::Nested(Box::new(read_annotation(reader, ctx)?)),
        b'[' => {
            let count = reader.u16(ctx)?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(reader, ctx)?);
            }
            ElementValue::Array(values)
        }
        other => {
            return Err(ClassFormatError::new(
                position,
                FormatCause::BadDiscriminator { byte: other },
                ctx,
            ))
        }
    })
}

/// One step of a [`TypePath`] (JVM spec §4.7.20.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypePathKind {
    ArrayElement,
    NestedType,
    WildcardBound,
    TypeArgument,
}

impl TypePathKind {
    fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::ArrayElement,
            1 => Self::NestedType,
            2 => Self::WildcardBound,
            3 => Self::TypeArgument,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TypePathStep {
    pub kind: TypePathKind,
    /// Meaningful only for `TypeArgument`: the index of the type argument.
    pub type_argument_index: u8,
}

pub type TypePath = Vec<TypePathStep>;

fn read_type_path(reader: &mut Reader<'_>, ctx: &ContextStack) -> Result<TypePath, ClassFormatError> {
    let position = reader.position();
    let count = reader.u8(ctx)?;
    let mut path = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let kind_byte = reader.u8(ctx)?;
        let kind = TypePathKind::from_u8(kind_byte).ok_or_else(|| {
            ClassFormatError::new(position, FormatCause::BadDiscriminator { byte: kind_byte }, ctx)
        })?;
        let type_argument_index = reader.u8(ctx)?;
        path.push(TypePathStep { kind, type_argument_index });
    }
    Ok(path)
}

/// A (start_pc, length, index) triple inside a `localvar_target` (JVM spec
/// §4.7.20.1).
#[derive(Copy, Clone, Debug)]
pub struct LocalVarTargetEntry {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

/// `target_info`, discriminated by `TargetType`'s category.
#[derive(Clone, Debug)]
pub enum TargetInfo {
    TypeParameter { type_parameter_index: u8 },
    Supertype { supertype_index: u16 },
    TypeParameterBound { type_parameter_index: u8, bound_index: u8 },
    Empty,
    FormalParameter { formal_parameter_index: u8 },
    Throws { throws_type_index: u16 },
    LocalVar(Vec<LocalVarTargetEntry>),
    Catch { exception_table_index: u16 },
    Offset { offset: u16 },
    TypeArgument { offset: u16, type_argument_index: u8 },
}

/// A type annotation: the underlying annotation, which target it refers to,
/// and a path locating it within a nested type (JVM spec §4.7.20).
#[derive(Clone, Debug)]
pub struct TypeAnnotation {
    pub target_type: u8,
    pub target_info: TargetInfo,
    pub type_path: TypePath,
    pub annotation: Annotation,
}

pub fn read_type_annotation(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<TypeAnnotation, ClassFormatError> {
    let position = reader.position();
    let target_type = reader.u8(ctx)?;
    let target_info = ctx.scoped("type annotation target_info", |ctx| {
        read_target_info(reader, target_type, position, ctx)
    })?;
    let type_path = read_type_path(reader, ctx)?;
    let annotation = read_annotation(reader, ctx)?;
    Ok(TypeAnnotation { target_type, target_info, type_path, annotation })
}

fn read_target_info(
    reader: &mut Reader<'_>,
    target_type: u8,
    position: u64,
    ctx: &ContextStack,
) -> Result<TargetInfo, ClassFormatError> {
    Ok(match target_type {
        0x00 | 0x01 => TargetInfo::TypeParameter { type_parameter_index: reader.u8(ctx)? },
        0x10 => TargetInfo::Supertype { supertype_index: reader.u16(ctx)? },
        0x11 | 0x12 => TargetInfo::TypeParameterBound {
            type_parameter_index: reader.u8(ctx)?,
            bound_index: reader.u8(ctx)?,
        },
        0x13 | 0x14 | 0x15 => TargetInfo::Empty,
        0x16 => TargetInfo::FormalParameter { formal_parameter_index: reader.u8(ctx)? },
        0x17 => TargetInfo::Throws { throws_type_index: reader.u16(ctx)? },
        0x40 | 0x41 => {
            let count = reader.u16(ctx)?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVarTargetEntry {
                    start_pc: reader.u16(ctx)?,
                    length: reader.u16(ctx)?,
                    index: reader.u16(ctx)?,
                });
            }
            TargetInfo::LocalVar(entries)
        }
        0x42 => TargetInfo::Catch { exception_table_index: reader.u16(ctx)? },
        0x43 | 0x44 | 0x45 | 0x46 => TargetInfo::Offset { offset: reader.u16(ctx)? },
        0x47 | 0x48 | 0x49 | 0x4A | 0x4B => TargetInfo::TypeArgument {
            offset: reader.u16(ctx)?,
            type_argument_index: reader.u8(ctx)?,
        },
        other => {
            return Err(ClassFormatError::new(
                position,
                FormatCause::BadDiscriminator { byte: other },
                ctx,
            ))
        }
    })
}

/// Reads a `RuntimeVisible/InvisibleParameterAnnotations` body: one
/// u8-counted annotation list per formal parameter.
pub fn read_parameter_annotations(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<Vec<Vec<Annotation>>, ClassFormatError> {
    let num_parameters = reader.u8(ctx)?;
    let mut parameters = Vec::with_capacity(num_parameters as usize);
    for _ in 0..num_parameters {
        let count = reader.u16(ctx)?;
        let mut annotations = Vec::with_capacity(count as usize);
        for _ in 0..count {
            annotations.push(ctx.scoped("annotation", |ctx| read_annotation(reader, ctx))?);
        }
        parameters.push(annotations);
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_value_array_nests_correctly() {
        // tag '[' count=2: int const idx 1, int const idx 2
        let bytes = [b'[', 0x00, 0x02, b'I', 0x00, 0x01, b'I', 0x00, 0x02];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let value = read_element_value(&mut reader, &mut ctx).unwrap();
        match value {
            ElementValue::Array(values) => assert_eq!(values.len(), 2),
            other => panic!("expected Array, got {other:?}"),
        }
    }

    #[test]
    fn unknown_element_value_tag_is_format_error() {
        let bytes = [b'?', 0x00, 0x01];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let err = read_element_value(&mut reader, &mut ctx).unwrap_err();
        assert!(matches!(err.cause, FormatCause::BadDiscriminator { byte: b'?' }));
    }

    #[test]
    fn type_path_reads_steps() {
        // one step: kind=TypeArgument(3), argument index 2
        let bytes = [0x01, 0x03, 0x02];
        let ctx = ContextStack::new();
        let mut reader = Reader::new(&bytes);
        let path = read_type_path(&mut reader, &ctx).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].kind, TypePathKind::TypeArgument);
        assert_eq!(path[0].type_argument_index, 2);
    }
}
