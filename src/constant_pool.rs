//! The constant pool: a 1-indexed heterogeneous table with two-slot LONG and
//! DOUBLE entries, represented as a single tagged sum type covering every
//! constant kind.

use crate::error::{ClassFormatError, ContextStack, FormatCause};
use crate::read::Reader;
use crate::version::{ClassFileVersion, Versioned};

/// The tag byte identifying a constant-pool entry's structure. The static
/// metadata lives in one table rather than per-variant methods: the JVM
/// spec name, the first class-file version that recognizes it, and how
/// many pool slots it occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstantPoolTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    Fieldref,
    Methodref,
    InterfaceMethodref,
    NameAndType,
    MethodHandle,
    MethodType,
    InvokeDynamic,
    Module,
    Package,
}

struct TagMeta {
    tag: ConstantPoolTag,
    byte: u8,
    name: &'static str,
    first_version: ClassFileVersion,
    slots: u8,
}

const TAG_TABLE: &[TagMeta] = &[
    TagMeta { tag: ConstantPoolTag::Utf8, byte: 1, name: "Utf8", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Integer, byte: 3, name: "Integer", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Float, byte: 4, name: "Float", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Long, byte: 5, name: "Long", first_version: ClassFileVersion::JAVA1_0_2, slots: 2 },
    TagMeta { tag: ConstantPoolTag::Double, byte: 6, name: "Double", first_version: ClassFileVersion::JAVA1_0_2, slots: 2 },
    TagMeta { tag: ConstantPoolTag::Class, byte: 7, name: "Class", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::String, byte: 8, name: "String", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Fieldref, byte: 9, name: "Fieldref", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Methodref, byte: 10, name: "Methodref", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::InterfaceMethodref, byte: 11, name: "InterfaceMethodref", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::NameAndType, byte: 12, name: "NameAndType", first_version: ClassFileVersion::JAVA1_0_2, slots: 1 },
    TagMeta { tag: ConstantPoolTag::MethodHandle, byte: 15, name: "MethodHandle", first_version: ClassFileVersion::JAVA7, slots: 1 },
    TagMeta { tag: ConstantPoolTag::MethodType, byte: 16, name: "MethodType", first_version: ClassFileVersion::JAVA7, slots: 1 },
    TagMeta { tag: ConstantPoolTag::InvokeDynamic, byte: 18, name: "InvokeDynamic", first_version: ClassFileVersion::JAVA7, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Module, byte: 19, name: "Module", first_version: ClassFileVersion::JAVA9, slots: 1 },
    TagMeta { tag: ConstantPoolTag::Package, byte: 20, name: "Package", first_version: ClassFileVersion::JAVA9, slots: 1 },
];

impl ConstantPoolTag {
    fn meta(self) -> &'static TagMeta {
        TAG_TABLE.iter().find(|m| m.tag == self).expect("every tag has a table row")
    }

    pub fn byte(self) -> u8 {
        self.meta().byte
    }

    pub fn canonical_name(self) -> &'static str {
        self.meta().name
    }

    pub fn num_slots(self) -> u8 {
        self.meta().slots
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        TAG_TABLE.iter().find(|m| m.byte == byte).map(|m| m.tag)
    }
}

impl Versioned for ConstantPoolTag {
    fn first_version_supporting(&self) -> ClassFileVersion {
        self.meta().first_version
    }
}

/// `reference_kind` of a `CONSTANT_MethodHandle_info`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodHandleReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl MethodHandleReferenceKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::GetField,
            2 => Self::GetStatic,
            3 => Self::PutField,
            4 => Self::PutStatic,
            5 => Self::InvokeVirtual,
            6 => Self::InvokeStatic,
            7 => Self::InvokeSpecial,
            8 => Self::NewInvokeSpecial,
            9 => Self::InvokeInterface,
            _ => return None,
        })
    }
}

/// A single constant-pool entry. One tagged sum type over every variant
/// lists, rather than a class hierarchy.
#[derive(Clone, Debug)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Fieldref { class_index: u16, name_and_type_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodref { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: MethodHandleReferenceKind, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl Constant {
    pub fn tag(&self) -> ConstantPoolTag {
        match self {
            Constant::Utf8(_) => ConstantPoolTag::Utf8,
            Constant::Integer(_) => ConstantPoolTag::Integer,
            Constant::Float(_) => ConstantPoolTag::Float,
            Constant::Long(_) => ConstantPoolTag::Long,
            Constant::Double(_) => ConstantPoolTag::Double,
            Constant::Class { .. } => ConstantPoolTag::Class,
            Constant::String { .. } => ConstantPoolTag::String,
            Constant::Fieldref { .. } => ConstantPoolTag::Fieldref,
            Constant::Methodref { .. } => ConstantPoolTag::Methodref,
            Constant::InterfaceMethodref { .. } => ConstantPoolTag::InterfaceMethodref,
            Constant::NameAndType { .. } => ConstantPoolTag::NameAndType,
            Constant::MethodHandle { .. } => ConstantPoolTag::MethodHandle,
            Constant::MethodType { .. } => ConstantPoolTag::MethodType,
            Constant::InvokeDynamic { .. } => ConstantPoolTag::InvokeDynamic,
            Constant::Module { .. } => ConstantPoolTag::Module,
            Constant::Package { .. } => ConstantPoolTag::Package,
        }
    }

    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Constant::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

enum Slot {
    Entry(Constant),
    /// The index directly following a LONG or DOUBLE entry; invalid for any
    /// direct reference.
    Dead,
}

/// The constant pool of a class file: indexed 1..constant_pool_count-1, with
/// LONG/DOUBLE entries occupying two slots. Never mutated after
/// construction.
pub struct ConstantPool {
    /// `slots[0]` is unused padding so `slots[i]` lines up with pool index
    /// `i`; `slots.len() == constant_pool_count`.
    slots: Vec<Option<Slot>>,
}

impl ConstantPool {
    pub fn count(&self) -> u16 {
        self.slots.len() as u16
    }

    fn entry(&self, index: u16, ctx: &ContextStack) -> Result<&Constant, ClassFormatError> {
        if index == 0 || index as usize >= self.slots.len() {
            return Err(ClassFormatError::new(
                0,
                FormatCause::InvalidConstantPoolIndex {
                    index,
                    reason: format!("index must be in 1..{}", self.slots.len()),
                },
                ctx,
            ));
        }
        match &self.slots[index as usize] {
            Some(Slot::Entry(c)) => Ok(c),
            Some(Slot::Dead) => Err(ClassFormatError::new(
                0,
                FormatCause::InvalidConstantPoolIndex {
                    index,
                    reason: "dead slot following a LONG/DOUBLE entry".into(),
                },
                ctx,
            )),
            None => Err(ClassFormatError::new(
                0,
                FormatCause::InvalidConstantPoolIndex {
                    index,
                    reason: "slot was never written".into(),
                },
                ctx,
            )),
        }
    }

    pub fn get(&self, index: u16, ctx: &ContextStack) -> Result<&Constant, ClassFormatError> {
        self.entry(index, ctx)
    }

    pub fn utf8(&self, index: u16, ctx: &ContextStack) -> Result<&str, ClassFormatError> {
        match self.entry(index, ctx)? {
            Constant::Utf8(s) => Ok(s.as_str()),
            other => Err(ClassFormatError::new(
                0,
                FormatCause::InvalidConstantPoolIndex {
                    index,
                    reason: format!("expected Utf8, found {:?}", other.tag()),
                },
                ctx,
            )),
        }
    }

    /// Resolves a Utf8 index that uses 0 to mean "absent" (e.g. a module's
    /// or `Requires` entry's version index).
    pub fn utf8_or_absent(&self, index: u16, ctx: &ContextStack) -> Result<Option<&str>, ClassFormatError> {
        if index == 0 {
            Ok(None)
        } else {
            Ok(Some(self.utf8(index, ctx)?))
        }
    }

    /// Resolves a `CONSTANT_Class_info` index to its binary class name.
    pub fn class_name(&self, index: u16, ctx: &ContextStack) -> Result<&str, ClassFormatError> {
        match self.entry(index, ctx)? {
            Constant::Class { name_index } => self.utf8(*name_index, ctx),
            other => Err(ClassFormatError::new(
                0,
                FormatCause::InvalidConstantPoolIndex {
                    index,
                    reason: format!("expected Class, found {:?}", other.tag()),
                },
                ctx,
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Some(Slot::Entry(c)) => Some((i as u16, c)),
            _ => None,
        })
    }
}

/// Decodes the modified-UTF-8 bytes of a `CONSTANT_Utf8_info` entry. The
/// JVM's "modified UTF-8" differs from standard UTF-8: it never encodes
/// U+0000 as a single zero byte (using the two-byte overlong form instead)
/// and represents astral characters as CESU-8 surrogate pairs rather than
/// 4-byte UTF-8 sequences. `cesu8` decodes exactly this encoding.
fn decode_modified_utf8(bytes: &[u8], position: u64, ctx: &ContextStack) -> Result<String, ClassFormatError> {
    cesu8::from_java_cesu8(bytes).map(|cow| cow.into_owned()).map_err(|_| {
        ClassFormatError::new(
            position,
            FormatCause::ConstraintViolation {
                message: "constant pool Utf8 entry is not valid modified UTF-8".into(),
            },
            ctx,
        )
    })
}

pub fn read_constant_pool(
    reader: &mut Reader<'_>,
    constant_pool_count: u16,
    ctx: &mut ContextStack,
) -> Result<ConstantPool, ClassFormatError> {
    let mut slots: Vec<Option<Slot>> = Vec::with_capacity(constant_pool_count as usize);
    slots.push(None); // index 0 is never valid.

    let mut index = 1u16;
    while index < constant_pool_count {
        let entry_position = reader.position();
        let description = format!("entry #{index} of constant pool");
        let (constant, extra_slot) = ctx.scoped(description, |ctx| {
            read_one_constant(reader, entry_position, ctx)
        })?;

        slots.push(Some(Slot::Entry(constant)));
        index += 1;
        if extra_slot {
            if index >= constant_pool_count {
                return Err(ClassFormatError::new(
                    entry_position,
                    FormatCause::ConstraintViolation {
                        message: "LONG/DOUBLE entry's dead slot overflows the constant pool".into(),
                    },
                    ctx,
                ));
            }
            slots.push(Some(Slot::Dead));
            index += 1;
        }
    }

    Ok(ConstantPool { slots })
}

/// Reads one constant-pool entry. Returns `(constant, true)` for LONG and
/// DOUBLE, signaling the caller to advance past the dead slot they occupy.
fn read_one_constant(
    reader: &mut Reader<'_>,
    entry_position: u64,
    ctx: &ContextStack,
) -> Result<(Constant, bool), ClassFormatError> {
    let tag_byte = reader.u8(ctx)?;
    let tag = ConstantPoolTag::from_byte(tag_byte).ok_or_else(|| {
        ClassFormatError::new(
            entry_position,
            FormatCause::BadDiscriminator { byte: tag_byte },
            ctx,
        )
    })?;

    Ok(match tag {
        ConstantPoolTag::Utf8 => {
            let length = reader.u16(ctx)?;
            let bytes = reader.bytes(length as usize, ctx)?;
            (Constant::Utf8(decode_modified_utf8(bytes, entry_position, ctx)?), false)
        }
        ConstantPoolTag::Integer => (Constant::Integer(reader.i32(ctx)?), false),
        ConstantPoolTag::Float => (Constant::Float(reader.f32(ctx)?), false),
        ConstantPoolTag::Long => (Constant::Long(reader.i64(ctx)?), true),
        ConstantPoolTag::Double => (Constant::Double(reader.f64(ctx)?), true),
        ConstantPoolTag::Class => (Constant::Class { name_index: reader.u16(ctx)? }, false),
        ConstantPoolTag::String => (Constant::String { string_index: reader.u16(ctx)? }, false),
        ConstantPoolTag::Fieldref => (
            Constant::Fieldref {
                class_index: reader.u16(ctx)?,
                name_and_type_index: reader.u16(ctx)?,
            },
            false,
        ),
        ConstantPoolTag::Methodref => (
            Constant::Methodref {
                class_index: reader.u16(ctx)?,
                name_and_type_index: reader.u16(ctx)?,
            },
            false,
        ),
        ConstantPoolTag::InterfaceMethodref => (
            Constant::InterfaceMethodref {
                class_index: reader.u16(ctx)?,
                name_and_type_index: reader.u16(ctx)?,
            },
            false,
        ),
        ConstantPoolTag::NameAndType => (
            Constant::NameAndType {
                name_index: reader.u16(ctx)?,
                descriptor_index: reader.u16(ctx)?,
            },
            false,
        ),
        ConstantPoolTag::MethodHandle => {
            let kind_byte = reader.u8(ctx)?;
            let reference_kind = MethodHandleReferenceKind::from_u8(kind_byte).ok_or_else(|| {
                ClassFormatError::new(
                    entry_position,
                    FormatCause::ConstraintViolation {
                        message: format!("method handle reference_kind {kind_byte} is not in 1..9"),
                    },
                    ctx,
                )
            })?;
            (
                Constant::MethodHandle {
                    reference_kind,
                    reference_index: reader.u16(ctx)?,
                },
                false,
            )
        }
        ConstantPoolTag::MethodType => (Constant::MethodType { descriptor_index: reader.u16(ctx)? }, false),
        ConstantPoolTag::InvokeDynamic => (
            Constant::InvokeDynamic {
                bootstrap_method_attr_index: reader.u16(ctx)?,
                name_and_type_index: reader.u16(ctx)?,
            },
            false,
        ),
        ConstantPoolTag::Module => (Constant::Module { name_index: reader.u16(ctx)? }, false),
        ConstantPoolTag::Package => (Constant::Package { name_index: reader.u16(ctx)? }, false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_slots_matches_spec() {
        for meta in TAG_TABLE {
            let expected = matches!(meta.tag, ConstantPoolTag::Long | ConstantPoolTag::Double);
            assert_eq!(meta.slots == 2, expected);
        }
    }

    #[test]
    fn tag_bytes_round_trip() {
        for meta in TAG_TABLE {
            assert_eq!(ConstantPoolTag::from_byte(meta.byte), Some(meta.tag));
        }
    }

    #[test]
    fn dead_slot_after_long_is_invalid() {
        // count=4: [1]=Long, [3]=Utf8("x")
        let mut bytes = vec![5u8]; // LONG tag
        bytes.extend_from_slice(&123i64.to_be_bytes());
        bytes.push(1u8); // UTF8 tag
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.push(b'x');

        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let pool = read_constant_pool(&mut reader, 4, &mut ctx).unwrap();

        assert!(matches!(pool.get(1, &ctx).unwrap(), Constant::Long(123)));
        let err = pool.get(2, &ctx).unwrap_err();
        assert!(matches!(
            err.cause,
            FormatCause::InvalidConstantPoolIndex { index: 2, .. }
        ));
        assert_eq!(pool.utf8(3, &ctx).unwrap(), "x");
    }
}
