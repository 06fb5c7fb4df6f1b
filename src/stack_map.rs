//! `StackMapTable` frames.
//!
//! A single tagged `StackMapFrame` enum covers every frame type. Frame-type
//! numbering: `CHOP` = 248..250, `SAME_EXTENDED` = 251 exactly (see
//! DESIGN.md, Open Question 1).

use crate::error::{ClassFormatError, ContextStack, FormatCause};
use crate::read::Reader;

/// A stack or local-variable slot's verification type (JVM spec §4.10.1.2).
#[derive(Clone, Debug, PartialEq)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    Uninitialized { offset: u16 },
}

fn read_verification_type_info(
    reader: &mut Reader<'_>,
    ctx: &ContextStack,
) -> Result<VerificationTypeInfo, ClassFormatError> {
    let position = reader.position();
    let tag = reader.u8(ctx)?;
    Ok(match tag {
        0 => VerificationTypeInfo::Top,
        1 => VerificationTypeInfo::Integer,
        2 => VerificationTypeInfo::Float,
        3 => VerificationTypeInfo::Double,
        4 => VerificationTypeInfo::Long,
        5 => VerificationTypeInfo::Null,
        6 => VerificationTypeInfo::UninitializedThis,
        7 => VerificationTypeInfo::Object { cpool_index: reader.u16(ctx)? },
        8 => VerificationTypeInfo::Uninitialized { offset: reader.u16(ctx)? },
        other => {
            return Err(ClassFormatError::new(
                position,
                FormatCause::BadDiscriminator { byte: other },
                ctx,
            ))
        }
    })
}

/// A single entry of a `StackMapTable` attribute, discriminated by its first
/// byte (JVM spec §4.7.4).
#[derive(Clone, Debug)]
pub enum StackMapFrame {
    Same { offset_delta: u16 },
    SameLocals1StackItem { offset_delta: u16, stack: VerificationTypeInfo },
    SameLocals1StackItemExtended { offset_delta: u16, stack: VerificationTypeInfo },
    Chop { offset_delta: u16, absent_locals: u8 },
    SameExtended { offset_delta: u16 },
    Append { offset_delta: u16, locals: Vec<VerificationTypeInfo> },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
        stack: Vec<VerificationTypeInfo>,
    },
}

pub fn read_stack_map_frame(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<StackMapFrame, ClassFormatError> {
    let position = reader.position();
    let tag = reader.u8(ctx)?;
    Ok(match tag {
        0..=63 => StackMapFrame::Same { offset_delta: tag as u16 },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            offset_delta: (tag - 64) as u16,
            stack: read_verification_type_info(reader, ctx)?,
        },
        247 => StackMapFrame::SameLocals1StackItemExtended {
            offset_delta: reader.u16(ctx)?,
            stack: read_verification_type_info(reader, ctx)?,
        },
        248..=250 => StackMapFrame::Chop {
            offset_delta: reader.u16(ctx)?,
            absent_locals: tag - 248,
        },
        251 => StackMapFrame::SameExtended { offset_delta: reader.u16(ctx)? },
        252..=254 => {
            let offset_delta = reader.u16(ctx)?;
            let count = (tag - 251) as usize;
            let mut locals = Vec::with_capacity(count);
            for _ in 0..count {
                locals.push(read_verification_type_info(reader, ctx)?);
            }
            StackMapFrame::Append { offset_delta, locals }
        }
        255 => {
            let offset_delta = reader.u16(ctx)?;
            let number_of_locals = reader.u16(ctx)?;
            let mut locals = Vec::with_capacity(number_of_locals as usize);
            for _ in 0..number_of_locals {
                locals.push(read_verification_type_info(reader, ctx)?);
            }
            let number_of_stack_items = reader.u16(ctx)?;
            let mut stack = Vec::with_capacity(number_of_stack_items as usize);
            for _ in 0..number_of_stack_items {
                stack.push(read_verification_type_info(reader, ctx)?);
            }
            StackMapFrame::Full { offset_delta, locals, stack }
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

pub fn read_stack_map_table(
    reader: &mut Reader<'_>,
    ctx: &mut ContextStack,
) -> Result<Vec<StackMapFrame>, ClassFormatError> {
    let number_of_entries = reader.u16(ctx)?;
    let mut frames = Vec::with_capacity(number_of_entries as usize);
    for i in 0..number_of_entries {
        let description = format!("frame #{i} of StackMapTable");
        frames.push(ctx.scoped(description, |ctx| read_stack_map_frame(reader, ctx))?);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_frame_byte_63_has_offset_delta_63() {
        let bytes = [63u8];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let frame = read_stack_map_frame(&mut reader, &mut ctx).unwrap();
        assert!(matches!(frame, StackMapFrame::Same { offset_delta: 63 }));
    }

    #[test]
    fn chop_covers_248_to_250() {
        for (byte, expected_k) in [(248u8, 0u8), (249, 1), (250, 2)] {
            let bytes = [byte, 0x00, 0x05];
            let mut reader = Reader::new(&bytes);
            let mut ctx = ContextStack::new();
            let frame = read_stack_map_frame(&mut reader, &mut ctx).unwrap();
            match frame {
                StackMapFrame::Chop { offset_delta, absent_locals } => {
                    assert_eq!(offset_delta, 5);
                    assert_eq!(absent_locals, expected_k);
                }
                other => panic!("expected Chop, got {other:?}"),
            }
        }
    }

    #[test]
    fn same_extended_is_exactly_251() {
        let bytes = [251u8, 0x00, 0x07];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let frame = read_stack_map_frame(&mut reader, &mut ctx).unwrap();
        assert!(matches!(frame, StackMapFrame::SameExtended { offset_delta: 7 }));
    }

    #[test]
    fn reserved_byte_128_is_format_error() {
        let bytes = [128u8];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let err = read_stack_map_frame(&mut reader, &mut ctx).unwrap_err();
        assert!(matches!(err.cause, FormatCause::BadDiscriminator { byte: 128 }));
    }

    #[test]
    fn full_frame_reads_locals_then_stack() {
        // offset_delta=1, 1 local (Integer), 1 stack item (Top)
        let bytes = [255u8, 0x00, 0x01, 0x00, 0x01, 0x01, 0x00, 0x01, 0x00];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let frame = read_stack_map_frame(&mut reader, &mut ctx).unwrap();
        match frame {
            StackMapFrame::Full { offset_delta, locals, stack } => {
                assert_eq!(offset_delta, 1);
                assert_eq!(locals, vec![VerificationTypeInfo::Integer]);
                assert_eq!(stack, vec![VerificationTypeInfo::Top]);
            }
            other => panic!("expected Full, got {other:?}"),
        }
    }
}
