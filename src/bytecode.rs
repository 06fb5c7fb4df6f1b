//! Visitor-based bytecode parser.
//!
//! No instruction tree is built: each decoded instruction is forwarded to
//! one of five fixed callbacks as it's read off the code array, so the
//! parser stays allocation-free.

use crate::error::{ByteCodeFormatError, FormatCause};
use crate::opcode::{widened_shape, Opcode, OperandType, Shape};

pub trait NoOperandVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode);
}

pub trait OneOperandVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode, operand: i32);
}

pub trait TwoOperandVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode, operand1: i32, operand2: i32);
}

/// `pairs` is the raw match/offset sub-buffer: `npairs` 8-byte (i32, i32)
/// entries, unparsed — ordering and value validity are not checked here.
pub trait LookupSwitchVisitor {
    fn visit(&mut self, position: u64, default_offset: i32, pairs: &[u8]);
}

/// `jump_offsets` is the raw `high - low + 1` entry i32 sub-buffer.
pub trait TableSwitchVisitor {
    fn visit(&mut self, position: u64, default_offset: i32, low: i32, high: i32, jump_offsets: &[u8]);
}

pub struct Visitors<'v> {
    pub no_operand: &'v mut dyn NoOperandVisitor,
    pub one_operand: &'v mut dyn OneOperandVisitor,
    pub two_operand: &'v mut dyn TwoOperandVisitor,
    pub lookup_switch: &'v mut dyn LookupSwitchVisitor,
    pub table_switch: &'v mut dyn TableSwitchVisitor,
}

struct Cursor<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(code: &'a [u8]) -> Self {
        Cursor { code, pos: 0 }
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn remaining(&self) -> usize {
        self.code.len() - self.pos
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.code.len()
    }

    fn take(&mut self, n: usize, instruction_pos: u64) -> Result<&'a [u8], ByteCodeFormatError> {
        if self.remaining() < n {
            return Err(ByteCodeFormatError::with_cause(
                instruction_pos,
                format!("unexpected end of code array: needed {n} byte(s), {} available", self.remaining()),
                FormatCause::Truncated { needed: n, available: self.remaining() },
            ));
        }
        let slice = &self.code[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, instruction_pos: u64) -> Result<u8, ByteCodeFormatError> {
        Ok(self.take(1, instruction_pos)?[0])
    }

    fn i8(&mut self, instruction_pos: u64) -> Result<i8, ByteCodeFormatError> {
        Ok(self.take(1, instruction_pos)?[0] as i8)
    }

    fn u16(&mut self, instruction_pos: u64) -> Result<u16, ByteCodeFormatError> {
        Ok(u16::from_be_bytes(self.take(2, instruction_pos)?.try_into().unwrap()))
    }

    fn i16(&mut self, instruction_pos: u64) -> Result<i16, ByteCodeFormatError> {
        Ok(i16::from_be_bytes(self.take(2, instruction_pos)?.try_into().unwrap()))
    }

    fn i32(&mut self, instruction_pos: u64) -> Result<i32, ByteCodeFormatError> {
        Ok(i32::from_be_bytes(self.take(4, instruction_pos)?.try_into().unwrap()))
    }
}

fn read_operand(
    cursor: &mut Cursor<'_>,
    operand_type: OperandType,
    instruction_pos: u64,
) -> Result<i32, ByteCodeFormatError> {
    use OperandType::*;
    Ok(match operand_type {
        SignedByte => cursor.i8(instruction_pos)? as i32,
        UnsignedByte | AtypeByte | LocalVarIndexByte | ConstPoolIndexByte => {
            cursor.u8(instruction_pos)? as i32
        }
        SignedShort | BranchOffsetShort => cursor.i16(instruction_pos)? as i32,
        LocalVarIndexShort | ConstPoolIndexShort => cursor.u16(instruction_pos)? as i32,
        SignedInt | BranchOffsetInt => cursor.i32(instruction_pos)?,
    })
}

/// Parses a method's `code` array, invoking `visitors`' callbacks in source
/// order.
pub fn parse_bytecode(code: &[u8], visitors: &mut Visitors<'_>) -> Result<(), ByteCodeFormatError> {
    let mut cursor = Cursor::new(code);
    while !cursor.is_exhausted() {
        let instruction_pos = cursor.position();
        let opcode_byte = cursor.u8(instruction_pos)?;
        let opcode = Opcode::from_byte(opcode_byte).ok_or_else(|| {
            ByteCodeFormatError::with_cause(
                instruction_pos,
                format!("unrecognized opcode byte {opcode_byte:#04X}"),
                FormatCause::BadDiscriminator { byte: opcode_byte },
            )
        })?;
        dispatch(opcode, instruction_pos, &mut cursor, visitors)?;
    }
    Ok(())
}

fn dispatch(
    opcode: Opcode,
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    match opcode.shape() {
        Shape::NoOperand => visitors.no_operand.visit(instruction_pos, opcode),
        Shape::OneOperand(operand_type) => {
            let operand = read_operand(cursor, operand_type, instruction_pos)?;
            visitors.one_operand.visit(instruction_pos, opcode, operand);
        }
        Shape::TwoOperand(first, second) => {
            let operand1 = read_operand(cursor, first, instruction_pos)?;
            let operand2 = read_operand(cursor, second, instruction_pos)?;
            visitors.two_operand.visit(instruction_pos, opcode, operand1, operand2);
        }
        Shape::LookupSwitch => read_lookupswitch(instruction_pos, cursor, visitors)?,
        Shape::TableSwitch => read_tableswitch(instruction_pos, cursor, visitors)?,
        Shape::Wide => read_wide(instruction_pos, cursor, visitors)?,
        Shape::InvokeInterface => read_invokeinterface(opcode, instruction_pos, cursor, visitors)?,
        Shape::InvokeDynamic => read_invokedynamic(opcode, instruction_pos, cursor, visitors)?,
        Shape::MultiANewArray => read_multianewarray(opcode, instruction_pos, cursor, visitors)?,
    }
    Ok(())
}

/// Number of bytes to skip so the next read lands on a 4-byte boundary
/// measured from the start of the code array.
fn switch_padding(cursor: &mut Cursor<'_>, instruction_pos: u64) -> Result<(), ByteCodeFormatError> {
    let p = 4 - (instruction_pos % 4);
    let pad = (p - 1) as usize;
    cursor.take(pad, instruction_pos)?;
    Ok(())
}

fn read_lookupswitch(
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    switch_padding(cursor, instruction_pos)?;
    let default_offset = cursor.i32(instruction_pos)?;
    let npairs = cursor.i32(instruction_pos)?;
    if npairs < 0 {
        return Err(ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("lookupswitch npairs must be >= 0, got {npairs}"),
            FormatCause::ConstraintViolation { message: "lookupswitch npairs < 0".into() },
        ));
    }
    let needed = npairs as u64 * 8;
    if needed > cursor.remaining() as u64 {
        return Err(ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("lookupswitch needs {needed} byte(s) of match/offset pairs, {} available", cursor.remaining()),
            FormatCause::Truncated { needed: needed as usize, available: cursor.remaining() },
        ));
    }
    let pairs = cursor.take(needed as usize, instruction_pos)?;
    visitors.lookup_switch.visit(instruction_pos, default_offset, pairs);
    Ok(())
}

fn read_tableswitch(
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    switch_padding(cursor, instruction_pos)?;
    let default_offset = cursor.i32(instruction_pos)?;
    let low = cursor.i32(instruction_pos)?;
    let high = cursor.i32(instruction_pos)?;
    if high < low {
        return Err(ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("tableswitch high ({high}) must be >= low ({low})"),
            FormatCause::ConstraintViolation { message: "tableswitch high < low".into() },
        ));
    }
    let num_jumps = (high as i64 - low as i64) as u64 + 1;
    let needed = num_jumps * 4;
    if needed > cursor.remaining() as u64 {
        return Err(ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("tableswitch needs {needed} byte(s) of jump offsets, {} available", cursor.remaining()),
            FormatCause::Truncated { needed: needed as usize, available: cursor.remaining() },
        ));
    }
    let jump_offsets = cursor.take(needed as usize, instruction_pos)?;
    visitors.table_switch.visit(instruction_pos, default_offset, low, high, jump_offsets);
    Ok(())
}

const WIDE_ELIGIBLE_NAMES: &str =
    "ILOAD, FLOAD, ALOAD, LLOAD, DLOAD, ISTORE, FSTORE, ASTORE, LSTORE, DSTORE, RET, IINC";

fn read_wide(
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    let widened_byte = cursor.u8(instruction_pos)?;
    let widened = Opcode::from_byte(widened_byte).ok_or_else(|| {
        ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("wide prefix followed by unrecognized opcode byte {widened_byte:#04X}"),
            FormatCause::BadDiscriminator { byte: widened_byte },
        )
    })?;
    let shape = widened_shape(widened).ok_or_else(|| {
        ByteCodeFormatError::new(
            instruction_pos,
            format!("wide prefix must be followed by one of {{{WIDE_ELIGIBLE_NAMES}}}, found {}", widened.mnemonic()),
        )
    })?;
    match shape {
        Shape::OneOperand(operand_type) => {
            let operand = read_operand(cursor, operand_type, instruction_pos)?;
            visitors.one_operand.visit(instruction_pos, widened, operand);
        }
        Shape::TwoOperand(first, second) => {
            let operand1 = read_operand(cursor, first, instruction_pos)?;
            let operand2 = read_operand(cursor, second, instruction_pos)?;
            visitors.two_operand.visit(instruction_pos, widened, operand1, operand2);
        }
        _ => unreachable!("widened_shape only ever returns OneOperand or TwoOperand"),
    }
    Ok(())
}

fn mandatory_zero(byte: u8, instruction_pos: u64) -> Result<(), ByteCodeFormatError> {
    if byte != 0 {
        return Err(ByteCodeFormatError::with_cause(
            instruction_pos,
            format!("mandatory-zero byte was {byte:#04X}, not 0"),
            FormatCause::ConstraintViolation { message: "mandatory-zero byte non-zero".into() },
        ));
    }
    Ok(())
}

fn read_invokeinterface(
    opcode: Opcode,
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    let index = cursor.u16(instruction_pos)?;
    let count = cursor.u8(instruction_pos)?;
    let zero = cursor.u8(instruction_pos)?;
    mandatory_zero(zero, instruction_pos)?;
    visitors.two_operand.visit(instruction_pos, opcode, index as i32, count as i32);
    Ok(())
}

fn read_invokedynamic(
    opcode: Opcode,
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    let index = cursor.u16(instruction_pos)?;
    let zero1 = cursor.u8(instruction_pos)?;
    let zero2 = cursor.u8(instruction_pos)?;
    mandatory_zero(zero1, instruction_pos)?;
    mandatory_zero(zero2, instruction_pos)?;
    visitors.one_operand.visit(instruction_pos, opcode, index as i32);
    Ok(())
}

fn read_multianewarray(
    opcode: Opcode,
    instruction_pos: u64,
    cursor: &mut Cursor<'_>,
    visitors: &mut Visitors<'_>,
) -> Result<(), ByteCodeFormatError> {
    let index = cursor.u16(instruction_pos)?;
    let dimensions = cursor.u8(instruction_pos)?;
    visitors.two_operand.visit(instruction_pos, opcode, index as i32, dimensions as i32);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log<T> = Rc<RefCell<Vec<T>>>;

    struct NoOpLog(Log<(u64, Opcode)>);
    impl NoOperandVisitor for NoOpLog {
        fn visit(&mut self, position: u64, opcode: Opcode) {
            self.0.borrow_mut().push((position, opcode));
        }
    }

    struct OneOpLog(Log<(u64, Opcode, i32)>);
    impl OneOperandVisitor for OneOpLog {
        fn visit(&mut self, position: u64, opcode: Opcode, operand: i32) {
            self.0.borrow_mut().push((position, opcode, operand));
        }
    }

    struct TwoOpLog(Log<(u64, Opcode, i32, i32)>);
    impl TwoOperandVisitor for TwoOpLog {
        fn visit(&mut self, position: u64, opcode: Opcode, operand1: i32, operand2: i32) {
            self.0.borrow_mut().push((position, opcode, operand1, operand2));
        }
    }

    struct LookupSwitchLog(Log<(u64, i32, Vec<u8>)>);
    impl LookupSwitchVisitor for LookupSwitchLog {
        fn visit(&mut self, position: u64, default_offset: i32, pairs: &[u8]) {
            self.0.borrow_mut().push((position, default_offset, pairs.to_vec()));
        }
    }

    struct TableSwitchLog(Log<(u64, i32, i32, i32, Vec<u8>)>);
    impl TableSwitchVisitor for TableSwitchLog {
        fn visit(&mut self, position: u64, default_offset: i32, low: i32, high: i32, jump_offsets: &[u8]) {
            self.0.borrow_mut().push((position, default_offset, low, high, jump_offsets.to_vec()));
        }
    }

    struct Recorded {
        no_operand: Vec<(u64, Opcode)>,
        one_operand: Vec<(u64, Opcode, i32)>,
        two_operand: Vec<(u64, Opcode, i32, i32)>,
        lookup_switch: Vec<(u64, i32, Vec<u8>)>,
        table_switch: Vec<(u64, i32, i32, i32, Vec<u8>)>,
    }

    fn parse(code: &[u8]) -> Result<Recorded, ByteCodeFormatError> {
        let no_operand_log: Log<(u64, Opcode)> = Rc::new(RefCell::new(Vec::new()));
        let one_operand_log: Log<(u64, Opcode, i32)> = Rc::new(RefCell::new(Vec::new()));
        let two_operand_log: Log<(u64, Opcode, i32, i32)> = Rc::new(RefCell::new(Vec::new()));
        let lookup_switch_log: Log<(u64, i32, Vec<u8>)> = Rc::new(RefCell::new(Vec::new()));
        let table_switch_log: Log<(u64, i32, i32, i32, Vec<u8>)> = Rc::new(RefCell::new(Vec::new()));

        let mut no_operand = NoOpLog(no_operand_log.clone());
        let mut one_operand = OneOpLog(one_operand_log.clone());
        let mut two_operand = TwoOpLog(two_operand_log.clone());
        let mut lookup_switch = LookupSwitchLog(lookup_switch_log.clone());
        let mut table_switch = TableSwitchLog(table_switch_log.clone());

        let mut visitors = Visitors {
            no_operand: &mut no_operand,
            one_operand: &mut one_operand,
            two_operand: &mut two_operand,
            lookup_switch: &mut lookup_switch,
            table_switch: &mut table_switch,
        };
        parse_bytecode(code, &mut visitors)?;

        Ok(Recorded {
            no_operand: no_operand_log.borrow().clone(),
            one_operand: one_operand_log.borrow().clone(),
            two_operand: two_operand_log.borrow().clone(),
            lookup_switch: lookup_switch_log.borrow().clone(),
            table_switch: table_switch_log.borrow().clone(),
        })
    }

    /// `wide iinc` widens both operands to 16 bits and reports the widened
    /// instruction at the `wide` byte's own position.
    #[test]
    fn wide_iinc_scenario() {
        let recorded = parse(&[0xC4, 0x84, 0x00, 0x0A, 0xFF, 0xFF]).unwrap();
        assert_eq!(recorded.two_operand.len(), 1);
        assert_eq!(recorded.two_operand[0], (0, Opcode::Iinc, 10, -1));
    }

    #[test]
    fn invokeinterface_valid_and_invalid_mandatory_zero() {
        let recorded = parse(&[0xB9, 0x00, 0x01, 0x02, 0x00]).unwrap();
        assert_eq!(recorded.two_operand[0], (0, Opcode::Invokeinterface, 1, 2));

        let err = parse(&[0xB9, 0x00, 0x01, 0x02, 0x01]).unwrap_err();
        assert_eq!(err.position, 0);
        assert!(matches!(err.cause, Some(FormatCause::ConstraintViolation { .. })));
    }

    #[test]
    fn lookupswitch_padding_by_offset() {
        for offset in 0u8..4 {
            let mut code = vec![0x00; offset as usize];
            code.push(0xAB); // lookupswitch
            let before_pad_len = code.len();
            let p = 4 - (offset as u64 % 4);
            let pad = (p - 1) as usize;
            code.extend(std::iter::repeat(0u8).take(pad));
            assert_eq!(code.len(), before_pad_len + pad);
            code.extend_from_slice(&0i32.to_be_bytes()); // defaultOffset
            code.extend_from_slice(&0i32.to_be_bytes()); // npairs = 0
            let recorded = parse(&code).unwrap();
            assert_eq!(recorded.lookup_switch.len(), 1);
        }
    }

    #[test]
    fn tableswitch_high_equals_low_is_one_jump() {
        let mut code = vec![0xAA]; // tableswitch at offset 0 -> 3 pad bytes
        code.extend([0, 0, 0]);
        code.extend_from_slice(&8i32.to_be_bytes()); // default
        code.extend_from_slice(&5i32.to_be_bytes()); // low
        code.extend_from_slice(&5i32.to_be_bytes()); // high
        code.extend_from_slice(&100i32.to_be_bytes()); // one jump offset
        let recorded = parse(&code).unwrap();
        assert_eq!(recorded.table_switch.len(), 1);
        assert_eq!(recorded.table_switch[0].4.len(), 4);
    }

    #[test]
    fn tableswitch_parity_scenario() {
        // [TABLESWITCH, 00, 00, 00, default:+8, low:0, high:1, offset[0]:+4, offset[1]:+8] at offset 0.
        let mut code = vec![0xAA]; // tableswitch at offset 0 -> 3 pad bytes
        code.extend([0, 0, 0]);
        code.extend_from_slice(&8i32.to_be_bytes()); // default
        code.extend_from_slice(&0i32.to_be_bytes()); // low
        code.extend_from_slice(&1i32.to_be_bytes()); // high
        code.extend_from_slice(&4i32.to_be_bytes()); // offset[0]
        code.extend_from_slice(&8i32.to_be_bytes()); // offset[1]
        let recorded = parse(&code).unwrap();
        assert_eq!(recorded.table_switch.len(), 1);
        let (position, default_offset, low, high, jump_offsets) = &recorded.table_switch[0];
        assert_eq!(*position, 0);
        assert_eq!(*default_offset, 8);
        assert_eq!(*low, 0);
        assert_eq!(*high, 1);
        assert_eq!(jump_offsets.len(), 8);
    }

    #[test]
    fn tableswitch_high_less_than_low_is_format_error() {
        let mut code = vec![0xAA];
        code.extend([0, 0, 0]);
        code.extend_from_slice(&0i32.to_be_bytes());
        code.extend_from_slice(&5i32.to_be_bytes()); // low
        code.extend_from_slice(&4i32.to_be_bytes()); // high < low
        let err = parse(&code).unwrap_err();
        assert!(matches!(err.cause, Some(FormatCause::ConstraintViolation { .. })));
    }

    #[test]
    fn lookupswitch_negative_npairs_is_format_error() {
        let mut code = vec![0xAB, 0, 0, 0];
        code.extend_from_slice(&0i32.to_be_bytes());
        code.extend_from_slice(&(-1i32).to_be_bytes());
        let err = parse(&code).unwrap_err();
        assert!(matches!(err.cause, Some(FormatCause::ConstraintViolation { .. })));
    }

    #[test]
    fn wide_with_non_widenable_opcode_is_format_error() {
        let err = parse(&[0xC4, 0x00]).unwrap_err(); // wide nop
        assert_eq!(err.position, 0);
    }

    #[test]
    fn reserved_opcodes_are_forwarded_without_error() {
        let recorded = parse(&[0xCA, 0xFE, 0xFF]).unwrap();
        assert_eq!(recorded.no_operand.len(), 3);
    }

    #[test]
    fn unrecognized_opcode_byte_is_format_error() {
        let err = parse(&[0xCB]).unwrap_err();
        assert!(matches!(err.cause, Some(FormatCause::BadDiscriminator { byte: 0xCB })));
    }
}
