//! The static JVM opcode table.
//!
//! One data table drives discriminant -> (mnemonic, operand shape) lookups
//! in both directions from a single source of truth, rather than a bare
//! enum plus an un-tabulated match arm per instruction.

/// A single operand's width and signedness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandType {
    SignedByte,
    UnsignedByte,
    AtypeByte,
    LocalVarIndexByte,
    ConstPoolIndexByte,
    SignedShort,
    BranchOffsetShort,
    LocalVarIndexShort,
    ConstPoolIndexShort,
    SignedInt,
    BranchOffsetInt,
}

impl OperandType {
    pub fn width(&self) -> usize {
        use OperandType::*;
        match self {
            SignedByte | UnsignedByte | AtypeByte | LocalVarIndexByte | ConstPoolIndexByte => 1,
            SignedShort | BranchOffsetShort | LocalVarIndexShort | ConstPoolIndexShort => 2,
            SignedInt | BranchOffsetInt => 4,
        }
    }
}

/// How a bytecode parser reads and dispatches one opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    NoOperand,
    OneOperand(OperandType),
    TwoOperand(OperandType, OperandType),
    LookupSwitch,
    TableSwitch,
    Wide,
    InvokeInterface,
    InvokeDynamic,
    MultiANewArray,
}

macro_rules! opcodes {
    ($($byte:literal => $variant:ident, $mnemonic:literal, $shape:expr;)*) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($variant = $byte,)*
        }

        impl Opcode {
            pub fn from_byte(byte: u8) -> Option<Opcode> {
                match byte {
                    $($byte => Some(Opcode::$variant),)*
                    _ => None,
                }
            }

            pub fn byte(&self) -> u8 {
                *self as u8
            }

            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(Opcode::$variant => $mnemonic,)*
                }
            }

            pub fn shape(&self) -> Shape {
                match self {
                    $(Opcode::$variant => $shape,)*
                }
            }
        }
    };
}

use OperandType::*;
use Shape::*;

opcodes! {
    0x00 => Nop, "nop", NoOperand;
    0x01 => AconstNull, "aconst_null", NoOperand;
    0x02 => IconstM1, "iconst_m1", NoOperand;
    0x03 => Iconst0, "iconst_0", NoOperand;
    0x04 => Iconst1, "iconst_1", NoOperand;
    0x05 => Iconst2, "iconst_2", NoOperand;
    0x06 => Iconst3, "iconst_3", NoOperand;
    0x07 => Iconst4, "iconst_4", NoOperand;
    0x08 => Iconst5, "iconst_5", NoOperand;
    0x09 => Lconst0, "lconst_0", NoOperand;
    0x0A => Lconst1, "lconst_1", NoOperand;
    0x0B => Fconst0, "fconst_0", NoOperand;
    0x0C => Fconst1, "fconst_1", NoOperand;
    0x0D => Fconst2, "fconst_2", NoOperand;
    0x0E => Dconst0, "dconst_0", NoOperand;
    0x0F => Dconst1, "dconst_1", NoOperand;
    0x10 => Bipush, "bipush", OneOperand(SignedByte);
    0x11 => Sipush, "sipush", OneOperand(SignedShort);
    0x12 => Ldc, "ldc", OneOperand(ConstPoolIndexByte);
    0x13 => LdcW, "ldc_w", OneOperand(ConstPoolIndexShort);
    0x14 => Ldc2W, "ldc2_w", OneOperand(ConstPoolIndexShort);
    0x15 => Iload, "iload", OneOperand(LocalVarIndexByte);
    0x16 => Lload, "lload", OneOperand(LocalVarIndexByte);
    0x17 => Fload, "fload", OneOperand(LocalVarIndexByte);
    0x18 => Dload, "dload", OneOperand(LocalVarIndexByte);
    0x19 => Aload, "aload", OneOperand(LocalVarIndexByte);
    0x1A => Iload0, "iload_0", NoOperand;
    0x1B => Iload1, "iload_1", NoOperand;
    0x1C => Iload2, "iload_2", NoOperand;
    0x1D => Iload3, "iload_3", NoOperand;
    0x1E => Lload0, "lload_0", NoOperand;
    0x1F => Lload1, "lload_1", NoOperand;
    0x20 => Lload2, "lload_2", NoOperand;
    0x21 => Lload3, "lload_3", NoOperand;
    0x22 => Fload0, "fload_0", NoOperand;
    0x23 => Fload1, "fload_1", NoOperand;
    0x24 => Fload2, "fload_2", NoOperand;
    0x25 => Fload3, "fload_3", NoOperand;
    0x26 => Dload0, "dload_0", NoOperand;
    0x27 => Dload1, "dload_1", NoOperand;
    0x28 => Dload2, "dload_2", NoOperand;
    0x29 => Dload3, "dload_3", NoOperand;
    0x2A => Aload0, "aload_0", NoOperand;
    0x2B => Aload1, "aload_1", NoOperand;
    0x2C => Aload2, "aload_2", NoOperand;
    0x2D => Aload3, "aload_3", NoOperand;
    0x2E => Iaload, "iaload", NoOperand;
    0x2F => Laload, "laload", NoOperand;
    0x30 => Faload, "faload", NoOperand;
    0x31 => Daload, "daload", NoOperand;
    0x32 => Aaload, "aaload", NoOperand;
    0x33 => Baload, "baload", NoOperand;
    0x34 => Caload, "caload", NoOperand;
    0x35 => Saload, "saload", NoOperand;
    0x36 => Istore, "istore", OneOperand(LocalVarIndexByte);
    0x37 => Lstore, "lstore", OneOperand(LocalVarIndexByte);
    0x38 => Fstore, "fstore", OneOperand(LocalVarIndexByte);
    0x39 => Dstore, "dstore", OneOperand(LocalVarIndexByte);
    0x3A => Astore, "astore", OneOperand(LocalVarIndexByte);
    0x3B => Istore0, "istore_0", NoOperand;
    0x3C => Istore1, "istore_1", NoOperand;
    0x3D => Istore2, "istore_2", NoOperand;
    0x3E => Istore3, "istore_3", NoOperand;
    0x3F => Lstore0, "lstore_0", NoOperand;
    0x40 => Lstore1, "lstore_1", NoOperand;
    0x41 => Lstore2, "lstore_2", NoOperand;
    0x42 => Lstore3, "lstore_3", NoOperand;
    0x43 => Fstore0, "fstore_0", NoOperand;
    0x44 => Fstore1, "fstore_1", NoOperand;
    0x45 => Fstore2, "fstore_2", NoOperand;
    0x46 => Fstore3, "fstore_3", NoOperand;
    0x47 => Dstore0, "dstore_0", NoOperand;
    0x48 => Dstore1, "dstore_1", NoOperand;
    0x49 => Dstore2, "dstore_2", NoOperand;
    0x4A => Dstore3, "dstore_3", NoOperand;
    0x4B => Astore0, "astore_0", NoOperand;
    0x4C => Astore1, "astore_1", NoOperand;
    0x4D => Astore2, "astore_2", NoOperand;
    0x4E => Astore3, "astore_3", NoOperand;
    0x4F => Iastore, "iastore", NoOperand;
    0x50 => Lastore, "lastore", NoOperand;
    0x51 => Fastore, "fastore", NoOperand;
    0x52 => Dastore, "dastore", NoOperand;
    0x53 => Aastore, "aastore", NoOperand;
    0x54 => Bastore, "bastore", NoOperand;
    0x55 => Castore, "castore", NoOperand;
    0x56 => Sastore, "sastore", NoOperand;
    0x57 => Pop, "pop", NoOperand;
    0x58 => Pop2, "pop2", NoOperand;
    0x59 => Dup, "dup", NoOperand;
    0x5A => DupX1, "dup_x1", NoOperand;
    0x5B => DupX2, "dup_x2", NoOperand;
    0x5C => Dup2, "dup2", NoOperand;
    0x5D => Dup2X1, "dup2_x1", NoOperand;
    0x5E => Dup2X2, "dup2_x2", NoOperand;
    0x5F => Swap, "swap", NoOperand;
    0x60 => Iadd, "iadd", NoOperand;
    0x61 => Ladd, "ladd", NoOperand;
    0x62 => Fadd, "fadd", NoOperand;
    0x63 => Dadd, "dadd", NoOperand;
    0x64 => Isub, "isub", NoOperand;
    0x65 => Lsub, "lsub", NoOperand;
    0x66 => Fsub, "fsub", NoOperand;
    0x67 => Dsub, "dsub", NoOperand;
    0x68 => Imul, "imul", NoOperand;
    0x69 => Lmul, "lmul", NoOperand;
    0x6A => Fmul, "fmul", NoOperand;
    0x6B => Dmul, "dmul", NoOperand;
    0x6C => Idiv, "idiv", NoOperand;
    0x6D => Ldiv, "ldiv", NoOperand;
    0x6E => Fdiv, "fdiv", NoOperand;
    0x6F => Ddiv, "ddiv", NoOperand;
    0x70 => Irem, "irem", NoOperand;
    0x71 => Lrem, "lrem", NoOperand;
    0x72 => Frem, "frem", NoOperand;
    0x73 => Drem, "drem", NoOperand;
    0x74 => Ineg, "ineg", NoOperand;
    0x75 => Lneg, "lneg", NoOperand;
    0x76 => Fneg, "fneg", NoOperand;
    0x77 => Dneg, "dneg", NoOperand;
    0x78 => Ishl, "ishl", NoOperand;
    0x79 => Lshl, "lshl", NoOperand;
    0x7A => Ishr, "ishr", NoOperand;
    0x7B => Lshr, "lshr", NoOperand;
    0x7C => Iushr, "iushr", NoOperand;
    0x7D => Lushr, "lushr", NoOperand;
    0x7E => Iand, "iand", NoOperand;
    0x7F => Land, "land", NoOperand;
    0x80 => Ior, "ior", NoOperand;
    0x81 => Lor, "lor", NoOperand;
    0x82 => Ixor, "ixor", NoOperand;
    0x83 => Lxor, "lxor", NoOperand;
    0x84 => Iinc, "iinc", TwoOperand(LocalVarIndexByte, SignedByte);
    0x85 => I2l, "i2l", NoOperand;
    0x86 => I2f, "i2f", NoOperand;
    0x87 => I2d, "i2d", NoOperand;
    0x88 => L2i, "l2i", NoOperand;
    0x89 => L2f, "l2f", NoOperand;
    0x8A => L2d, "l2d", NoOperand;
    0x8B => F2i, "f2i", NoOperand;
    0x8C => F2l, "f2l", NoOperand;
    0x8D => F2d, "f2d", NoOperand;
    0x8E => D2i, "d2i", NoOperand;
    0x8F => D2l, "d2l", NoOperand;
    0x90 => D2f, "d2f", NoOperand;
    0x91 => I2b, "i2b", NoOperand;
    0x92 => I2c, "i2c", NoOperand;
    0x93 => I2s, "i2s", NoOperand;
    0x94 => Lcmp, "lcmp", NoOperand;
    0x95 => Fcmpl, "fcmpl", NoOperand;
    0x96 => Fcmpg, "fcmpg", NoOperand;
    0x97 => Dcmpl, "dcmpl", NoOperand;
    0x98 => Dcmpg, "dcmpg", NoOperand;
    0x99 => Ifeq, "ifeq", OneOperand(BranchOffsetShort);
    0x9A => Ifne, "ifne", OneOperand(BranchOffsetShort);
    0x9B => Iflt, "iflt", OneOperand(BranchOffsetShort);
    0x9C => Ifge, "ifge", OneOperand(BranchOffsetShort);
    0x9D => Ifgt, "ifgt", OneOperand(BranchOffsetShort);
    0x9E => Ifle, "ifle", OneOperand(BranchOffsetShort);
    0x9F => IfIcmpeq, "if_icmpeq", OneOperand(BranchOffsetShort);
    0xA0 => IfIcmpne, "if_icmpne", OneOperand(BranchOffsetShort);
    0xA1 => IfIcmplt, "if_icmplt", OneOperand(BranchOffsetShort);
    0xA2 => IfIcmpge, "if_icmpge", OneOperand(BranchOffsetShort);
    0xA3 => IfIcmpgt, "if_icmpgt", OneOperand(BranchOffsetShort);
    0xA4 => IfIcmple, "if_icmple", OneOperand(BranchOffsetShort);
    0xA5 => IfAcmpeq, "if_acmpeq", OneOperand(BranchOffsetShort);
    0xA6 => IfAcmpne, "if_acmpne", OneOperand(BranchOffsetShort);
    0xA7 => Goto, "goto", OneOperand(BranchOffsetShort);
    0xA8 => Jsr, "jsr", OneOperand(BranchOffsetShort);
    0xA9 => Ret, "ret", OneOperand(LocalVarIndexByte);
    0xAA => Tableswitch, "tableswitch", TableSwitch;
    0xAB => Lookupswitch, "lookupswitch", LookupSwitch;
    0xAC => Ireturn, "ireturn", NoOperand;
    0xAD => Lreturn, "lreturn", NoOperand;
    0xAE => Freturn, "freturn", NoOperand;
    0xAF => Dreturn, "dreturn", NoOperand;
    0xB0 => Areturn, "areturn", NoOperand;
    0xB1 => Return, "return", NoOperand;
    0xB2 => Getstatic, "getstatic", OneOperand(ConstPoolIndexShort);
    0xB3 => Putstatic, "putstatic", OneOperand(ConstPoolIndexShort);
    0xB4 => Getfield, "getfield", OneOperand(ConstPoolIndexShort);
    0xB5 => Putfield, "putfield", OneOperand(ConstPoolIndexShort);
    0xB6 => Invokevirtual, "invokevirtual", OneOperand(ConstPoolIndexShort);
    0xB7 => Invokespecial, "invokespecial", OneOperand(ConstPoolIndexShort);
    0xB8 => Invokestatic, "invokestatic", OneOperand(ConstPoolIndexShort);
    0xB9 => Invokeinterface, "invokeinterface", InvokeInterface;
    0xBA => Invokedynamic, "invokedynamic", InvokeDynamic;
    0xBB => New, "new", OneOperand(ConstPoolIndexShort);
    0xBC => Newarray, "newarray", OneOperand(AtypeByte);
    0xBD => Anewarray, "anewarray", OneOperand(ConstPoolIndexShort);
    0xBE => Arraylength, "arraylength", NoOperand;
    0xBF => Athrow, "athrow", NoOperand;
    0xC0 => Checkcast, "checkcast", OneOperand(ConstPoolIndexShort);
    0xC1 => Instanceof, "instanceof", OneOperand(ConstPoolIndexShort);
    0xC2 => Monitorenter, "monitorenter", NoOperand;
    0xC3 => Monitorexit, "monitorexit", NoOperand;
    0xC4 => Wide, "wide", Wide;
    0xC5 => Multianewarray, "multianewarray", MultiANewArray;
    0xC6 => Ifnull, "ifnull", OneOperand(BranchOffsetShort);
    0xC7 => Ifnonnull, "ifnonnull", OneOperand(BranchOffsetShort);
    0xC8 => GotoW, "goto_w", OneOperand(BranchOffsetInt);
    0xC9 => JsrW, "jsr_w", OneOperand(BranchOffsetInt);
    0xCA => Breakpoint, "breakpoint", NoOperand;
    0xFE => Impdep1, "impdep1", NoOperand;
    0xFF => Impdep2, "impdep2", NoOperand;
}

/// Opcodes that `wide` may legally prefix.
pub fn is_widenable(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::Iload
            | Opcode::Fload
            | Opcode::Aload
            | Opcode::Lload
            | Opcode::Dload
            | Opcode::Istore
            | Opcode::Fstore
            | Opcode::Astore
            | Opcode::Lstore
            | Opcode::Dstore
            | Opcode::Ret
            | Opcode::Iinc
    )
}

/// The widened operand shape for a `wide`-prefixed opcode.
pub fn widened_shape(opcode: Opcode) -> Option<Shape> {
    if !is_widenable(opcode) {
        return None;
    }
    Some(if opcode == Opcode::Iinc {
        TwoOperand(LocalVarIndexShort, SignedShort)
    } else {
        OneOperand(LocalVarIndexShort)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trips_through_from_byte() {
        for byte in 0u16..=255 {
            if let Some(opcode) = Opcode::from_byte(byte as u8) {
                assert_eq!(opcode.byte(), byte as u8);
            }
        }
    }

    #[test]
    fn reserved_opcodes_are_defined_but_no_operand() {
        assert_eq!(Opcode::from_byte(0xCA).unwrap().shape(), NoOperand);
        assert_eq!(Opcode::from_byte(0xFE).unwrap().shape(), NoOperand);
        assert_eq!(Opcode::from_byte(0xFF).unwrap().shape(), NoOperand);
    }

    #[test]
    fn undefined_byte_is_none() {
        assert!(Opcode::from_byte(0xCB).is_none());
        assert!(Opcode::from_byte(0xCD).is_none());
    }

    #[test]
    fn iinc_wide_form_reads_two_shorts() {
        let shape = widened_shape(Opcode::Iinc).unwrap();
        assert_eq!(shape, TwoOperand(LocalVarIndexShort, SignedShort));
    }

    #[test]
    fn non_widenable_opcode_has_no_widened_shape() {
        assert!(widened_shape(Opcode::Nop).is_none());
    }
}
