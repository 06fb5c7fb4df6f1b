//! Error types shared by the class-file and bytecode parsers.
//!
//! Every input-format error carries the byte position at which parsing
//! failed; class-file errors additionally carry a snapshot of the
//! [`ContextStack`] so a caller can tell *what* the parser was reading, not
//! just *where*.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// What kind of structural violation was found: this is a classification,
/// not a type hierarchy, so callers can match on it without downcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCause {
    /// The first four bytes were not `0xCAFEBABE`.
    MagicMismatch { found: u32 },
    /// The input ended while a required read was in progress.
    Truncated { needed: usize, available: usize },
    /// A tag/opcode/frame-type byte was outside the defined set.
    BadDiscriminator { byte: u8 },
    /// A structural invariant was violated (lookupswitch npairs < 0,
    /// tableswitch high < low, attribute length mismatch, non-zero
    /// mandatory-zero byte, two-slot entry overflowing the pool, ...).
    ConstraintViolation { message: String },
    /// A constant-pool index was out of range, pointed at a dead slot, or
    /// pointed at the wrong structure for the context.
    InvalidConstantPoolIndex { index: u16, reason: String },
    /// An access-flag combination violated the version-scoped rule set.
    BadFlagCombination { message: String },
}

impl Display for FormatCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FormatCause::MagicMismatch { found } => {
                write!(f, "expected magic 0xCAFEBABE, found {found:#010X}")
            }
            FormatCause::Truncated { needed, available } => write!(
                f,
                "unexpected end of input: needed {needed} byte(s), {available} available"
            ),
            FormatCause::BadDiscriminator { byte } => {
                write!(f, "unrecognized discriminator byte {byte:#04X}")
            }
            FormatCause::ConstraintViolation { message } => write!(f, "{message}"),
            FormatCause::InvalidConstantPoolIndex { index, reason } => {
                write!(f, "invalid constant pool index {index}: {reason}")
            }
            FormatCause::BadFlagCombination { message } => write!(f, "{message}"),
        }
    }
}

/// A single frame of [`ContextStack`]: what logical structure the parser was
/// reading when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFrame(pub String);

impl Display for ContextFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks what the class-file parser is currently reading, so a format error
/// can be annotated with a human-readable trail (e.g. "entry #3 of constant
/// pool" -> "attribute of kind Code" -> "frame type APPEND").
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<ContextFrame>,
}

impl ContextStack {
    pub fn new() -> Self {
        ContextStack { frames: Vec::new() }
    }

    pub fn push(&mut self, description: impl Into<String>) {
        self.frames.push(ContextFrame(description.into()));
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn snapshot(&self) -> Vec<ContextFrame> {
        self.frames.clone()
    }

    /// Runs `body` with `description` pushed on the stack, popping it
    /// afterward regardless of whether `body` succeeded. This is the
    /// primary way parsing code annotates context.
    pub fn scoped<T>(
        &mut self,
        description: impl Into<String>,
        body: impl FnOnce(&mut Self) -> Result<T, ClassFormatError>,
    ) -> Result<T, ClassFormatError> {
        self.push(description);
        let result = body(self);
        self.pop();
        result
    }
}

/// An error encountered while parsing a class file: a byte position, a
/// cause, and the context-stack trail that led there.
#[derive(Debug, Clone)]
pub struct ClassFormatError {
    pub position: u64,
    pub cause: FormatCause,
    pub context: Vec<ContextFrame>,
}

impl ClassFormatError {
    pub fn new(position: u64, cause: FormatCause, context: &ContextStack) -> Self {
        ClassFormatError {
            position,
            cause,
            context: context.snapshot(),
        }
    }
}

impl Display for ClassFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "class format error at byte {}: {}", self.position, self.cause)?;
        if !self.context.is_empty() {
            write!(f, " (while reading ")?;
            for (i, frame) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, " > ")?;
                }
                write!(f, "{frame}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl Error for ClassFormatError {}

/// An error encountered while parsing a bytecode block. Carries only the
/// position of the failing instruction's opcode byte: the bytecode parser
/// has no context stack, it is a flat visitor loop.
#[derive(Debug, Clone)]
pub struct ByteCodeFormatError {
    pub position: u64,
    pub message: String,
    pub cause: Option<FormatCause>,
}

impl ByteCodeFormatError {
    pub fn new(position: u64, message: impl Into<String>) -> Self {
        ByteCodeFormatError {
            position,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(position: u64, message: impl Into<String>, cause: FormatCause) -> Self {
        ByteCodeFormatError {
            position,
            message: message.into(),
            cause: Some(cause),
        }
    }
}

impl Display for ByteCodeFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "bytecode format error at offset {}: {}", self.position, self.message)
    }
}

impl Error for ByteCodeFormatError {}

/// Signals a programmer bug (unreachable default case, unhandled
/// enumerator) rather than malformed input. Kept distinct from
/// [`ClassFormatError`]/[`ByteCodeFormatError`] so callers can tell bugs in
/// this crate apart from bugs in their input.
#[derive(Debug, Clone)]
pub struct InternalError {
    pub message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        InternalError {
            message: message.into(),
        }
    }

    pub fn unreachable(what: impl Into<String>) -> Self {
        InternalError {
            message: format!("unreachable state: {}", what.into()),
        }
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "internal error: {}", self.message)
    }
}

impl Error for InternalError {}
