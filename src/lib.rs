//! A zero-copy parser for the JVM class file format (JVM Specification,
//! Chapter 4) and its method bytecode, versions 45.3 (Java 1.0.2) through
//! 53.0 (Java 9).
//!
//! [`class_file::parse`] reads a complete `ClassFile`; [`bytecode::parse_bytecode`]
//! walks a `Code` attribute's instruction stream through five visitor
//! callbacks. Neither performs semantic verification (constant-pool
//! consistency, stack/locals simulation, frame merging) — see [`error`] for
//! the structural-error taxonomy both parsers share.

pub mod access_flags;
pub mod annotations;
pub mod attributes;
pub mod bytecode;
pub mod class_file;
pub mod constant_pool;
pub mod error;
pub mod flags_rules;
pub mod module;
pub mod opcode;
pub mod read;
pub mod stack_map;
pub mod version;

pub use class_file::{parse, ClassFile};
pub use error::{ByteCodeFormatError, ClassFormatError, InternalError};
pub use version::ClassFileVersion;
