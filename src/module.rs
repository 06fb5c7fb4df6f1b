//! `Module` attribute sub-lists: requires, exports, opens, uses, provides.
//!
//! Each sub-list is a plain struct read by a free function rather than a
//! method on a `Code`-style owning type.

use crate::access_flags::{ModuleFlags, ModulePackageFlags, ModuleRequiresFlags};
use crate::constant_pool::ConstantPool;
use crate::error::{ClassFormatError, ContextStack};
use crate::read::Reader;

#[derive(Clone, Debug)]
pub struct Requires {
    pub requires_index: u16,
    pub requires_flags: ModuleRequiresFlags,
    /// 0 means "no version recorded".
    pub requires_version_index: u16,
}

impl Requires {
    /// The recorded module version string, or `None` if `requires_version_index` is 0.
    pub fn version<'a>(&self, pool: &'a ConstantPool, ctx: &ContextStack) -> Result<Option<&'a str>, ClassFormatError> {
        pool.utf8_or_absent(self.requires_version_index, ctx)
    }
}

#[derive(Clone, Debug)]
pub struct Exports {
    pub exports_index: u16,
    pub exports_flags: ModulePackageFlags,
    pub exports_to_indices: Vec<u16>,
}

#[derive(Clone, Debug)]
pub struct Opens {
    pub opens_index: u16,
    pub opens_flags: ModulePackageFlags,
    pub opens_to_indices: Vec<u16>,
}

#[derive(Clone, Debug)]
pub struct Provides {
    pub provides_index: u16,
    pub provides_with_indices: Vec<u16>,
}

#[derive(Clone, Debug)]
pub struct Module {
    pub module_name_index: u16,
    pub module_flags: ModuleFlags,
    /// 0 means "no version recorded".
    pub module_version_index: u16,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Opens>,
    pub uses_indices: Vec<u16>,
    pub provides: Vec<Provides>,
}

impl Module {
    /// The module's own version string, or `None` if `module_version_index` is 0.
    pub fn version<'a>(&self, pool: &'a ConstantPool, ctx: &ContextStack) -> Result<Option<&'a str>, ClassFormatError> {
        pool.utf8_or_absent(self.module_version_index, ctx)
    }
}

fn read_u16_list(reader: &mut Reader<'_>, ctx: &ContextStack) -> Result<Vec<u16>, ClassFormatError> {
    let count = reader.u16(ctx)?;
    let mut indices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        indices.push(reader.u16(ctx)?);
    }
    Ok(indices)
}

pub fn read_module(reader: &mut Reader<'_>, ctx: &mut ContextStack) -> Result<Module, ClassFormatError> {
    let module_name_index = reader.u16(ctx)?;
    let module_flags = ModuleFlags::from_bits_truncate(reader.u16(ctx)?);
    let module_version_index = reader.u16(ctx)?;

    let requires_count = reader.u16(ctx)?;
    let mut requires = Vec::with_capacity(requires_count as usize);
    for _ in 0..requires_count {
        requires.push(Requires {
            requires_index: reader.u16(ctx)?,
            requires_flags: ModuleRequiresFlags::from_bits_truncate(reader.u16(ctx)?),
            requires_version_index: reader.u16(ctx)?,
        });
    }

    let exports_count = reader.u16(ctx)?;
    let mut exports = Vec::with_capacity(exports_count as usize);
    for _ in 0..exports_count {
        let exports_index = reader.u16(ctx)?;
        let exports_flags = ModulePackageFlags::from_bits_truncate(reader.u16(ctx)?);
        let exports_to_indices = read_u16_list(reader, ctx)?;
        exports.push(Exports { exports_index, exports_flags, exports_to_indices });
    }

    let opens_count = reader.u16(ctx)?;
    let mut opens = Vec::with_capacity(opens_count as usize);
    for _ in 0..opens_count {
        let opens_index = reader.u16(ctx)?;
        let opens_flags = ModulePackageFlags::from_bits_truncate(reader.u16(ctx)?);
        let opens_to_indices = read_u16_list(reader, ctx)?;
        opens.push(Opens { opens_index, opens_flags, opens_to_indices });
    }

    let uses_indices = read_u16_list(reader, ctx)?;

    let provides_count = reader.u16(ctx)?;
    let mut provides = Vec::with_capacity(provides_count as usize);
    for _ in 0..provides_count {
        let provides_index = reader.u16(ctx)?;
        let provides_with_indices = read_u16_list(reader, ctx)?;
        provides.push(Provides { provides_index, provides_with_indices });
    }

    Ok(Module {
        module_name_index,
        module_flags,
        module_version_index,
        requires,
        exports,
        opens,
        uses_indices,
        provides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_reads_zero_counts() {
        // name=1, flags=0, version=0, then five zero counts
        let bytes = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // header
            0x00, 0x00, // requires_count
            0x00, 0x00, // exports_count
            0x00, 0x00, // opens_count
            0x00, 0x00, // uses_count
            0x00, 0x00, // provides_count
        ];
        let mut reader = Reader::new(&bytes);
        let mut ctx = ContextStack::new();
        let module = read_module(&mut reader, &mut ctx).unwrap();
        assert_eq!(module.module_name_index, 1);
        assert!(module.requires.is_empty());
        assert!(module.provides.is_empty());
    }

    #[test]
    fn version_index_zero_is_absent() {
        let mut ctx = ContextStack::new();
        let module = Module {
            module_name_index: 1,
            module_flags: ModuleFlags::empty(),
            module_version_index: 0,
            requires: vec![Requires {
                requires_index: 1,
                requires_flags: ModuleRequiresFlags::empty(),
                requires_version_index: 0,
            }],
            exports: vec![],
            opens: vec![],
            uses_indices: vec![],
            provides: vec![],
        };

        let mut pool_bytes = vec![1u8]; // UTF8 tag
        pool_bytes.extend_from_slice(&1u16.to_be_bytes());
        pool_bytes.push(b'm');
        let mut pool_reader = Reader::new(&pool_bytes);
        let pool = crate::constant_pool::read_constant_pool(&mut pool_reader, 2, &mut ctx).unwrap();

        assert_eq!(module.version(&pool, &ctx).unwrap(), None);
        assert_eq!(module.requires[0].version(&pool, &ctx).unwrap(), None);
    }

    #[test]
    fn version_index_nonzero_resolves_utf8() {
        let mut ctx = ContextStack::new();
        let module = Module {
            module_name_index: 1,
            module_flags: ModuleFlags::empty(),
            module_version_index: 1,
            requires: vec![Requires {
                requires_index: 1,
                requires_flags: ModuleRequiresFlags::empty(),
                requires_version_index: 1,
            }],
            exports: vec![],
            opens: vec![],
            uses_indices: vec![],
            provides: vec![],
        };

        let mut pool_bytes = vec![1u8]; // UTF8 tag
        pool_bytes.extend_from_slice(&3u16.to_be_bytes());
        pool_bytes.extend_from_slice(b"9.0");
        let mut pool_reader = Reader::new(&pool_bytes);
        let pool = crate::constant_pool::read_constant_pool(&mut pool_reader, 2, &mut ctx).unwrap();

        assert_eq!(module.version(&pool, &ctx).unwrap(), Some("9.0"));
        assert_eq!(module.requires[0].version(&pool, &ctx).unwrap(), Some("9.0"));
    }
}
