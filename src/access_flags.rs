//! Access-flag bitsets for classes, fields, methods, inner-class references,
//! and module directives.
//!
//! Built on `bitflags` rather than a hand-rolled `from_u16() -> Vec<Self>`
//! scan: the flag-rule engine (`flags_rules.rs`) needs real set operations
//! (intersection, "is subset of"), which a `Vec<Flag>` can't express without
//! re-deriving `PartialEq` comparisons by hand.

use bitflags::bitflags;

bitflags! {
    /// `access_flags` on a `ClassFile` (JVM spec table 4.1-A).
    pub struct ClassAccessFlags: u16 {
        const PUBLIC     = 0x0001;
        const FINAL      = 0x0010;
        const SUPER      = 0x0020;
        const INTERFACE  = 0x0200;
        const ABSTRACT   = 0x0400;
        const SYNTHETIC  = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM       = 0x4000;
        const MODULE     = 0x8000;
    }
}

bitflags! {
    /// `access_flags` on a `field_info` (JVM spec table 4.5-A).
    pub struct FieldAccessFlags: u16 {
        const PUBLIC    = 0x0001;
        const PRIVATE   = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC    = 0x0008;
        const FINAL     = 0x0010;
        const VOLATILE  = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM      = 0x4000;
    }
}

bitflags! {
    /// `access_flags` on a `method_info` (JVM spec table 4.6-A).
    pub struct MethodAccessFlags: u16 {
        const PUBLIC       = 0x0001;
        const PRIVATE      = 0x0002;
        const PROTECTED    = 0x0004;
        const STATIC       = 0x0008;
        const FINAL        = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE       = 0x0040;
        const VARARGS      = 0x0080;
        const NATIVE       = 0x0100;
        const ABSTRACT     = 0x0400;
        const STRICT       = 0x0800;
        const SYNTHETIC    = 0x1000;
    }
}

bitflags! {
    /// `inner_class_access_flags` of an `InnerClasses` entry (JVM spec
    /// table 4.7.6-A) — a superset of [`ClassAccessFlags`] since an inner
    /// class, unlike a top-level one, may also be declared PRIVATE,
    /// PROTECTED, or STATIC.
    pub struct InnerClassAccessFlags: u16 {
        const PUBLIC     = 0x0001;
        const PRIVATE    = 0x0002;
        const PROTECTED  = 0x0004;
        const STATIC     = 0x0008;
        const FINAL      = 0x0010;
        const INTERFACE  = 0x0200;
        const ABSTRACT   = 0x0400;
        const SYNTHETIC  = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM       = 0x4000;
    }
}

bitflags! {
    /// `access_flags` of a `MethodParameters` attribute entry (JVM spec
    /// §4.7.24).
    pub struct ParameterAccessFlags: u16 {
        const FINAL     = 0x0010;
        const SYNTHETIC = 0x1000;
        const MANDATED  = 0x8000;
    }
}

bitflags! {
    /// `module_flags` of a `Module` attribute (JVM spec §4.7.25).
    pub struct ModuleFlags: u16 {
        const OPEN      = 0x0020;
        const SYNTHETIC = 0x1000;
        const MANDATED  = 0x8000;
    }
}

bitflags! {
    /// `requires_flags` of a `Module` attribute's `requires` entry.
    pub struct ModuleRequiresFlags: u16 {
        const TRANSITIVE    = 0x0020;
        const STATIC_PHASE  = 0x0040;
        const SYNTHETIC     = 0x1000;
        const MANDATED      = 0x8000;
    }
}

bitflags! {
    /// `exports_flags`/`opens_flags` of a `Module` attribute's `exports` or
    /// `opens` entry — both share this bit layout.
    pub struct ModulePackageFlags: u16 {
        const SYNTHETIC = 0x1000;
        const MANDATED  = 0x8000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_bits_are_dropped_not_rejected() {
        // truncate() discards bits with no corresponding flag, matching
        // "valid-by-construction" flag sets used in flags_rules tests.
        let flags = ClassAccessFlags::from_bits_truncate(0x0001 | 0x8000);
        assert!(flags.contains(ClassAccessFlags::PUBLIC));
        assert!(flags.contains(ClassAccessFlags::MODULE));
    }

    #[test]
    fn method_abstract_and_final_are_distinct_bits() {
        let flags = MethodAccessFlags::ABSTRACT | MethodAccessFlags::FINAL;
        assert!(flags.contains(MethodAccessFlags::ABSTRACT));
        assert!(flags.contains(MethodAccessFlags::FINAL));
        assert_ne!(MethodAccessFlags::ABSTRACT, MethodAccessFlags::FINAL);
    }
}
