//! Versioned access-flag combination rules.
//!
//! Each rule family is a list of small predicates, each tagged with a
//! message, scoped by version the same way [`crate::version::Versioned`]
//! already scopes constant-pool tags and attribute kinds.

use crate::access_flags::{
    ClassAccessFlags, FieldAccessFlags, InnerClassAccessFlags, MethodAccessFlags,
};
use crate::version::{ClassFileVersion, Versioned};

/// A flag bitset that supports the set operations the rule primitives need.
/// Implemented by forwarding to the inherent methods `bitflags!` already
/// generates, so adding a new flag-bearing structure costs one macro
/// invocation, not a hand-written impl.
pub trait FlagSet: Copy {
    fn empty() -> Self;
    fn contains(&self, other: Self) -> bool;
    fn union(self, other: Self) -> Self;
    fn difference(self, other: Self) -> Self;
    fn is_empty(&self) -> bool;
}

macro_rules! impl_flag_set {
    ($ty:ty) => {
        impl FlagSet for $ty {
            fn empty() -> Self {
                <$ty>::empty()
            }
            fn contains(&self, other: Self) -> bool {
                <$ty>::contains(self, other)
            }
            fn union(self, other: Self) -> Self {
                <$ty>::union(self, other)
            }
            fn difference(self, other: Self) -> Self {
                <$ty>::difference(self, other)
            }
            fn is_empty(&self) -> bool {
                <$ty>::is_empty(self)
            }
        }
    };
}

impl_flag_set!(ClassAccessFlags);
impl_flag_set!(FieldAccessFlags);
impl_flag_set!(MethodAccessFlags);
impl_flag_set!(InnerClassAccessFlags);

/// One rule primitive, each carrying the static message it fails with.
pub enum Rule<F: FlagSet + 'static> {
    /// At most one of {public, private, protected} may be set.
    Visibility { public: F, private: F, protected: F },
    /// Every listed flag must be present.
    AllOf { flags: &'static [F], message: &'static str },
    /// Both flags are required.
    BothOf { first: F, second: F, message: &'static str },
    /// Exactly one of the two flags must be present.
    ExactlyOneOf { first: F, second: F, message: &'static str },
    /// None of the listed flags may be present.
    NoneOf { flags: &'static [F], message: &'static str },
    /// The two flags must not both be present.
    NotBothOf { first: F, second: F, message: &'static str },
    /// Only flags from the listed set are permitted.
    NoOthersThan { flags: &'static [F], message: &'static str },
    /// If `first` is present, `second` must also be present.
    IfFirstThenAlsoSecond { first: F, second: F, message: &'static str },
    /// If `first` is present, none of `rest` may be.
    IfFirstThenNoneOfTheRest { first: F, rest: &'static [F], message: &'static str },
}

impl<F: FlagSet + 'static> Rule<F> {
    fn check(&self, flags: F) -> Result<(), &'static str> {
        match self {
            Rule::Visibility { public, private, protected } => {
                let set = [*public, *private, *protected]
                    .iter()
                    .filter(|f| flags.contains(**f))
                    .count();
                if set <= 1 {
                    Ok(())
                } else {
                    Err("at most one of PUBLIC, PRIVATE, or PROTECTED may be set")
                }
            }
            Rule::AllOf { flags: required, message } => {
                if required.iter().all(|f| flags.contains(*f)) {
                    Ok(())
                } else {
                    Err(message)
                }
            }
            Rule::BothOf { first, second, message } => {
                if flags.contains(*first) && flags.contains(*second) {
                    Ok(())
                } else {
                    Err(message)
                }
            }
            Rule::ExactlyOneOf { first, second, message } => {
                if flags.contains(*first) != flags.contains(*second) {
                    Ok(())
                } else {
                    Err(message)
                }
            }
            Rule::NoneOf { flags: forbidden, message } => {
                if forbidden.iter().any(|f| flags.contains(*f)) {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            Rule::NotBothOf { first, second, message } => {
                if flags.contains(*first) && flags.contains(*second) {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            Rule::NoOthersThan { flags: allowed, message } => {
                let allowed_mask = allowed.iter().fold(F::empty(), |acc, f| acc.union(*f));
                if flags.difference(allowed_mask).is_empty() {
                    Ok(())
                } else {
                    Err(message)
                }
            }
            Rule::IfFirstThenAlsoSecond { first, second, message } => {
                if flags.contains(*first) && !flags.contains(*second) {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            Rule::IfFirstThenNoneOfTheRest { first, rest, message } => {
                if flags.contains(*first) && rest.iter().any(|f| flags.contains(*f)) {
                    Err(message)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A version-scoped group of rules; several collections in a family may
/// apply cumulatively to one class file (e.g. a base collection plus a
/// Java-5-and-later addendum).
pub struct RuleCollection<F: FlagSet + 'static> {
    pub first_version: ClassFileVersion,
    pub last_version: Option<ClassFileVersion>,
    pub rules: &'static [Rule<F>],
}

impl<F: FlagSet + 'static> Versioned for RuleCollection<F> {
    fn first_version_supporting(&self) -> ClassFileVersion {
        self.first_version
    }

    fn last_version_supporting(&self) -> Option<ClassFileVersion> {
        self.last_version
    }
}

/// Runs every rule in every collection of `family` whose version range
/// contains `version`, returning the first violated rule's message.
pub fn validate<F: FlagSet + 'static>(
    family: &'static [RuleCollection<F>],
    version: ClassFileVersion,
    flags: F,
) -> Result<(), &'static str> {
    for collection in family {
        if collection.supports(version) {
            for rule in collection.rules {
                rule.check(flags)?;
            }
        }
    }
    Ok(())
}

use ClassAccessFlags as Class;

const CLASS_NON_MODULE_FLAGS: &[Class] = &[
    Class::PUBLIC,
    Class::FINAL,
    Class::SUPER,
    Class::INTERFACE,
    Class::ABSTRACT,
    Class::SYNTHETIC,
    Class::ANNOTATION,
    Class::ENUM,
];

/// Class access-flag rules.
pub static CLASS_RULES: &[RuleCollection<ClassAccessFlags>] = &[
    RuleCollection {
        first_version: ClassFileVersion::JAVA1_0_2,
        last_version: None,
        rules: &[
            Rule::NotBothOf {
                first: Class::FINAL,
                second: Class::ABSTRACT,
                message: "FINAL and ABSTRACT must not both be set",
            },
            Rule::IfFirstThenNoneOfTheRest {
                first: Class::INTERFACE,
                rest: &[Class::FINAL, Class::SUPER],
                message: "If INTERFACE is present, neither FINAL nor SUPER is permitted",
            },
            Rule::NotBothOf {
                first: Class::INTERFACE,
                second: Class::ENUM,
                message: "INTERFACE and ENUM must not both be set",
            },
        ],
    },
    RuleCollection {
        first_version: ClassFileVersion::JAVA5,
        last_version: None,
        rules: &[Rule::IfFirstThenAlsoSecond {
            first: Class::ANNOTATION,
            second: Class::INTERFACE,
            message: "If ANNOTATION is present, INTERFACE must also be present",
        }],
    },
    RuleCollection {
        first_version: ClassFileVersion::JAVA6,
        last_version: None,
        rules: &[Rule::IfFirstThenAlsoSecond {
            first: Class::INTERFACE,
            second: Class::ABSTRACT,
            message: "If INTERFACE is present, ABSTRACT must also be present",
        }],
    },
    RuleCollection {
        first_version: ClassFileVersion::JAVA9,
        last_version: None,
        rules: &[Rule::IfFirstThenNoneOfTheRest {
            first: Class::MODULE,
            rest: CLASS_NON_MODULE_FLAGS,
            message: "If MODULE is present, no other flag may be set",
        }],
    },
];

use FieldAccessFlags as Field;

/// Field access-flag rules in class context.
pub static FIELD_CLASS_CONTEXT_RULES: &[RuleCollection<FieldAccessFlags>] = &[RuleCollection {
    first_version: ClassFileVersion::JAVA1_0_2,
    last_version: None,
    rules: &[
        Rule::Visibility {
            public: Field::PUBLIC,
            private: Field::PRIVATE,
            protected: Field::PROTECTED,
        },
        Rule::NotBothOf {
            first: Field::FINAL,
            second: Field::VOLATILE,
            message: "FINAL and VOLATILE must not both be set",
        },
    ],
}];

/// Field access-flag rules in interface context.
pub static FIELD_INTERFACE_CONTEXT_RULES: &[RuleCollection<FieldAccessFlags>] = &[RuleCollection {
    first_version: ClassFileVersion::JAVA1_0_2,
    last_version: None,
    rules: &[
        Rule::AllOf {
            flags: &[Field::PUBLIC, Field::STATIC, Field::FINAL],
            message: "PUBLIC, STATIC, and FINAL are all required on an interface field",
        },
        Rule::NoneOf {
            flags: &[Field::PRIVATE, Field::PROTECTED, Field::VOLATILE, Field::TRANSIENT, Field::ENUM],
            message: "none of PRIVATE, PROTECTED, VOLATILE, TRANSIENT, or ENUM is permitted on an interface field",
        },
    ],
}];

use MethodAccessFlags as Method;

/// Method access-flag rules in class context.
pub static METHOD_CLASS_CONTEXT_RULES: &[RuleCollection<MethodAccessFlags>] = &[RuleCollection {
    first_version: ClassFileVersion::JAVA1_0_2,
    last_version: None,
    rules: &[
        Rule::Visibility {
            public: Method::PUBLIC,
            private: Method::PRIVATE,
            protected: Method::PROTECTED,
        },
        Rule::IfFirstThenNoneOfTheRest {
            first: Method::ABSTRACT,
            rest: &[
                Method::FINAL,
                Method::NATIVE,
                Method::PRIVATE,
                Method::STATIC,
                Method::STRICT,
                Method::SYNCHRONIZED,
            ],
            message: "If ABSTRACT is present on a method, then none of FINAL, NATIVE, PRIVATE, STATIC, STRICT, or SYNCHRONIZED is permitted",
        },
    ],
}];

/// Method access-flag rules for an instance initializer, `<init>`.
pub static METHOD_INSTANCE_INIT_RULES: &[RuleCollection<MethodAccessFlags>] = &[RuleCollection {
    first_version: ClassFileVersion::JAVA1_0_2,
    last_version: None,
    rules: &[
        Rule::Visibility {
            public: Method::PUBLIC,
            private: Method::PRIVATE,
            protected: Method::PROTECTED,
        },
        Rule::NoOthersThan {
            flags: &[
                Method::PUBLIC,
                Method::PRIVATE,
                Method::PROTECTED,
                Method::VARARGS,
                Method::STRICT,
                Method::SYNTHETIC,
            ],
            message: "an instance initializer permits only a visibility flag, VARARGS, STRICT, or SYNTHETIC",
        },
    ],
}];

/// Method access-flag rules in interface context. The PUBLIC+ABSTRACT requirement applies before Java 8;
/// exactly-one-of {PUBLIC, PRIVATE} applies from Java 8 on; the exclusion
/// list applies throughout.
pub static METHOD_INTERFACE_CONTEXT_RULES: &[RuleCollection<MethodAccessFlags>] = &[
    RuleCollection {
        first_version: ClassFileVersion::JAVA1_0_2,
        last_version: None,
        rules: &[Rule::NoneOf {
            flags: &[Method::PROTECTED, Method::FINAL, Method::SYNCHRONIZED, Method::NATIVE],
            message: "none of PROTECTED, FINAL, SYNCHRONIZED, or NATIVE is permitted on an interface method",
        }],
    },
    RuleCollection {
        first_version: ClassFileVersion::JAVA1_0_2,
        last_version: Some(ClassFileVersion::JAVA7),
        rules: &[Rule::AllOf {
            flags: &[Method::PUBLIC, Method::ABSTRACT],
            message: "PUBLIC and ABSTRACT are both required on a pre-Java-8 interface method",
        }],
    },
    RuleCollection {
        first_version: ClassFileVersion::JAVA8,
        last_version: None,
        rules: &[Rule::ExactlyOneOf {
            first: Method::PUBLIC,
            second: Method::PRIVATE,
            message: "exactly one of PUBLIC or PRIVATE is required on an interface method from Java 8 on",
        }],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_final_and_abstract_conflict() {
        let flags = Class::FINAL | Class::ABSTRACT;
        assert!(validate(CLASS_RULES, ClassFileVersion::JAVA8, flags).is_err());
    }

    #[test]
    fn class_plain_public_is_valid() {
        let flags = Class::PUBLIC | Class::SUPER;
        assert!(validate(CLASS_RULES, ClassFileVersion::JAVA8, flags).is_ok());
    }

    #[test]
    fn module_flag_excludes_class_file_version_module_only_at_java9() {
        let flags = Class::MODULE | Class::PUBLIC;
        assert!(validate(CLASS_RULES, ClassFileVersion::JAVA9, flags).is_err());
        // Below Java 9 the MODULE-only rule collection is not in effect yet,
        // though MODULE itself only exists as a bit pattern, not a concept,
        // that far back.
        assert!(validate(CLASS_RULES, ClassFileVersion::JAVA8, flags).is_ok());
    }

    #[test]
    fn method_abstract_final_message_matches_scenario() {
        let flags = Method::ABSTRACT | Method::FINAL;
        let err = validate(METHOD_CLASS_CONTEXT_RULES, ClassFileVersion::JAVA8, flags).unwrap_err();
        assert_eq!(
            err,
            "If ABSTRACT is present on a method, then none of FINAL, NATIVE, PRIVATE, STATIC, STRICT, or SYNCHRONIZED is permitted"
        );
    }

    #[test]
    fn interface_method_pre_java8_requires_public_abstract() {
        let flags = Method::PUBLIC | Method::ABSTRACT;
        assert!(validate(METHOD_INTERFACE_CONTEXT_RULES, ClassFileVersion::JAVA7, flags).is_ok());
        assert!(validate(METHOD_INTERFACE_CONTEXT_RULES, ClassFileVersion::JAVA6, Method::PRIVATE).is_err());
    }

    #[test]
    fn interface_method_java8_requires_exactly_one_of_public_private() {
        assert!(validate(METHOD_INTERFACE_CONTEXT_RULES, ClassFileVersion::JAVA8, Method::PRIVATE).is_ok());
        let both = Method::PUBLIC | Method::PRIVATE;
        assert!(validate(METHOD_INTERFACE_CONTEXT_RULES, ClassFileVersion::JAVA8, both).is_err());
    }
}
