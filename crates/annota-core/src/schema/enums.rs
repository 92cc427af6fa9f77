//! Closed enumerations used by enum-typed attributes.

use std::fmt;

/// Name of the fallback member carried by most enumerations.
pub const UNSPECIFIED: &str = "UNSPECIFIED";

/// A named, closed set of `(member name, integer value)` pairs.
///
/// Declared as `static` items so members can hold a `'static` reference back
/// to their set.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumChoices {
    pub name: &'static str,
    pub members: &'static [(&'static str, i64)],
}

impl EnumChoices {
    pub const fn new(name: &'static str, members: &'static [(&'static str, i64)]) -> Self {
        EnumChoices { name, members }
    }

    /// Look a member up by its exact (case-sensitive) name.
    pub fn by_name(&'static self, name: &str) -> Option<EnumMember> {
        self.members
            .iter()
            .position(|(n, _)| *n == name)
            .map(|index| EnumMember {
                choices: self,
                index,
            })
    }

    /// Look a member up by its integer value.
    pub fn by_value(&'static self, value: i64) -> Option<EnumMember> {
        self.members
            .iter()
            .position(|(_, v)| *v == value)
            .map(|index| EnumMember {
                choices: self,
                index,
            })
    }

    /// The `UNSPECIFIED` member, if declared.
    pub fn unspecified(&'static self) -> Option<EnumMember> {
        self.by_name(UNSPECIFIED)
    }

    /// Member used when an attribute declares no default: `UNSPECIFIED` when
    /// present, otherwise the first member.
    pub fn fallback(&'static self) -> Option<EnumMember> {
        self.unspecified().or_else(|| {
            (!self.members.is_empty()).then_some(EnumMember {
                choices: self,
                index: 0,
            })
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.members.iter().map(|(n, _)| *n)
    }
}

/// One member of an [`EnumChoices`] set.
#[derive(Clone, Copy)]
pub struct EnumMember {
    choices: &'static EnumChoices,
    index: usize,
}

impl EnumMember {
    pub fn name(&self) -> &'static str {
        self.choices.members[self.index].0
    }

    pub fn value(&self) -> i64 {
        self.choices.members[self.index].1
    }

    pub fn choices(&self) -> &'static EnumChoices {
        self.choices
    }

    pub fn is_unspecified(&self) -> bool {
        self.name() == UNSPECIFIED
    }
}

impl PartialEq for EnumMember {
    fn eq(&self, other: &Self) -> bool {
        self.choices.name == other.choices.name && self.index == other.index
    }
}

impl Eq for EnumMember {}

impl fmt::Debug for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.choices.name, self.name())
    }
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
