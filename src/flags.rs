//! The modifier flag set carried by a `Modified` term (§3).
//!
//! Mirrors the donor's own bit-mask flag wrappers (`til::flag`'s
//! `flags_to_struct!` types): a thin newtype over an integer with named
//! constants and `|`/`&` composition, except here the bits are never
//! parsed off the wire, only combined by the constructors in
//! [`crate::term`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One flag bit per entry in §3's modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModFlags(u8);

impl ModFlags {
    pub const NONE: ModFlags = ModFlags(0);
    pub const UNSIGNED: ModFlags = ModFlags(1 << 0);
    pub const COMPLEX: ModFlags = ModFlags(1 << 1);
    pub const CONST: ModFlags = ModFlags(1 << 2);
    pub const VOLATILE: ModFlags = ModFlags(1 << 3);
    pub const RESTRICT: ModFlags = ModFlags(1 << 4);
    pub const ATOMIC: ModFlags = ModFlags(1 << 5);
    pub const BITFIELD: ModFlags = ModFlags(1 << 6);
    pub const WIDE: ModFlags = ModFlags(1 << 7);

    pub const fn contains(self, other: ModFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: ModFlags) -> ModFlags {
        ModFlags(self.0 | other.0)
    }

    pub const fn minus(self, other: ModFlags) -> ModFlags {
        ModFlags(self.0 & !other.0)
    }

    pub const fn intersection(self, other: ModFlags) -> ModFlags {
        ModFlags(self.0 & other.0)
    }
}

impl BitOr for ModFlags {
    type Output = ModFlags;
    fn bitor(self, rhs: ModFlags) -> ModFlags {
        self.union(rhs)
    }
}

impl BitOrAssign for ModFlags {
    fn bitor_assign(&mut self, rhs: ModFlags) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for ModFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: &[(ModFlags, &str)] = &[
            (ModFlags::CONST, "const"),
            (ModFlags::VOLATILE, "volatile"),
            (ModFlags::RESTRICT, "restrict"),
            (ModFlags::ATOMIC, "_Atomic"),
            (ModFlags::UNSIGNED, "unsigned"),
            (ModFlags::COMPLEX, "_Complex"),
            (ModFlags::WIDE, "wide"),
            (ModFlags::BITFIELD, "bitfield"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(*flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
