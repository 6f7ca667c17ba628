//! Parameter attribute flags.
//!
//! A `Param` carries one `ParamFlags` bitset for the attributes that
//! `typeset`, `export`, `readonly` and the scope machinery consult.

use bitflags::bitflags;

bitflags! {
    /// Attribute bits of a single parameter.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParamFlags: u32 {
        // === Behavior flags ===

        /// Assignment and unset are rejected.
        const READONLY = 1 << 0;
        /// Mirrored into the process environment.
        const EXPORTED = 1 << 1;
        /// Permanently bound to an interpreter cell; never leaves the table.
        const SPECIAL = 1 << 2;
        /// Half of a scalar/array tied pair.
        const TIED = 1 << 3;
        /// Declared but carrying no value; hidden from visible iteration.
        const UNSET = 1 << 4;
        /// Created by `local`/`typeset` inside a function scope.
        const LOCAL = 1 << 5;
        /// Array elements are deduplicated on every set.
        const UNIQUE = 1 << 6;
        /// Mutation is rejected while the shell runs in restricted mode.
        const RESTRICTED = 1 << 7;
        /// Synthetic view of one associative-array entry.
        const HASH_ELEMENT = 1 << 8;

        // === Formatting hints (carried, interpreted by display collaborators) ===

        /// Pad/truncate on the left to `width`.
        const LEFT_JUSTIFY = 1 << 9;
        /// Pad/truncate on the right to `width`.
        const RIGHT_JUSTIFY = 1 << 10;
        /// Pad with zeros instead of spaces.
        const ZERO_PAD = 1 << 11;

        // === Lifecycle flags ===

        /// Value came from a built-in default, not an assignment.
        const DEFAULTED = 1 << 12;
        /// Never seeded from the inherited environment at startup.
        const DONT_IMPORT = 1 << 13;
        /// A localized special is not restored when its scope ends.
        const NO_RESTORE = 1 << 14;
    }
}

impl ParamFlags {
    /// Formatting hint bits, cleared together when a record is reused.
    pub const JUSTIFY: ParamFlags = ParamFlags::LEFT_JUSTIFY
        .union(ParamFlags::RIGHT_JUSTIFY)
        .union(ParamFlags::ZERO_PAD);

    /// Whether the parameter currently holds a live value.
    #[inline]
    pub fn is_live(self) -> bool {
        !self.contains(ParamFlags::UNSET)
    }

    /// Whether mutation must be rejected outright.
    #[inline]
    pub fn is_readonly(self) -> bool {
        self.contains(ParamFlags::READONLY)
    }

    /// Whether mutation must be rejected in restricted mode.
    #[inline]
    pub fn is_restricted(self) -> bool {
        self.contains(ParamFlags::RESTRICTED)
    }

    #[inline]
    pub fn is_special(self) -> bool {
        self.contains(ParamFlags::SPECIAL)
    }

    #[inline]
    pub fn is_exported(self) -> bool {
        self.contains(ParamFlags::EXPORTED)
    }
}

#[cfg(test)]
mod tests {
    use super::ParamFlags;

    #[test]
    fn justify_mask_covers_all_padding_bits() {
        assert!(ParamFlags::JUSTIFY.contains(ParamFlags::LEFT_JUSTIFY));
        assert!(ParamFlags::JUSTIFY.contains(ParamFlags::RIGHT_JUSTIFY));
        assert!(ParamFlags::JUSTIFY.contains(ParamFlags::ZERO_PAD));
        assert!(!ParamFlags::JUSTIFY.contains(ParamFlags::READONLY));
    }

    #[test]
    fn unset_bit_controls_liveness() {
        let mut flags = ParamFlags::EXPORTED;
        assert!(flags.is_live());
        flags |= ParamFlags::UNSET;
        assert!(!flags.is_live());
    }
}
