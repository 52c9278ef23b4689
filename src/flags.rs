bitflags::bitflags! {
    /// Per-entry policy flags.
    ///
    /// The bit values are part of the JSON file format (`flags` is written as
    /// the raw bitmask).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CVarFlags: u32 {
        /// Persist the entry when the registry is saved.
        const ARCHIVE = 1 << 0;
        /// Reject `set` once the entry exists.
        const READ_ONLY = 1 << 1;
        /// Exclude the entry from UI enumeration and from ini output.
        const HIDDEN = 1 << 2;
        /// Placeholder created before its real declaration ran.
        const UNINITIALIZED = 1 << 3;
        /// Only shown in advanced UI views.
        const ADVANCED = 1 << 4;
    }
}

impl CVarFlags {
    /// Flags that a declaration may set; `UNINITIALIZED` is registry-owned.
    pub const fn declarable(self) -> Self {
        self.difference(Self::UNINITIALIZED)
    }

    pub const fn is_archived(self) -> bool {
        self.contains(Self::ARCHIVE)
    }

    pub const fn is_read_only(self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    pub const fn is_hidden(self) -> bool {
        self.contains(Self::HIDDEN)
    }

    pub const fn is_placeholder(self) -> bool {
        self.contains(Self::UNINITIALIZED)
    }
}
