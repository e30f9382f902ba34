use bitflags::bitflags;

bitflags! {
    /// Host CPU capabilities that influence code generation.
    ///
    /// Populated once at startup from host feature detection and handed to
    /// the pieces of the pipeline that care.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HostFeatures: u32 {
        /// Load-acquire / store-release with register addressing (RCpc).
        const LRCPC  = 1 << 0;
        /// RCpc with 9-bit signed unscaled immediate addressing (RCpc2).
        const LRCPC2 = 1 << 1;
        /// Flag-manipulation instructions (RMIF and friends).
        const FLAGM  = 1 << 2;
    }
}

impl HostFeatures {
    /// Whether TSO-ordered loads/stores can carry a 9-bit signed unscaled
    /// immediate offset. Only the RCpc2 forms encode one.
    pub fn supports_tso_imm9(&self) -> bool {
        self.contains(HostFeatures::LRCPC2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tso_imm9_requires_lrcpc2() {
        assert!(!HostFeatures::LRCPC.supports_tso_imm9());
        assert!(HostFeatures::LRCPC2.supports_tso_imm9());
        assert!((HostFeatures::LRCPC | HostFeatures::LRCPC2).supports_tso_imm9());
        assert!(!HostFeatures::empty().supports_tso_imm9());
    }
}
