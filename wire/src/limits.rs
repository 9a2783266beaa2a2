//! Configurable limits for bounded decoding.

/// Wire-level limits for frame and message decoding.
///
/// These limits are enforced during decoding to bound memory use on hostile
/// input. They do not affect the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum payload size of one frame in bytes.
    pub max_payload_bytes: usize,

    /// Maximum decoded string length in bytes.
    pub max_string_len: usize,

    /// Treat bytes left over after a message read as an error.
    pub reject_trailing_bytes: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Large enough for bulk object updates.
            max_payload_bytes: 256 * 1024,

            // The widest observed bit-length prefix is 14 bits.
            max_string_len: 16 * 1024,
            reject_trailing_bytes: false,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_payload_bytes: 4096,
            max_string_len: 512,
            reject_trailing_bytes: false,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_payload_bytes: usize::MAX,
            max_string_len: usize::MAX,
            reject_trailing_bytes: false,
        }
    }

    /// Returns a copy that rejects trailing bytes after a message.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.reject_trailing_bytes = true;
        self
    }
}
