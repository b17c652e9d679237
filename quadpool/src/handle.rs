//! Record handles: byte offsets into the pool.

use std::fmt;

/// A handle to a record stored in the pool.
///
/// A handle is the byte offset of the record's length header, carried as
/// a 4-byte signed integer so it can travel through binary node layouts
/// unchanged. Handles are the only cross-record references: no component
/// holds a live in-memory reference to another record between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(i32);

impl Handle {
    /// Number of bytes a handle occupies in serialized form.
    pub const WIRE_BYTES: usize = 4;

    pub fn new(offset: i32) -> Self {
        Handle(offset)
    }

    /// The byte offset this handle addresses.
    pub fn offset(self) -> i32 {
        self.0
    }

    /// Big-endian wire form.
    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Handle(i32::from_be_bytes(bytes))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        for offset in [0, 1, 255, 4096, i32::MAX, -1] {
            let handle = Handle::new(offset);
            assert_eq!(Handle::from_be_bytes(handle.to_be_bytes()), handle);
        }
    }

    #[test]
    fn wire_form_is_big_endian() {
        assert_eq!(Handle::new(0x0102_0304).to_be_bytes(), [1, 2, 3, 4]);
    }
}
