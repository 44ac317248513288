//! Pixel value types

/// A pixel with every channel widened to the full 16-bit range.
///
/// Gray formats store the same value in all three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Pixel {
    pub fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    pub fn gray(value: u16) -> Self {
        Self { r: value, g: value, b: value }
    }
}

/// A pixel exactly as stored in a row.
///
/// Byte-aligned formats keep their bytes verbatim, including channel order. 1-bit formats
/// keep the packed bits in the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawPixel {
    pub data: [u8; 6],
}

impl RawPixel {
    pub fn new(bytes: &[u8]) -> Self {
        let mut data = [0u8; 6];
        let len = bytes.len().min(data.len());
        data[..len].copy_from_slice(&bytes[..len]);
        Self { data }
    }
}
