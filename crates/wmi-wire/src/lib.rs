//! Wire-format layer for the WMI host/firmware control protocol.
//!
//! WMI buffers are flat sequences of TLV records: an 8-byte `{tag, len}`
//! header followed by `len` payload bytes, padded to a 4-byte boundary.
//! All integers on the wire are little-endian for the whole protocol.
//!
//! This crate only knows the byte layout:
//!
//! - [`tlv`]: record header, the [`tlv::TlvWriter`] used to emit canonical
//!   buffers, and the [`tlv::TlvStream`] raw record iterator
//! - [`cmd`]: command opcodes and fixed-parameter layouts
//! - [`event`]: event ids and fixed-parameter layouts
//!
//! Validation of untrusted event buffers, capability dispatch and version
//! negotiation live one level up in `wmi-codec`.

pub mod cmd;
pub mod event;
pub mod tlv;

pub use tlv::{align4, TlvStream, TlvTag, TlvWriter, TLV_HDR_SIZE};

/// Splits a MAC address into the two 32-bit words the wire format carries
/// (low 32 bits, then high 16 bits in the low half of the second word).
pub fn mac_to_words(mac: [u8; 6]) -> (u32, u32) {
    let lo = u32::from_le_bytes([mac[0], mac[1], mac[2], mac[3]]);
    let hi = u32::from_le_bytes([mac[4], mac[5], 0, 0]);
    (lo, hi)
}

/// Inverse of [`mac_to_words`]. The upper 16 bits of `hi` are ignored,
/// matching what firmware emits.
pub fn words_to_mac(lo: u32, hi: u32) -> [u8; 6] {
    let l = lo.to_le_bytes();
    let h = hi.to_le_bytes();
    [l[0], l[1], l[2], l[3], h[0], h[1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_word_split_roundtrips() {
        let mac = [0x00, 0x03, 0x7f, 0x12, 0x34, 0x56];
        let (lo, hi) = mac_to_words(mac);
        assert_eq!(lo, 0x127f_0300);
        assert_eq!(hi, 0x0000_5634);
        assert_eq!(words_to_mac(lo, hi), mac);
    }

    #[test]
    fn mac_word_split_ignores_high_garbage() {
        assert_eq!(words_to_mac(0, 0xdead_0000), [0, 0, 0, 0, 0, 0]);
    }
}
