//! TLV record primitives shared by the command-build and event-parse paths.

/// Size of the on-wire record header: `tag: u32` followed by `len: u32`.
pub const TLV_HDR_SIZE: usize = 8;

/// Rounds `n` up to the next multiple of 4. Every record's header + payload
/// occupies `TLV_HDR_SIZE + align4(len)` bytes on the wire.
pub const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// Record tags. The three array tags mark variable-length sections whose
/// payload is a packed run of fixed-size elements; every other tag names a
/// fixed-parameter struct layout defined in [`crate::cmd`] or
/// [`crate::event`].
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TlvTag {
    ArrayStruct = 0x01,
    ArrayUint32 = 0x02,
    ArrayBytes = 0x03,

    // Command fixed parameters.
    VdevCreateCmd = 0x20,
    VdevDeleteCmd = 0x21,
    VdevStartCmd = 0x22,
    VdevStopCmd = 0x23,
    VdevUpCmd = 0x24,
    VdevDownCmd = 0x25,
    PeerCreateCmd = 0x26,
    PeerDeleteCmd = 0x27,
    PeerFlushTidsCmd = 0x28,
    PdevSetParamCmd = 0x29,
    PdevSuspendCmd = 0x2a,
    PdevResumeCmd = 0x2b,
    ScanStartCmd = 0x2c,
    ScanStopCmd = 0x2d,
    ForceFwHangCmd = 0x2e,

    // Event fixed parameters.
    ServiceReadyEvent = 0x80,
    ServiceReadyExtEvent = 0x81,
    ServiceReadyExt2Event = 0x82,
    ReadyEvent = 0x83,
    VdevStartRespEvent = 0x84,
    VdevStoppedEvent = 0x85,
    PeerDeleteRespEvent = 0x86,
    ScanEvent = 0x87,
    MgmtRxHdr = 0x88,
}

impl TlvTag {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0x01 => Some(Self::ArrayStruct),
            0x02 => Some(Self::ArrayUint32),
            0x03 => Some(Self::ArrayBytes),
            0x20 => Some(Self::VdevCreateCmd),
            0x21 => Some(Self::VdevDeleteCmd),
            0x22 => Some(Self::VdevStartCmd),
            0x23 => Some(Self::VdevStopCmd),
            0x24 => Some(Self::VdevUpCmd),
            0x25 => Some(Self::VdevDownCmd),
            0x26 => Some(Self::PeerCreateCmd),
            0x27 => Some(Self::PeerDeleteCmd),
            0x28 => Some(Self::PeerFlushTidsCmd),
            0x29 => Some(Self::PdevSetParamCmd),
            0x2a => Some(Self::PdevSuspendCmd),
            0x2b => Some(Self::PdevResumeCmd),
            0x2c => Some(Self::ScanStartCmd),
            0x2d => Some(Self::ScanStopCmd),
            0x2e => Some(Self::ForceFwHangCmd),
            0x80 => Some(Self::ServiceReadyEvent),
            0x81 => Some(Self::ServiceReadyExtEvent),
            0x82 => Some(Self::ServiceReadyExt2Event),
            0x83 => Some(Self::ReadyEvent),
            0x84 => Some(Self::VdevStartRespEvent),
            0x85 => Some(Self::VdevStoppedEvent),
            0x86 => Some(Self::PeerDeleteRespEvent),
            0x87 => Some(Self::ScanEvent),
            0x88 => Some(Self::MgmtRxHdr),
            _ => None,
        }
    }

    /// True for the tags whose payload is a packed element run rather than a
    /// single fixed-parameter struct.
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ArrayStruct | Self::ArrayUint32 | Self::ArrayBytes)
    }
}

/// Canonical record emitter over a caller-supplied buffer.
///
/// The buffer is sized up front by the command builder (exact-fit), so an
/// overrun here is a length-computation bug, not a runtime condition; the
/// writer asserts rather than returning errors.
pub struct TlvWriter<'a> {
    buf: &'a mut [u8],
    off: usize,
}

impl<'a> TlvWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, off: 0 }
    }

    pub fn offset(&self) -> usize {
        self.off
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    pub fn put_u32(&mut self, v: u32) {
        assert!(self.remaining() >= 4, "TlvWriter overrun");
        self.buf[self.off..self.off + 4].copy_from_slice(&v.to_le_bytes());
        self.off += 4;
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        assert!(self.remaining() >= bytes.len(), "TlvWriter overrun");
        self.buf[self.off..self.off + bytes.len()].copy_from_slice(bytes);
        self.off += bytes.len();
    }

    /// Writes a record header. `len` is the unpadded payload byte count.
    pub fn put_tlv_hdr(&mut self, tag: TlvTag, len: usize) {
        assert!(len <= u32::MAX as usize, "TLV payload too large");
        self.put_u32(tag as u32);
        self.put_u32(len as u32);
    }

    /// Advances to the next 4-byte boundary. Pad bytes were zeroed at
    /// allocation time and are left untouched.
    pub fn pad4(&mut self) {
        let padded = align4(self.off);
        assert!(padded <= self.buf.len(), "TlvWriter overrun");
        self.off = padded;
    }
}

/// One raw record as seen by [`TlvStream`]. `payload_off`/`len` are
/// guaranteed to lie within the walked slice; the tag is raw and may be
/// unknown to this host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawTlv {
    pub tag: u32,
    pub payload_off: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlvStreamError {
    /// Fewer than `TLV_HDR_SIZE` bytes remained where a header was expected.
    TruncatedHeader { at: usize },
    /// A header declared more payload than the buffer holds.
    TruncatedPayload {
        tag: u32,
        declared_len: usize,
        remaining: usize,
        at: usize,
    },
}

impl std::fmt::Display for TlvStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlvStreamError::TruncatedHeader { at } => {
                write!(f, "truncated TLV header at offset {at}")
            }
            TlvStreamError::TruncatedPayload {
                tag,
                declared_len,
                remaining,
                at,
            } => write!(
                f,
                "TLV tag {tag:#x} at offset {at} declares {declared_len} payload bytes, only {remaining} remain"
            ),
        }
    }
}

impl std::error::Error for TlvStreamError {}

/// Linear walk over the records of a raw buffer.
///
/// Each step checks the header fits and the declared payload lies within
/// the slice before the cursor advances by `TLV_HDR_SIZE + align4(len)`;
/// the iterator never yields a record reaching past the input. Trailing
/// bytes that cannot hold a full header are reported as a truncated header.
pub struct TlvStream<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> TlvStream<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, cursor: 0 }
    }
}

impl<'a> Iterator for TlvStream<'a> {
    type Item = Result<RawTlv, TlvStreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.buf.len() {
            return None;
        }
        if self.cursor + TLV_HDR_SIZE > self.buf.len() {
            let at = self.cursor;
            self.cursor = self.buf.len();
            return Some(Err(TlvStreamError::TruncatedHeader { at }));
        }

        let at = self.cursor;
        let tag = u32::from_le_bytes(self.buf[at..at + 4].try_into().unwrap());
        let len = u32::from_le_bytes(self.buf[at + 4..at + 8].try_into().unwrap()) as usize;

        let payload_off = at + TLV_HDR_SIZE;
        let remaining = self.buf.len() - payload_off;
        if len > remaining {
            self.cursor = self.buf.len();
            return Some(Err(TlvStreamError::TruncatedPayload {
                tag,
                declared_len: len,
                remaining,
                at,
            }));
        }

        // align4 cannot overflow here: len <= remaining < buf.len().
        self.cursor = payload_off + align4(len).min(remaining);
        Some(Ok(RawTlv {
            tag,
            payload_off,
            len,
        }))
    }
}
