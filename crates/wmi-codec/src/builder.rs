//! Command buffer construction.
//!
//! A command is one fixed-parameter record followed by zero or more
//! variable-length array sections in declaration order. Every declared
//! section emits its array header even at zero elements; a later protocol
//! revision may grow a section, and a missing placeholder would shift every
//! record after it. The builder computes the exact total length, fills a
//! transport-allocated buffer, and dispatches it; the only side effect is
//! that allocation.

use tracing::{debug, trace};
use wmi_wire::cmd::{FixedParam, WireStruct, WmiCmdId};
use wmi_wire::tlv::{align4, TlvTag, TlvWriter, TLV_HDR_SIZE};

use crate::error::{Result, WmiError};
use crate::transport::WmiTransport;

/// One variable-length section of a command, in host-owned form.
pub enum VarSection<'a> {
    /// Packed fixed-size struct elements; `bytes.len()` must be a multiple
    /// of `elem_size`.
    Structs { elem_size: usize, bytes: &'a [u8] },
    Words(&'a [u32]),
    Bytes(&'a [u8]),
}

impl VarSection<'_> {
    fn tag(&self) -> TlvTag {
        match self {
            VarSection::Structs { .. } => TlvTag::ArrayStruct,
            VarSection::Words(_) => TlvTag::ArrayUint32,
            VarSection::Bytes(_) => TlvTag::ArrayBytes,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            VarSection::Structs { bytes, .. } => bytes.len(),
            VarSection::Words(w) => w.len() * 4,
            VarSection::Bytes(b) => b.len(),
        }
    }
}

/// Encodes a set of packed elements for a [`VarSection::Structs`] section.
pub fn pack_elements<T: WireStruct>(elems: &[T]) -> Vec<u8> {
    let mut out = vec![0u8; elems.len() * T::SIZE_BYTES];
    for (i, e) in elems.iter().enumerate() {
        e.encode(&mut out[i * T::SIZE_BYTES..(i + 1) * T::SIZE_BYTES]);
    }
    out
}

/// Serialized length of a command with the given fixed-parameter size and
/// section payload lengths. Every section is padded to 4 bytes, zero-element
/// sections included.
fn total_len(fixed_size: usize, sections: &[VarSection<'_>]) -> usize {
    let mut len = TLV_HDR_SIZE + align4(fixed_size);
    for s in sections {
        len += align4(TLV_HDR_SIZE + s.payload_len());
    }
    len
}

/// Builds and dispatches one command. On transport rejection the buffer is
/// freed here (single owner, single free) and the rejection surfaces as
/// [`WmiError::TransportReject`].
pub fn build_and_send<T, P>(
    transport: &mut T,
    cmd_id: WmiCmdId,
    fixed: &P,
    sections: &[VarSection<'_>],
) -> Result<()>
where
    T: WmiTransport,
    P: FixedParam,
{
    for s in sections {
        if let VarSection::Structs { elem_size, bytes } = s {
            debug_assert!(*elem_size > 0 && bytes.len() % elem_size == 0);
        }
    }

    let len = total_len(P::SIZE_BYTES, sections);
    let mut buf = transport
        .alloc(len)
        .ok_or(WmiError::AllocationFailed { len })?;

    {
        let mut w = TlvWriter::new(buf.as_mut_slice());
        w.put_tlv_hdr(P::TAG, P::SIZE_BYTES);
        let mut tmp = vec![0u8; P::SIZE_BYTES];
        fixed.encode(&mut tmp);
        w.put_bytes(&tmp);
        w.pad4();

        for s in sections {
            w.put_tlv_hdr(s.tag(), s.payload_len());
            match s {
                VarSection::Structs { bytes, .. } => w.put_bytes(bytes),
                VarSection::Words(words) => {
                    for &word in *words {
                        w.put_u32(word);
                    }
                }
                VarSection::Bytes(bytes) => w.put_bytes(bytes),
            }
            w.pad4();
        }
        debug_assert_eq!(w.offset(), len);
    }

    trace!(cmd_id = ?cmd_id, len, sections = sections.len(), "sending command");
    transport.send(buf, len, cmd_id).map_err(|rejected| {
        debug!(cmd_id = ?cmd_id, reason = rejected.reason, "transport rejected command");
        drop(rejected.buf);
        WmiError::TransportReject(rejected.reason)
    })
}
