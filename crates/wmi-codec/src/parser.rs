//! Bounds-checked view over an untrusted event buffer.
//!
//! The transport hands the codec a borrowed byte slice for the duration of
//! one receive callback. A single linear pass validates every record header
//! against the real slice length and builds a tag index; only then may
//! fields be read, and every read is rechecked against the index. Nothing
//! partially parsed ever escapes: a violation anywhere discards the whole
//! event.

use wmi_wire::cmd::{FixedParam, WireStruct};
use wmi_wire::event::WmiEventId;
use wmi_wire::tlv::{RawTlv, TlvStream, TlvStreamError, TlvTag};

use crate::error::{Result, WmiError};

/// One validated record: tag, payload offset and declared length, all
/// proven to lie within the buffer.
pub type TlvIndexEntry = RawTlv;

/// A fully validated event buffer plus its record index.
///
/// Field accessors borrow from the underlying slice; anything the caller
/// wants past the receive callback must be copied out.
pub struct EventView<'a> {
    raw: &'a [u8],
    index: Vec<TlvIndexEntry>,
}

impl<'a> EventView<'a> {
    /// Walks `raw` and builds the index, or rejects the buffer wholesale.
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        let mut index = Vec::new();
        for record in TlvStream::new(raw) {
            match record {
                Ok(tlv) => index.push(tlv),
                Err(TlvStreamError::TruncatedHeader { at }) => {
                    return Err(WmiError::MalformedEvent {
                        reason: "truncated TLV header",
                        offset: at,
                    })
                }
                Err(TlvStreamError::TruncatedPayload { at, .. }) => {
                    return Err(WmiError::MalformedEvent {
                        reason: "TLV length exceeds buffer",
                        offset: at,
                    })
                }
            }
        }
        Ok(Self { raw, index })
    }

    /// [`EventView::parse`] plus the check that the buffer opens with the
    /// fixed-parameter record of `event_id`.
    pub fn parse_for(raw: &'a [u8], event_id: WmiEventId) -> Result<Self> {
        let view = Self::parse(raw)?;
        match view.index.first() {
            Some(first) if first.tag == event_id.fixed_tag() as u32 => Ok(view),
            Some(_) => Err(WmiError::MalformedEvent {
                reason: "buffer does not open with the event's fixed parameters",
                offset: 0,
            }),
            None => Err(WmiError::MalformedEvent {
                reason: "empty event buffer",
                offset: 0,
            }),
        }
    }

    pub fn index(&self) -> &[TlvIndexEntry] {
        &self.index
    }

    /// Looks up the `n`-th record carrying `tag`, in buffer order. Array
    /// tags repeat when a command or event declares several sections of the
    /// same element kind, which is why lookup is (tag, ordinal) rather than
    /// tag alone. Absent records are simply absent: an older firmware not
    /// emitting an optional field must be handled by the caller, not
    /// dereferenced unconditionally.
    pub fn find_nth(&self, tag: TlvTag, n: usize) -> Option<&TlvIndexEntry> {
        self.index
            .iter()
            .filter(|e| e.tag == tag as u32)
            .nth(n)
    }

    pub fn find(&self, tag: TlvTag) -> Option<&TlvIndexEntry> {
        self.find_nth(tag, 0)
    }

    /// Raw payload bytes of an indexed record.
    pub fn payload(&self, entry: &TlvIndexEntry) -> &'a [u8] {
        &self.raw[entry.payload_off..entry.payload_off + entry.len]
    }

    /// Decodes the event's fixed-parameter record. The record must be
    /// present, first, and exactly the struct's size.
    pub fn fixed<T: FixedParam>(&self) -> Result<T> {
        let entry = self.index.first().ok_or(WmiError::MalformedEvent {
            reason: "empty event buffer",
            offset: 0,
        })?;
        if entry.tag != T::TAG as u32 {
            return Err(WmiError::MalformedEvent {
                reason: "fixed parameter tag mismatch",
                offset: 0,
            });
        }
        T::decode(self.payload(entry)).ok_or(WmiError::MalformedEvent {
            reason: "fixed parameter size mismatch",
            offset: entry.payload_off,
        })
    }

    /// The `n`-th `ArrayUint32` section, decoded into owned words.
    pub fn u32_array(&self, n: usize) -> Result<Vec<u32>> {
        let entry = self.require(TlvTag::ArrayUint32, n)?;
        let payload = self.payload(entry);
        if payload.len() % 4 != 0 {
            return Err(WmiError::MalformedEvent {
                reason: "u32 array length not a multiple of 4",
                offset: entry.payload_off,
            });
        }
        Ok(payload
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect())
    }

    /// The `n`-th `ArrayBytes` section, borrowed.
    pub fn byte_array(&self, n: usize) -> Result<&'a [u8]> {
        Ok(self.payload(self.require(TlvTag::ArrayBytes, n)?))
    }

    /// The `n`-th `ArrayStruct` section as a typed element view.
    pub fn struct_array<T: WireStruct>(&self, n: usize) -> Result<ArrayView<'a, T>> {
        let entry = self.require(TlvTag::ArrayStruct, n)?;
        let payload = self.payload(entry);
        if payload.len() % T::SIZE_BYTES != 0 {
            return Err(WmiError::MalformedEvent {
                reason: "array length not a multiple of element size",
                offset: entry.payload_off,
            });
        }
        Ok(ArrayView {
            bytes: payload,
            count: payload.len() / T::SIZE_BYTES,
            offset: entry.payload_off,
            _marker: std::marker::PhantomData,
        })
    }

    fn require(&self, tag: TlvTag, n: usize) -> Result<&TlvIndexEntry> {
        self.find_nth(tag, n).ok_or(WmiError::MalformedEvent {
            reason: "required array section missing",
            offset: self.raw.len(),
        })
    }
}

/// Typed, count-bounded access to one packed array section.
///
/// The count comes from the TLV's own declared length. Element reads past
/// it are errors even if more payload bytes physically exist; the section's
/// declared extent is the only thing ever exposed.
pub struct ArrayView<'a, T: WireStruct> {
    bytes: &'a [u8],
    count: usize,
    offset: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T: WireStruct> ArrayView<'a, T> {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn element(&self, i: usize) -> Result<T> {
        if i >= self.count {
            return Err(WmiError::MalformedEvent {
                reason: "array element index beyond declared count",
                offset: self.offset,
            });
        }
        let bytes = &self.bytes[i * T::SIZE_BYTES..(i + 1) * T::SIZE_BYTES];
        T::decode(bytes).ok_or(WmiError::MalformedEvent {
            reason: "array element decode failed",
            offset: self.offset,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.count).map(move |i| self.element(i))
    }
}
