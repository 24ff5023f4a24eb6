//! Shared harness: an in-memory transport that captures sends, and helpers
//! for assembling firmware-side event buffers byte by byte.
#![allow(dead_code)]

use wmi_codec::device::{WmiConfig, WmiDevice};
use wmi_codec::transport::{CmdBuf, SendRejected, WmiTransport};
use wmi_wire::cmd::WmiCmdId;
use wmi_wire::event::WmiEventId;
use wmi_wire::tlv::{align4, TlvTag, TLV_HDR_SIZE};

/// Captures every accepted send; can be flipped to refuse allocation or
/// reject sends to exercise the failure paths.
#[derive(Default)]
pub struct MockTransport {
    pub sent: Vec<(WmiCmdId, Vec<u8>)>,
    pub fail_alloc: bool,
    pub fail_send: bool,
}

impl WmiTransport for MockTransport {
    fn alloc(&mut self, len: usize) -> Option<CmdBuf> {
        if self.fail_alloc {
            None
        } else {
            Some(CmdBuf::zeroed(len))
        }
    }

    fn send(&mut self, buf: CmdBuf, len: usize, cmd_id: WmiCmdId) -> Result<(), SendRejected> {
        assert_eq!(buf.len(), len, "builder must size buffers exact-fit");
        if self.fail_send {
            return Err(SendRejected {
                reason: "queue full",
                buf,
            });
        }
        self.sent.push((cmd_id, buf.as_slice().to_vec()));
        Ok(())
    }
}

/// Appends one TLV record: header, payload, zero padding to the next word.
pub fn push_tlv(out: &mut Vec<u8>, tag: TlvTag, payload: &[u8]) {
    out.extend_from_slice(&(tag as u32).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out.resize(out.len() + align4(payload.len()) - payload.len(), 0);
}

pub fn words_payload(words: &[u32]) -> Vec<u8> {
    let mut p = Vec::with_capacity(words.len() * 4);
    for &w in words {
        p.extend_from_slice(&w.to_le_bytes());
    }
    p
}

/// A minimal service-ready buffer: the fixed record plus one base bitmap
/// section.
pub fn service_ready_event(abi_major: u32, abi_minor: u32, service_words: &[u32]) -> Vec<u8> {
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::ServiceReady.fixed_tag(),
        &words_payload(&[abi_major, abi_minor, 7700, 1]),
    );
    push_tlv(&mut buf, TlvTag::ArrayUint32, &words_payload(service_words));
    buf
}

pub fn ready_event() -> Vec<u8> {
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::Ready.fixed_tag(),
        &words_payload(&[0, 0x4433_2211, 0x6655, 64]),
    );
    buf
}

/// Legacy bring-up events: the bare fixed struct, bitmap words appended.
pub fn legacy_service_ready_event(abi_major: u32, abi_minor: u32, service_words: &[u32]) -> Vec<u8> {
    let mut buf = words_payload(&[abi_major, abi_minor, 7700, 1]);
    buf.extend_from_slice(&words_payload(service_words));
    buf
}

pub fn legacy_ready_event() -> Vec<u8> {
    words_payload(&[0, 0x4433_2211, 0x6655, 64])
}

/// Drives a fresh device through a successful negotiation: compatible
/// service-ready, then firmware ready, in whichever encoding the selected
/// backend expects.
pub fn ready_device(config: WmiConfig) -> WmiDevice<MockTransport> {
    let mut dev = WmiDevice::attach(MockTransport::default(), config);
    let words = [0xffff_ffff, 0xffff_ffff];
    let (service_ready, ready) = match config.backend {
        wmi_codec::Backend::Tlv => (service_ready_event(1, 2, &words), ready_event()),
        wmi_codec::Backend::Legacy => {
            (legacy_service_ready_event(1, 2, &words), legacy_ready_event())
        }
    };
    dev.handle_event(WmiEventId::ServiceReady as u32, &service_ready)
        .expect("service ready accepted");
    dev.handle_event(WmiEventId::Ready as u32, &ready)
        .expect("fw ready accepted");
    dev
}

/// Splits one sent buffer back into `(tag, payload)` records.
pub fn decode_records(mut bytes: &[u8]) -> Vec<(u32, Vec<u8>)> {
    let mut records = Vec::new();
    while !bytes.is_empty() {
        assert!(bytes.len() >= TLV_HDR_SIZE, "truncated header");
        let tag = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let padded = align4(len);
        assert!(bytes.len() >= TLV_HDR_SIZE + padded, "truncated payload");
        records.push((tag, bytes[TLV_HDR_SIZE..TLV_HDR_SIZE + len].to_vec()));
        bytes = &bytes[TLV_HDR_SIZE + padded..];
    }
    records
}
