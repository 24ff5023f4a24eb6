//! Hostile-buffer handling: every rejection must discard the whole event
//! with `MalformedEvent` and extract nothing, regardless of how plausible
//! the prefix looked.

mod common;

use common::{push_tlv, ready_device, words_payload};
use wmi_codec::device::WmiConfig;
use wmi_codec::{WmiError, WmiEvent};
use wmi_wire::event::WmiEventId;
use wmi_wire::tlv::TlvTag;

fn expect_malformed(result: Result<WmiEvent, WmiError>) {
    match result {
        Err(WmiError::MalformedEvent { .. }) => {}
        other => panic!("expected MalformedEvent, got {other:?}"),
    }
}

/// A record declaring 100 payload bytes inside a 40 byte buffer.
#[test]
fn declared_length_past_buffer_end() {
    let mut dev = ready_device(WmiConfig::default());
    let mut buf = Vec::new();
    buf.extend_from_slice(&(WmiEventId::VdevStopped.fixed_tag() as u32).to_le_bytes());
    buf.extend_from_slice(&100u32.to_le_bytes());
    buf.resize(40, 0xaa);
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &buf));
}

/// A buffer too short to even hold one record header.
#[test]
fn truncated_header() {
    let mut dev = ready_device(WmiConfig::default());
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &[0x01, 0x02, 0x03]));
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &[]));
}

/// The first record's tag must match the event id; a scan event wrapped in
/// a vdev-stopped id is refused.
#[test]
fn leading_tag_must_match_event_id() {
    let mut dev = ready_device(WmiConfig::default());
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::ScanEvent.fixed_tag(),
        &words_payload(&[0; 6]),
    );
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &buf));
}

/// A fixed record whose payload is shorter than the advertised struct.
#[test]
fn undersized_fixed_record() {
    let mut dev = ready_device(WmiConfig::default());
    let mut buf = Vec::new();
    // VdevStoppedFixed needs 4 bytes; declare zero.
    push_tlv(&mut buf, WmiEventId::VdevStopped.fixed_tag(), &[]);
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &buf));
}

/// A management frame whose header length word disagrees with the frame
/// section's own declared length. The record header wins and the event is
/// dropped rather than either length trusted.
#[test]
fn mgmt_rx_length_cross_check() {
    let mut dev = ready_device(WmiConfig::default());
    let frame = [0x80, 0x00, 0x00, 0x00, 0x12, 0x34];

    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::MgmtRx.fixed_tag(),
        // pdev_id (target 1), freq, snr, rate, phy_mode, buf_len, status
        &words_payload(&[1, 2412, 30, 12, 1, frame.len() as u32 + 4, 0]),
    );
    push_tlv(&mut buf, TlvTag::ArrayBytes, &frame);
    expect_malformed(dev.handle_event(WmiEventId::MgmtRx as u32, &buf));

    // Consistent lengths decode, and the target pdev id comes back in host
    // numbering.
    let mut good = Vec::new();
    push_tlv(
        &mut good,
        WmiEventId::MgmtRx.fixed_tag(),
        &words_payload(&[1, 2412, 30, 12, 1, frame.len() as u32, 0]),
    );
    push_tlv(&mut good, TlvTag::ArrayBytes, &frame);
    match dev.handle_event(WmiEventId::MgmtRx as u32, &good).unwrap() {
        WmiEvent::MgmtRx(info) => {
            assert_eq!(info.pdev_id, 0);
            assert_eq!(info.frame, frame);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

/// A frame from a firmware pdev the chip variant does not have.
#[test]
fn mgmt_rx_untranslatable_pdev() {
    let mut dev = ready_device(WmiConfig::default());
    let frame = [0u8; 4];
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::MgmtRx.fixed_tag(),
        // Target pdev 3 only exists on multi-radio chips.
        &words_payload(&[3, 2412, 30, 12, 1, frame.len() as u32, 0]),
    );
    push_tlv(&mut buf, TlvTag::ArrayBytes, &frame);
    expect_malformed(dev.handle_event(WmiEventId::MgmtRx as u32, &buf));
}

/// An event that needs an array section but received none.
#[test]
fn service_ready_missing_bitmap_section() {
    let mut dev = ready_device(WmiConfig::default());
    // Re-negotiation is not the point here; the parse must fail before the
    // state machine is consulted.
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::ServiceReady.fixed_tag(),
        &words_payload(&[1, 2, 7700, 1]),
    );
    expect_malformed(dev.handle_event(WmiEventId::ServiceReady as u32, &buf));
}

/// Garbage trailing records after valid ones still poison the buffer.
#[test]
fn trailing_garbage_rejects_event() {
    let mut dev = ready_device(WmiConfig::default());
    let mut buf = Vec::new();
    push_tlv(
        &mut buf,
        WmiEventId::VdevStopped.fixed_tag(),
        &words_payload(&[5]),
    );
    // Half a header.
    buf.extend_from_slice(&[0xff, 0xff, 0xff]);
    expect_malformed(dev.handle_event(WmiEventId::VdevStopped as u32, &buf));
}
