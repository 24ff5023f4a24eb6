//! Wire-level checks on built command buffers: exact layout, exact length,
//! and agreement with the event-side decoder primitives.

mod common;

use common::{decode_records, ready_device, MockTransport};
use wmi_codec::device::WmiConfig;
use wmi_codec::params::{
    Band, PdevSetParamParams, ScanStartParams, TxrxStreams, VdevCreateParams,
};
use wmi_codec::pdev::HOST_PDEV_ID_SOC;
use wmi_codec::WmiError;
use wmi_wire::cmd::{ScanFlags, TxrxStreamsEntry, VdevCreateFixed, VdevType, WireStruct, WmiCmdId};
use wmi_wire::tlv::{align4, TlvTag, TLV_HDR_SIZE};

fn ap_vdev_create() -> VdevCreateParams {
    VdevCreateParams {
        vdev_id: 3,
        vdev_type: VdevType::Ap,
        vdev_subtype: 0,
        pdev_id: 0,
        mac: [0x02, 0x11, 0x22, 0x33, 0x44, 0x55],
        streams: vec![
            TxrxStreams {
                band: Band::Band2Ghz,
                streams: 2,
            },
            TxrxStreams {
                band: Band::Band5Ghz,
                streams: 4,
            },
        ],
    }
}

/// The vdev-create buffer must carry exactly two records, the fixed params
/// then the stream array, with the documented length arithmetic.
#[test]
fn vdev_create_layout_and_length() {
    let mut dev = ready_device(WmiConfig::default());
    dev.vdev_create(&ap_vdev_create()).unwrap();

    let sent = &dev.transport_ref().sent;
    // Negotiation sends nothing; this is the first command on the wire.
    assert_eq!(sent.len(), 1);
    let (cmd_id, bytes) = &sent[0];
    assert_eq!(*cmd_id, WmiCmdId::VdevCreate);

    let fixed_len = VdevCreateFixed::SIZE_BYTES;
    let array_len = 2 * TxrxStreamsEntry::SIZE_BYTES;
    let expected =
        TLV_HDR_SIZE + align4(fixed_len) + align4(TLV_HDR_SIZE + array_len);
    assert_eq!(bytes.len(), expected);

    let records = decode_records(bytes);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, TlvTag::VdevCreateCmd as u32);
    assert_eq!(records[0].1.len(), fixed_len);
    assert_eq!(records[1].0, TlvTag::ArrayStruct as u32);
    assert_eq!(records[1].1.len(), array_len);

    let fixed = VdevCreateFixed::decode(&records[0].1).unwrap();
    assert_eq!(fixed.vdev_id, 3);
    assert_eq!(fixed.vdev_type, VdevType::Ap as u32);
    // Host radio 0 is firmware pdev 1 on the single-radio table.
    assert_eq!(fixed.pdev_id, 1);
    assert_eq!(fixed.mac_lo, 0x3322_1102);
    assert_eq!(fixed.mac_hi, 0x5544);

    let first = TxrxStreamsEntry::decode(&records[1].1[..8]).unwrap();
    assert_eq!((first.band, first.streams), (Band::Band2Ghz as u32, 2));
}

/// An empty stream list still emits the array header with a zero length.
#[test]
fn vdev_create_empty_array_keeps_header() {
    let mut dev = ready_device(WmiConfig::default());
    let mut params = ap_vdev_create();
    params.streams.clear();
    dev.vdev_create(&params).unwrap();

    let records = decode_records(&dev.transport_ref().sent[0].1);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].0, TlvTag::ArrayStruct as u32);
    assert!(records[1].1.is_empty());
}

/// Scan-start declares its two variable sections in order, channel list
/// before extra IEs, and byte payloads are padded to the word boundary.
#[test]
fn scan_start_sections_in_declared_order() {
    let mut dev = ready_device(WmiConfig::default());
    dev.scan_start(&ScanStartParams {
        scan_id: 1,
        scan_req_id: 9,
        vdev_id: 3,
        scan_priority: 0,
        notify_scan_events: 1,
        dwell_time_active: 40,
        dwell_time_passive: 110,
        min_rest_time: 50,
        max_rest_time: 500,
        flags: ScanFlags::PASSIVE,
        chan_list: vec![2412, 2437, 5180],
        ie_data: vec![0xdd, 0x05, 0x01],
    })
    .unwrap();

    let (cmd_id, bytes) = &dev.transport_ref().sent[0];
    assert_eq!(*cmd_id, WmiCmdId::ScanStart);
    assert_eq!(bytes.len() % 4, 0);

    let records = decode_records(bytes);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].0, TlvTag::ScanStartCmd as u32);
    assert_eq!(records[1].0, TlvTag::ArrayUint32 as u32);
    assert_eq!(records[1].1.len(), 12);
    assert_eq!(&records[1].1[..4], &2412u32.to_le_bytes());
    assert_eq!(records[2].0, TlvTag::ArrayBytes as u32);
    assert_eq!(records[2].1, vec![0xdd, 0x05, 0x01]);
}

/// The SOC pseudo-id (host 0xff) maps to firmware id 0, and an id outside
/// the table aborts the build with nothing sent.
#[test]
fn pdev_set_param_translates_and_rejects() {
    let mut dev = ready_device(WmiConfig::default());
    dev.pdev_set_param(&PdevSetParamParams {
        pdev_id: HOST_PDEV_ID_SOC,
        param_id: 7,
        param_value: 1,
    })
    .unwrap();
    let records = decode_records(&dev.transport_ref().sent[0].1);
    assert_eq!(&records[0].1[..4], &0u32.to_le_bytes());

    // Host radio 2 does not exist on a single-radio chip.
    let err = dev
        .pdev_set_param(&PdevSetParamParams {
            pdev_id: 2,
            param_id: 7,
            param_value: 1,
        })
        .unwrap_err();
    assert!(matches!(err, WmiError::InvalidDeviceIndex { id: 2, .. }));
    assert_eq!(dev.transport_ref().sent.len(), 1);
}

/// A rejected send surfaces as `TransportReject`; the codec does not hold
/// on to the buffer or retry.
#[test]
fn rejected_send_reports_transport_reject() {
    let mut dev = ready_device(WmiConfig::default());
    dev.transport_mut().fail_send = true;
    let err = dev.vdev_delete(3).unwrap_err();
    assert!(matches!(err, WmiError::TransportReject(_)));

    dev.transport_mut().fail_send = false;
    dev.vdev_delete(3).unwrap();
    assert_eq!(dev.transport_ref().sent.len(), 1);
}

/// Allocation exhaustion is its own error and also sends nothing.
#[test]
fn failed_alloc_reports_allocation_failed() {
    let mut dev = ready_device(WmiConfig::default());
    dev.transport_mut().fail_alloc = true;
    let err = dev.vdev_down(1).unwrap_err();
    assert!(matches!(err, WmiError::AllocationFailed { .. }));
    assert!(dev.transport_ref().sent.is_empty());
}

/// The legacy backend writes the bare parameter struct with no record
/// headers and refuses commands outside its subset.
#[test]
fn legacy_backend_fixed_offset_subset() {
    let mut dev = ready_device(WmiConfig {
        backend: wmi_codec::Backend::Legacy,
        ..WmiConfig::default()
    });

    dev.pdev_set_param(&PdevSetParamParams {
        pdev_id: 0,
        param_id: 3,
        param_value: 9,
    })
    .unwrap();
    let (cmd_id, bytes) = &dev.transport_ref().sent[0];
    assert_eq!(*cmd_id, WmiCmdId::PdevSetParam);
    // pdev_id, param_id, param_value; no header, no padding.
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[..4], &1u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &3u32.to_le_bytes());

    let err = dev
        .scan_start(&ScanStartParams {
            scan_id: 1,
            scan_req_id: 1,
            vdev_id: 0,
            scan_priority: 0,
            notify_scan_events: 0,
            dwell_time_active: 0,
            dwell_time_passive: 0,
            min_rest_time: 0,
            max_rest_time: 0,
            flags: ScanFlags::empty(),
            chan_list: vec![],
            ie_data: vec![],
        })
        .unwrap_err();
    assert!(matches!(
        err,
        WmiError::NotSupported {
            op: wmi_codec::OpId::ScanStart
        }
    ));
}

/// Keeps the harness honest: a default transport accepts everything.
#[test]
fn mock_transport_accepts_by_default() {
    let mut t = MockTransport::default();
    use wmi_codec::transport::WmiTransport;
    let buf = t.alloc(8).unwrap();
    t.send(buf, 8, WmiCmdId::VdevDelete).unwrap();
    assert_eq!(t.sent.len(), 1);
}
