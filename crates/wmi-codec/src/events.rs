//! Host-neutral, owned forms of decoded firmware events.
//!
//! Extractors borrow from the transport's buffer while decoding; everything
//! a caller may keep past the receive callback is copied into these types.

use crate::negotiation::WmiVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReadyInfo {
    pub fw_version: WmiVersion,
    pub fw_build_number: u32,
    pub num_phys: u32,
    pub service_words: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyInfo {
    pub status: u32,
    pub mac: [u8; 6],
    pub num_total_peers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdevStartResponseInfo {
    pub vdev_id: u32,
    pub requestor_id: u32,
    pub resp_type: u32,
    pub status: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDeleteResponseInfo {
    pub vdev_id: u32,
    pub peer_mac: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEventInfo {
    pub event_type: u32,
    pub reason: u32,
    pub channel_freq: u32,
    pub scan_req_id: u32,
    pub scan_id: u32,
    pub vdev_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MgmtRxInfo {
    /// Host-side device index; the wire value was translated on extraction.
    pub pdev_id: u32,
    pub channel_freq: u32,
    pub snr: u32,
    pub rate: u32,
    pub phy_mode: u32,
    pub status: u32,
    pub frame: Vec<u8>,
}

/// A decoded event as returned to the driver above the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmiEvent {
    ServiceReady(ServiceReadyInfo),
    ServiceReadyExt { words: Vec<u32> },
    ServiceReadyExt2 { words: Vec<u32> },
    FwReady(ReadyInfo),
    VdevStartResponse(VdevStartResponseInfo),
    VdevStopped { vdev_id: u32 },
    PeerDeleteResponse(PeerDeleteResponseInfo),
    Scan(ScanEventInfo),
    MgmtRx(MgmtRxInfo),
}
