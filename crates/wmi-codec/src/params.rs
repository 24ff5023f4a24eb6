//! Typed command parameters as driver code supplies them.
//!
//! These are the host-side halves of the wire layouts in `wmi_wire::cmd`:
//! MAC addresses are byte arrays, device indices are host-space, and the
//! TLV backend does the translation and packing.

use wmi_wire::cmd::{ScanFlags, VdevType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdevCreateParams {
    pub vdev_id: u32,
    pub vdev_type: VdevType,
    pub vdev_subtype: u32,
    /// Host-space physical-device index; translated before encode.
    pub pdev_id: u32,
    pub mac: [u8; 6],
    /// Per-band stream configuration; may be empty.
    pub streams: Vec<TxrxStreams>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TxrxStreams {
    pub band: Band,
    pub streams: u32,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Band {
    Band2Ghz = 1,
    Band5Ghz = 2,
    Band6Ghz = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdevStartParams {
    pub vdev_id: u32,
    pub beacon_interval: u32,
    pub dtim_period: u32,
    pub flags: u32,
    pub channel_freq_mhz: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdevUpParams {
    pub vdev_id: u32,
    pub assoc_id: u32,
    pub bssid: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCreateParams {
    pub vdev_id: u32,
    pub peer_type: u32,
    pub peer_mac: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDeleteParams {
    pub vdev_id: u32,
    pub peer_mac: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFlushTidsParams {
    pub vdev_id: u32,
    pub peer_tid_bitmap: u32,
    pub peer_mac: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdevSetParamParams {
    /// Host-space physical-device index; translated before encode.
    pub pdev_id: u32,
    pub param_id: u32,
    pub param_value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdevSuspendParams {
    pub pdev_id: u32,
    pub suspend_opt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdevResumeParams {
    pub pdev_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStartParams {
    pub scan_id: u32,
    pub scan_req_id: u32,
    pub vdev_id: u32,
    pub scan_priority: u32,
    pub notify_scan_events: u32,
    pub dwell_time_active: u32,
    pub dwell_time_passive: u32,
    pub min_rest_time: u32,
    pub max_rest_time: u32,
    pub flags: ScanFlags,
    /// Channel center frequencies in MHz; may be empty for an all-channel
    /// scan.
    pub chan_list: Vec<u32>,
    /// Extra IEs appended to probe requests; may be empty.
    pub ie_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStopParams {
    pub scan_req_id: u32,
    pub scan_id: u32,
    pub req_type: u32,
    pub vdev_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceFwHangParams {
    pub hang_type: u32,
    pub delay_ms: u32,
}
