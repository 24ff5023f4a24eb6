//! Event ids and fixed-parameter layouts.
//!
//! Event buffers come from firmware and are untrusted; these layouts only
//! describe the bytes. Bounds validation happens in `wmi-codec`'s parser
//! before any of these `decode` calls run.

use crate::cmd::{wire_struct, FixedParam, WireStruct};
use crate::tlv::TlvTag;

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WmiEventId {
    ServiceReady = 0x8001,
    ServiceReadyExt = 0x8002,
    ServiceReadyExt2 = 0x8003,
    Ready = 0x8004,

    VdevStartResponse = 0x8101,
    VdevStopped = 0x8102,

    PeerDeleteResponse = 0x8201,

    ScanEvent = 0x8301,
    MgmtRx = 0x8302,
}

impl WmiEventId {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0x8001 => Some(Self::ServiceReady),
            0x8002 => Some(Self::ServiceReadyExt),
            0x8003 => Some(Self::ServiceReadyExt2),
            0x8004 => Some(Self::Ready),
            0x8101 => Some(Self::VdevStartResponse),
            0x8102 => Some(Self::VdevStopped),
            0x8201 => Some(Self::PeerDeleteResponse),
            0x8301 => Some(Self::ScanEvent),
            0x8302 => Some(Self::MgmtRx),
            _ => None,
        }
    }

    /// Tag of the fixed-parameter record every buffer of this event type
    /// must open with.
    pub const fn fixed_tag(self) -> TlvTag {
        match self {
            Self::ServiceReady => TlvTag::ServiceReadyEvent,
            Self::ServiceReadyExt => TlvTag::ServiceReadyExtEvent,
            Self::ServiceReadyExt2 => TlvTag::ServiceReadyExt2Event,
            Self::Ready => TlvTag::ReadyEvent,
            Self::VdevStartResponse => TlvTag::VdevStartRespEvent,
            Self::VdevStopped => TlvTag::VdevStoppedEvent,
            Self::PeerDeleteResponse => TlvTag::PeerDeleteRespEvent,
            Self::ScanEvent => TlvTag::ScanEvent,
            Self::MgmtRx => TlvTag::MgmtRxHdr,
        }
    }
}

wire_struct!(
    /// Opening record of the service-ready event. The base capability
    /// bitmap follows as an `ArrayUint32` section.
    ServiceReadyFixed {
        abi_major,
        abi_minor,
        fw_build_number,
        num_phys,
    }
);
impl FixedParam for ServiceReadyFixed {
    const TAG: TlvTag = TlvTag::ServiceReadyEvent;
}

wire_struct!(
    /// First-generation extension; its `ArrayUint32` section carries the
    /// "ext" capability bitmap words. Firmware may never send this event.
    ServiceReadyExtFixed {
        board_id,
        fw_feature_flags,
    }
);
impl FixedParam for ServiceReadyExtFixed {
    const TAG: TlvTag = TlvTag::ServiceReadyExtEvent;
}

wire_struct!(ServiceReadyExt2Fixed { chip_cap_flags });
impl FixedParam for ServiceReadyExt2Fixed {
    const TAG: TlvTag = TlvTag::ServiceReadyExt2Event;
}

wire_struct!(ReadyFixed {
    status,
    mac_lo,
    mac_hi,
    num_total_peers,
});
impl FixedParam for ReadyFixed {
    const TAG: TlvTag = TlvTag::ReadyEvent;
}

wire_struct!(VdevStartRespFixed {
    vdev_id,
    requestor_id,
    resp_type,
    status,
});
impl FixedParam for VdevStartRespFixed {
    const TAG: TlvTag = TlvTag::VdevStartRespEvent;
}

wire_struct!(VdevStoppedFixed { vdev_id });
impl FixedParam for VdevStoppedFixed {
    const TAG: TlvTag = TlvTag::VdevStoppedEvent;
}

wire_struct!(PeerDeleteRespFixed {
    vdev_id,
    peer_mac_lo,
    peer_mac_hi,
});
impl FixedParam for PeerDeleteRespFixed {
    const TAG: TlvTag = TlvTag::PeerDeleteRespEvent;
}

wire_struct!(ScanEventFixed {
    event_type,
    reason,
    channel_freq,
    scan_req_id,
    scan_id,
    vdev_id,
});
impl FixedParam for ScanEventFixed {
    const TAG: TlvTag = TlvTag::ScanEvent;
}

wire_struct!(
    /// `pdev_id` is in the firmware's id space; `buf_len` duplicates the
    /// frame `ArrayBytes` section's declared length and is cross-checked
    /// against it by the extractor.
    MgmtRxHdrFixed {
        pdev_id,
        channel_freq,
        snr,
        rate,
        phy_mode,
        buf_len,
        status,
    }
);
impl FixedParam for MgmtRxHdrFixed {
    const TAG: TlvTag = TlvTag::MgmtRxHdr;
}
