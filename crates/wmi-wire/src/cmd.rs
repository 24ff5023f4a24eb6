//! Command opcodes and fixed-parameter layouts.
//!
//! A command buffer carries no opcode of its own; the opcode rides alongside
//! the buffer in the transport send call and the transport owns the outer
//! framing. The buffer itself is the fixed-parameter record followed by the
//! command's declared variable-length sections, in declaration order.

use bitflags::bitflags;

use crate::tlv::TlvTag;

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WmiCmdId {
    PdevSetParam = 0x1001,
    PdevSuspend = 0x1002,
    PdevResume = 0x1003,

    VdevCreate = 0x1101,
    VdevDelete = 0x1102,
    VdevStart = 0x1103,
    VdevStop = 0x1104,
    VdevUp = 0x1105,
    VdevDown = 0x1106,

    PeerCreate = 0x1201,
    PeerDelete = 0x1202,
    PeerFlushTids = 0x1203,

    ScanStart = 0x1301,
    ScanStop = 0x1302,

    ForceFwHang = 0x1f01,
}

impl WmiCmdId {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0x1001 => Some(Self::PdevSetParam),
            0x1002 => Some(Self::PdevSuspend),
            0x1003 => Some(Self::PdevResume),
            0x1101 => Some(Self::VdevCreate),
            0x1102 => Some(Self::VdevDelete),
            0x1103 => Some(Self::VdevStart),
            0x1104 => Some(Self::VdevStop),
            0x1105 => Some(Self::VdevUp),
            0x1106 => Some(Self::VdevDown),
            0x1201 => Some(Self::PeerCreate),
            0x1202 => Some(Self::PeerDelete),
            0x1203 => Some(Self::PeerFlushTids),
            0x1301 => Some(Self::ScanStart),
            0x1302 => Some(Self::ScanStop),
            0x1f01 => Some(Self::ForceFwHang),
            _ => None,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VdevType {
    Sta = 1,
    Ap = 2,
    Ibss = 3,
    Monitor = 4,
}

bitflags! {
    /// Flag word of the scan-start fixed parameters.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ScanFlags: u32 {
        const PASSIVE = 1 << 0;
        const ADD_BCAST_PROBE_REQ = 1 << 1;
        const ADD_CCK_RATES = 1 << 2;
        const ADD_OFDM_RATES = 1 << 3;
        const FILTER_PROBE_REQ = 1 << 4;
        const NOTIFY_COMPLETION = 1 << 5;
    }
}

/// A fixed-parameter or array-element struct with a flat little-endian
/// layout. `encode` fills exactly `SIZE_BYTES` bytes; `decode` accepts only
/// an exact-size slice, so a truncated or padded payload never produces a
/// value.
pub trait WireStruct: Sized {
    const SIZE_BYTES: usize;

    fn encode(&self, out: &mut [u8]);
    fn decode(bytes: &[u8]) -> Option<Self>;
}

/// A `WireStruct` that is the first record of a command or event buffer and
/// therefore carries a compile-time type tag.
pub trait FixedParam: WireStruct {
    const TAG: TlvTag;
}

pub(crate) fn put_word(out: &mut [u8], idx: usize, v: u32) {
    out[idx * 4..idx * 4 + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_word(bytes: &[u8], idx: usize) -> u32 {
    u32::from_le_bytes(bytes[idx * 4..idx * 4 + 4].try_into().unwrap())
}

macro_rules! wire_struct {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: u32,)+
        }

        impl WireStruct for $name {
            const SIZE_BYTES: usize = wire_struct!(@count $($field)+) * 4;

            fn encode(&self, out: &mut [u8]) {
                assert_eq!(out.len(), Self::SIZE_BYTES);
                let mut idx = 0;
                $(
                    $crate::cmd::put_word(out, idx, self.$field);
                    #[allow(unused_assignments)]
                    { idx += 1; }
                )+
            }

            fn decode(bytes: &[u8]) -> Option<Self> {
                if bytes.len() != Self::SIZE_BYTES {
                    return None;
                }
                let mut idx = 0;
                Some(Self {
                    $($field: {
                        let v = $crate::cmd::get_word(bytes, idx);
                        #[allow(unused_assignments)]
                        { idx += 1; }
                        v
                    },)+
                })
            }
        }
    };
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + wire_struct!(@count $($tail)*) };
}

pub(crate) use wire_struct;

wire_struct!(
    /// `mac_lo`/`mac_hi` hold the interface MAC split per
    /// [`crate::mac_to_words`]. `pdev_id` is in the firmware's id space;
    /// translation happens before encode.
    VdevCreateFixed {
        vdev_id,
        vdev_type,
        vdev_subtype,
        pdev_id,
        mac_lo,
        mac_hi,
    }
);
impl FixedParam for VdevCreateFixed {
    const TAG: TlvTag = TlvTag::VdevCreateCmd;
}

wire_struct!(VdevDeleteFixed { vdev_id });
impl FixedParam for VdevDeleteFixed {
    const TAG: TlvTag = TlvTag::VdevDeleteCmd;
}

wire_struct!(VdevStartFixed {
    vdev_id,
    beacon_interval,
    dtim_period,
    flags,
    channel_freq_mhz,
});
impl FixedParam for VdevStartFixed {
    const TAG: TlvTag = TlvTag::VdevStartCmd;
}

wire_struct!(VdevStopFixed { vdev_id });
impl FixedParam for VdevStopFixed {
    const TAG: TlvTag = TlvTag::VdevStopCmd;
}

wire_struct!(VdevUpFixed {
    vdev_id,
    assoc_id,
    bssid_lo,
    bssid_hi,
});
impl FixedParam for VdevUpFixed {
    const TAG: TlvTag = TlvTag::VdevUpCmd;
}

wire_struct!(VdevDownFixed { vdev_id });
impl FixedParam for VdevDownFixed {
    const TAG: TlvTag = TlvTag::VdevDownCmd;
}

wire_struct!(PeerCreateFixed {
    vdev_id,
    peer_type,
    peer_mac_lo,
    peer_mac_hi,
});
impl FixedParam for PeerCreateFixed {
    const TAG: TlvTag = TlvTag::PeerCreateCmd;
}

wire_struct!(PeerDeleteFixed {
    vdev_id,
    peer_mac_lo,
    peer_mac_hi,
});
impl FixedParam for PeerDeleteFixed {
    const TAG: TlvTag = TlvTag::PeerDeleteCmd;
}

wire_struct!(PeerFlushTidsFixed {
    vdev_id,
    peer_tid_bitmap,
    peer_mac_lo,
    peer_mac_hi,
});
impl FixedParam for PeerFlushTidsFixed {
    const TAG: TlvTag = TlvTag::PeerFlushTidsCmd;
}

wire_struct!(PdevSetParamFixed {
    pdev_id,
    param_id,
    param_value,
});
impl FixedParam for PdevSetParamFixed {
    const TAG: TlvTag = TlvTag::PdevSetParamCmd;
}

wire_struct!(PdevSuspendFixed {
    pdev_id,
    suspend_opt,
});
impl FixedParam for PdevSuspendFixed {
    const TAG: TlvTag = TlvTag::PdevSuspendCmd;
}

wire_struct!(PdevResumeFixed { pdev_id });
impl FixedParam for PdevResumeFixed {
    const TAG: TlvTag = TlvTag::PdevResumeCmd;
}

wire_struct!(ScanStartFixed {
    scan_id,
    scan_req_id,
    vdev_id,
    scan_priority,
    notify_scan_events,
    dwell_time_active,
    dwell_time_passive,
    min_rest_time,
    max_rest_time,
    flags,
});
impl FixedParam for ScanStartFixed {
    const TAG: TlvTag = TlvTag::ScanStartCmd;
}

wire_struct!(ScanStopFixed {
    scan_req_id,
    scan_id,
    req_type,
    vdev_id,
});
impl FixedParam for ScanStopFixed {
    const TAG: TlvTag = TlvTag::ScanStopCmd;
}

wire_struct!(ForceFwHangFixed { hang_type, delay_ms });
impl FixedParam for ForceFwHangFixed {
    const TAG: TlvTag = TlvTag::ForceFwHangCmd;
}

wire_struct!(
    /// Per-band stream configuration, packed as elements of the vdev-create
    /// `ArrayStruct` section.
    TxrxStreamsEntry { band, streams }
);
