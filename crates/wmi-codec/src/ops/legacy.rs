//! Legacy backend: the pre-TLV fixed-offset encoding.
//!
//! Older firmware takes commands as a bare parameter struct with no record
//! headers. Only a small maintenance subset is carried for that generation;
//! every other slot stays on the stub and reports `NotSupported`.

use tracing::trace;
use wmi_wire::cmd::{
    ForceFwHangFixed, PdevSetParamFixed, VdevCreateFixed, VdevDeleteFixed, WireStruct, WmiCmdId,
};
use wmi_wire::event::{ReadyFixed, ServiceReadyFixed};
use wmi_wire::{mac_to_words, words_to_mac};

use crate::error::{Result, WmiError};
use crate::events::{ReadyInfo, ServiceReadyInfo, WmiEvent};
use crate::negotiation::WmiVersion;
use crate::ops::{OpArgs, OpCtx, OpFn, OpId, OpReply};
use crate::pdev::Direction;
use crate::transport::WmiTransport;

/// Slot lookup for the legacy backend. Beyond the maintenance command
/// subset, only the two bring-up events decode; no other slot resolves.
pub(super) fn op_fn<T: WmiTransport>(op: OpId) -> Option<OpFn<T>> {
    match op {
        OpId::VdevCreate => Some(vdev_create),
        OpId::VdevDelete => Some(vdev_delete),
        OpId::PdevSetParam => Some(pdev_set_param),
        OpId::ForceFwHang => Some(force_fw_hang),
        OpId::ExtractServiceReady => Some(extract_service_ready),
        OpId::ExtractFwReady => Some(extract_fw_ready),
        _ => None,
    }
}

/// Encodes `fixed` at offset zero with no headers and hands the buffer to
/// the transport. A rejected send frees the buffer here.
fn send_fixed<T: WmiTransport, P: WireStruct>(
    ctx: &mut OpCtx<'_, T>,
    cmd_id: WmiCmdId,
    fixed: &P,
) -> Result<OpReply> {
    let len = P::SIZE_BYTES;
    let mut buf = ctx
        .transport
        .alloc(len)
        .ok_or(WmiError::AllocationFailed { len })?;
    fixed.encode(&mut buf.as_mut_slice()[..len]);
    trace!(cmd = ?cmd_id, len, "sending fixed-offset command");
    match ctx.transport.send(buf, len, cmd_id) {
        Ok(()) => Ok(OpReply::Sent),
        Err(rejected) => {
            drop(rejected.buf);
            Err(WmiError::TransportReject(rejected.reason))
        }
    }
}

fn vdev_create<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevCreate(p) = args else {
        return Err(WmiError::NotSupported { op });
    };
    let pdev_id = ctx
        .pdev
        .host_to_target(p.pdev_id)
        .ok_or(WmiError::InvalidDeviceIndex {
            dir: Direction::HostToTarget,
            id: p.pdev_id,
        })?;
    let (mac_lo, mac_hi) = mac_to_words(p.mac);
    // The per-band stream list has no fixed-offset representation and is
    // silently absent on this generation.
    let fixed = VdevCreateFixed {
        vdev_id: p.vdev_id,
        vdev_type: p.vdev_type as u32,
        vdev_subtype: p.vdev_subtype,
        pdev_id,
        mac_lo,
        mac_hi,
    };
    send_fixed(ctx, WmiCmdId::VdevCreate, &fixed)
}

fn vdev_delete<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevDelete { vdev_id } = args else {
        return Err(WmiError::NotSupported { op });
    };
    send_fixed(ctx, WmiCmdId::VdevDelete, &VdevDeleteFixed { vdev_id })
}

fn pdev_set_param<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PdevSetParam(p) = args else {
        return Err(WmiError::NotSupported { op });
    };
    let pdev_id = ctx
        .pdev
        .host_to_target(p.pdev_id)
        .ok_or(WmiError::InvalidDeviceIndex {
            dir: Direction::HostToTarget,
            id: p.pdev_id,
        })?;
    let fixed = PdevSetParamFixed {
        pdev_id,
        param_id: p.param_id,
        param_value: p.param_value,
    };
    send_fixed(ctx, WmiCmdId::PdevSetParam, &fixed)
}

/// Legacy bring-up events have no record headers either: the fixed struct
/// sits at offset zero, and for service-ready the capability bitmap words
/// run from its end to the end of the buffer.
fn extract_service_ready<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::Event(raw) = args else {
        return Err(WmiError::NotSupported { op });
    };
    let fixed_len = ServiceReadyFixed::SIZE_BYTES;
    let fixed = raw
        .get(..fixed_len)
        .and_then(ServiceReadyFixed::decode)
        .ok_or(WmiError::MalformedEvent {
            reason: "service-ready shorter than its fixed parameters",
            offset: 0,
        })?;
    let tail = &raw[fixed_len..];
    if tail.len() % 4 != 0 {
        return Err(WmiError::MalformedEvent {
            reason: "service bitmap is not a whole number of words",
            offset: fixed_len,
        });
    }
    let service_words = tail
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(OpReply::Event(WmiEvent::ServiceReady(ServiceReadyInfo {
        fw_version: WmiVersion {
            major: fixed.abi_major,
            minor: fixed.abi_minor,
        },
        fw_build_number: fixed.fw_build_number,
        num_phys: fixed.num_phys,
        service_words,
    })))
}

fn extract_fw_ready<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::Event(raw) = args else {
        return Err(WmiError::NotSupported { op });
    };
    let fixed = raw
        .get(..ReadyFixed::SIZE_BYTES)
        .and_then(ReadyFixed::decode)
        .ok_or(WmiError::MalformedEvent {
            reason: "ready event shorter than its fixed parameters",
            offset: 0,
        })?;
    Ok(OpReply::Event(WmiEvent::FwReady(ReadyInfo {
        status: fixed.status,
        mac: words_to_mac(fixed.mac_lo, fixed.mac_hi),
        num_total_peers: fixed.num_total_peers,
    })))
}

fn force_fw_hang<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::ForceFwHang(p) = args else {
        return Err(WmiError::NotSupported { op });
    };
    let fixed = ForceFwHangFixed {
        hang_type: p.hang_type,
        delay_ms: p.delay_ms,
    };
    send_fixed(ctx, WmiCmdId::ForceFwHang, &fixed)
}
