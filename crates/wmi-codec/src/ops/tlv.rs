//! TLV backend: the current wire encoding.
//!
//! Command slots translate host-space device indices, encode the fixed
//! parameters and declared variable sections, and dispatch through the
//! builder. Extract slots validate the untrusted buffer through
//! [`EventView`] and copy results into host-neutral structs.

use wmi_wire::cmd::{
    ForceFwHangFixed, PdevResumeFixed, PdevSetParamFixed, PdevSuspendFixed, PeerCreateFixed,
    PeerDeleteFixed, PeerFlushTidsFixed, ScanStartFixed, ScanStopFixed, TxrxStreamsEntry,
    VdevCreateFixed, VdevDeleteFixed, VdevDownFixed, VdevStartFixed, VdevStopFixed, VdevUpFixed,
    WireStruct, WmiCmdId,
};
use wmi_wire::event::{
    MgmtRxHdrFixed, PeerDeleteRespFixed, ReadyFixed, ScanEventFixed, ServiceReadyExt2Fixed,
    ServiceReadyExtFixed, ServiceReadyFixed, VdevStartRespFixed, VdevStoppedFixed, WmiEventId,
};
use wmi_wire::{mac_to_words, words_to_mac};

use crate::builder::{build_and_send, pack_elements, VarSection};
use crate::error::{Result, WmiError};
use crate::events::{
    MgmtRxInfo, PeerDeleteResponseInfo, ReadyInfo, ScanEventInfo, ServiceReadyInfo,
    VdevStartResponseInfo, WmiEvent,
};
use crate::negotiation::WmiVersion;
use crate::ops::{OpArgs, OpCtx, OpFn, OpId, OpReply};
use crate::parser::EventView;
use crate::pdev::Direction;
use crate::transport::WmiTransport;

/// Slot lookup for the TLV backend. Every operation is implemented.
pub(super) fn op_fn<T: WmiTransport>(op: OpId) -> Option<OpFn<T>> {
    Some(match op {
        OpId::VdevCreate => vdev_create,
        OpId::VdevDelete => vdev_delete,
        OpId::VdevStart => vdev_start,
        OpId::VdevStop => vdev_stop,
        OpId::VdevUp => vdev_up,
        OpId::VdevDown => vdev_down,
        OpId::PeerCreate => peer_create,
        OpId::PeerDelete => peer_delete,
        OpId::PeerFlushTids => peer_flush_tids,
        OpId::PdevSetParam => pdev_set_param,
        OpId::PdevSuspend => pdev_suspend,
        OpId::PdevResume => pdev_resume,
        OpId::ScanStart => scan_start,
        OpId::ScanStop => scan_stop,
        OpId::ForceFwHang => force_fw_hang,
        OpId::ExtractServiceReady => extract_service_ready,
        OpId::ExtractServiceReadyExt => extract_service_ready_ext,
        OpId::ExtractServiceReadyExt2 => extract_service_ready_ext2,
        OpId::ExtractFwReady => extract_fw_ready,
        OpId::ExtractVdevStartResponse => extract_vdev_start_response,
        OpId::ExtractVdevStopped => extract_vdev_stopped,
        OpId::ExtractPeerDeleteResponse => extract_peer_delete_response,
        OpId::ExtractScanEvent => extract_scan_event,
        OpId::ExtractMgmtRx => extract_mgmt_rx,
    })
}

fn wrong_args(op: OpId) -> WmiError {
    WmiError::NotSupported { op }
}

fn host_pdev_to_target<T: WmiTransport>(ctx: &OpCtx<'_, T>, host_id: u32) -> Result<u32> {
    ctx.pdev
        .host_to_target(host_id)
        .ok_or(WmiError::InvalidDeviceIndex {
            dir: Direction::HostToTarget,
            id: host_id,
        })
}

// -------------------------------------------------------------------------
// Command builders
// -------------------------------------------------------------------------

fn vdev_create<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevCreate(p) = args else {
        return Err(wrong_args(op));
    };
    let pdev_id = host_pdev_to_target(ctx, p.pdev_id)?;
    let (mac_lo, mac_hi) = mac_to_words(p.mac);
    let fixed = VdevCreateFixed {
        vdev_id: p.vdev_id,
        vdev_type: p.vdev_type as u32,
        vdev_subtype: p.vdev_subtype,
        pdev_id,
        mac_lo,
        mac_hi,
    };
    let elems: Vec<TxrxStreamsEntry> = p
        .streams
        .iter()
        .map(|s| TxrxStreamsEntry {
            band: s.band as u32,
            streams: s.streams,
        })
        .collect();
    let packed = pack_elements(&elems);
    build_and_send(
        ctx.transport,
        WmiCmdId::VdevCreate,
        &fixed,
        &[VarSection::Structs {
            elem_size: TxrxStreamsEntry::SIZE_BYTES,
            bytes: &packed,
        }],
    )?;
    Ok(OpReply::Sent)
}

fn vdev_delete<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevDelete { vdev_id } = args else {
        return Err(wrong_args(op));
    };
    build_and_send(
        ctx.transport,
        WmiCmdId::VdevDelete,
        &VdevDeleteFixed { vdev_id },
        &[],
    )?;
    Ok(OpReply::Sent)
}

fn vdev_start<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevStart(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = VdevStartFixed {
        vdev_id: p.vdev_id,
        beacon_interval: p.beacon_interval,
        dtim_period: p.dtim_period,
        flags: p.flags,
        channel_freq_mhz: p.channel_freq_mhz,
    };
    build_and_send(ctx.transport, WmiCmdId::VdevStart, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn vdev_stop<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevStop { vdev_id } = args else {
        return Err(wrong_args(op));
    };
    build_and_send(
        ctx.transport,
        WmiCmdId::VdevStop,
        &VdevStopFixed { vdev_id },
        &[],
    )?;
    Ok(OpReply::Sent)
}

fn vdev_up<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevUp(p) = args else {
        return Err(wrong_args(op));
    };
    let (bssid_lo, bssid_hi) = mac_to_words(p.bssid);
    let fixed = VdevUpFixed {
        vdev_id: p.vdev_id,
        assoc_id: p.assoc_id,
        bssid_lo,
        bssid_hi,
    };
    build_and_send(ctx.transport, WmiCmdId::VdevUp, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn vdev_down<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::VdevDown { vdev_id } = args else {
        return Err(wrong_args(op));
    };
    build_and_send(
        ctx.transport,
        WmiCmdId::VdevDown,
        &VdevDownFixed { vdev_id },
        &[],
    )?;
    Ok(OpReply::Sent)
}

fn peer_create<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PeerCreate(p) = args else {
        return Err(wrong_args(op));
    };
    let (peer_mac_lo, peer_mac_hi) = mac_to_words(p.peer_mac);
    let fixed = PeerCreateFixed {
        vdev_id: p.vdev_id,
        peer_type: p.peer_type,
        peer_mac_lo,
        peer_mac_hi,
    };
    build_and_send(ctx.transport, WmiCmdId::PeerCreate, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn peer_delete<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PeerDelete(p) = args else {
        return Err(wrong_args(op));
    };
    let (peer_mac_lo, peer_mac_hi) = mac_to_words(p.peer_mac);
    let fixed = PeerDeleteFixed {
        vdev_id: p.vdev_id,
        peer_mac_lo,
        peer_mac_hi,
    };
    build_and_send(ctx.transport, WmiCmdId::PeerDelete, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn peer_flush_tids<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PeerFlushTids(p) = args else {
        return Err(wrong_args(op));
    };
    let (peer_mac_lo, peer_mac_hi) = mac_to_words(p.peer_mac);
    let fixed = PeerFlushTidsFixed {
        vdev_id: p.vdev_id,
        peer_tid_bitmap: p.peer_tid_bitmap,
        peer_mac_lo,
        peer_mac_hi,
    };
    build_and_send(ctx.transport, WmiCmdId::PeerFlushTids, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn pdev_set_param<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PdevSetParam(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = PdevSetParamFixed {
        pdev_id: host_pdev_to_target(ctx, p.pdev_id)?,
        param_id: p.param_id,
        param_value: p.param_value,
    };
    build_and_send(ctx.transport, WmiCmdId::PdevSetParam, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn pdev_suspend<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PdevSuspend(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = PdevSuspendFixed {
        pdev_id: host_pdev_to_target(ctx, p.pdev_id)?,
        suspend_opt: p.suspend_opt,
    };
    build_and_send(ctx.transport, WmiCmdId::PdevSuspend, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn pdev_resume<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::PdevResume(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = PdevResumeFixed {
        pdev_id: host_pdev_to_target(ctx, p.pdev_id)?,
    };
    build_and_send(ctx.transport, WmiCmdId::PdevResume, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn scan_start<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::ScanStart(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = ScanStartFixed {
        scan_id: p.scan_id,
        scan_req_id: p.scan_req_id,
        vdev_id: p.vdev_id,
        scan_priority: p.scan_priority,
        notify_scan_events: p.notify_scan_events,
        dwell_time_active: p.dwell_time_active,
        dwell_time_passive: p.dwell_time_passive,
        min_rest_time: p.min_rest_time,
        max_rest_time: p.max_rest_time,
        flags: p.flags.bits(),
    };
    // Both sections are always declared, even when empty: the channel list
    // first, then the extra-IE bytes.
    build_and_send(
        ctx.transport,
        WmiCmdId::ScanStart,
        &fixed,
        &[
            VarSection::Words(&p.chan_list),
            VarSection::Bytes(&p.ie_data),
        ],
    )?;
    Ok(OpReply::Sent)
}

fn scan_stop<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::ScanStop(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = ScanStopFixed {
        scan_req_id: p.scan_req_id,
        scan_id: p.scan_id,
        req_type: p.req_type,
        vdev_id: p.vdev_id,
    };
    build_and_send(ctx.transport, WmiCmdId::ScanStop, &fixed, &[])?;
    Ok(OpReply::Sent)
}

fn force_fw_hang<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let OpArgs::ForceFwHang(p) = args else {
        return Err(wrong_args(op));
    };
    let fixed = ForceFwHangFixed {
        hang_type: p.hang_type,
        delay_ms: p.delay_ms,
    };
    build_and_send(ctx.transport, WmiCmdId::ForceFwHang, &fixed, &[])?;
    Ok(OpReply::Sent)
}

// -------------------------------------------------------------------------
// Event extractors
// -------------------------------------------------------------------------

fn event_bytes<'a>(op: OpId, args: OpArgs<'a>) -> Result<&'a [u8]> {
    match args {
        OpArgs::Event(raw) => Ok(raw),
        _ => Err(wrong_args(op)),
    }
}

fn extract_service_ready<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::ServiceReady)?;
    let fixed: ServiceReadyFixed = view.fixed()?;
    let service_words = view.u32_array(0)?;
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

fn extract_service_ready_ext<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::ServiceReadyExt)?;
    let _fixed: ServiceReadyExtFixed = view.fixed()?;
    let words = view.u32_array(0)?;
    Ok(OpReply::Event(WmiEvent::ServiceReadyExt { words }))
}

fn extract_service_ready_ext2<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::ServiceReadyExt2)?;
    let _fixed: ServiceReadyExt2Fixed = view.fixed()?;
    let words = view.u32_array(0)?;
    Ok(OpReply::Event(WmiEvent::ServiceReadyExt2 { words }))
}

fn extract_fw_ready<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::Ready)?;
    let fixed: ReadyFixed = view.fixed()?;
    Ok(OpReply::Event(WmiEvent::FwReady(ReadyInfo {
        status: fixed.status,
        mac: words_to_mac(fixed.mac_lo, fixed.mac_hi),
        num_total_peers: fixed.num_total_peers,
    })))
}

fn extract_vdev_start_response<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::VdevStartResponse)?;
    let fixed: VdevStartRespFixed = view.fixed()?;
    Ok(OpReply::Event(WmiEvent::VdevStartResponse(
        VdevStartResponseInfo {
            vdev_id: fixed.vdev_id,
            requestor_id: fixed.requestor_id,
            resp_type: fixed.resp_type,
            status: fixed.status,
        },
    )))
}

fn extract_vdev_stopped<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::VdevStopped)?;
    let fixed: VdevStoppedFixed = view.fixed()?;
    Ok(OpReply::Event(WmiEvent::VdevStopped {
        vdev_id: fixed.vdev_id,
    }))
}

fn extract_peer_delete_response<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::PeerDeleteResponse)?;
    let fixed: PeerDeleteRespFixed = view.fixed()?;
    Ok(OpReply::Event(WmiEvent::PeerDeleteResponse(
        PeerDeleteResponseInfo {
            vdev_id: fixed.vdev_id,
            peer_mac: words_to_mac(fixed.peer_mac_lo, fixed.peer_mac_hi),
        },
    )))
}

fn extract_scan_event<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::ScanEvent)?;
    let fixed: ScanEventFixed = view.fixed()?;
    Ok(OpReply::Event(WmiEvent::Scan(ScanEventInfo {
        event_type: fixed.event_type,
        reason: fixed.reason,
        channel_freq: fixed.channel_freq,
        scan_req_id: fixed.scan_req_id,
        scan_id: fixed.scan_id,
        vdev_id: fixed.vdev_id,
    })))
}

fn extract_mgmt_rx<T: WmiTransport>(
    ctx: &mut OpCtx<'_, T>,
    op: OpId,
    args: OpArgs<'_>,
) -> Result<OpReply> {
    let raw = event_bytes(op, args)?;
    let view = EventView::parse_for(raw, WmiEventId::MgmtRx)?;
    let fixed: MgmtRxHdrFixed = view.fixed()?;
    let frame = view.byte_array(0)?;

    // The header's buf_len duplicates the frame section's declared length.
    // The TLV header is authoritative; an inconsistent pair means a
    // firmware bug and the event is rejected rather than either length
    // trusted.
    if fixed.buf_len as usize != frame.len() {
        return Err(WmiError::MalformedEvent {
            reason: "mgmt-rx buf_len disagrees with frame TLV length",
            offset: 0,
        });
    }

    // An event naming a physical device this chip does not have is firmware
    // data we refuse, not a host config error.
    let pdev_id = ctx
        .pdev
        .target_to_host(fixed.pdev_id)
        .ok_or(WmiError::MalformedEvent {
            reason: "mgmt-rx pdev id outside translation table",
            offset: 0,
        })?;

    Ok(OpReply::Event(WmiEvent::MgmtRx(MgmtRxInfo {
        pdev_id,
        channel_freq: fixed.channel_freq,
        snr: fixed.snr,
        rate: fixed.rate,
        phy_mode: fixed.phy_mode,
        status: fixed.status,
        frame: frame.to_vec(),
    })))
}
