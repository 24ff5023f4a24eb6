//! Capability dispatch table.
//!
//! The protocol has two incompatible wire encodings (the current TLV one
//! and a legacy fixed-offset one). Rather than branching on encoding inside
//! every command builder, each backend implements the operations it has and
//! `attach` populates one table slot per abstract operation at bring-up.
//! Callers dispatch through the table and never name a backend; slots a
//! backend lacks hold the `NotSupported` stub, never a hole, so dispatch is
//! total. The table is immutable after `attach` and needs no locking.

mod legacy;
mod tlv;

use crate::error::{Result, WmiError};
use crate::events::WmiEvent;
use crate::params::{
    ForceFwHangParams, PdevResumeParams, PdevSetParamParams, PdevSuspendParams, PeerCreateParams,
    PeerDeleteParams, PeerFlushTidsParams, ScanStartParams, ScanStopParams, VdevCreateParams,
    VdevStartParams, VdevUpParams,
};
use crate::pdev::PdevMap;
use crate::transport::WmiTransport;

/// Which backend `attach` wires into the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Tlv,
    Legacy,
}

/// Abstract operation identifiers: one per dispatch-table slot.
#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpId {
    VdevCreate,
    VdevDelete,
    VdevStart,
    VdevStop,
    VdevUp,
    VdevDown,
    PeerCreate,
    PeerDelete,
    PeerFlushTids,
    PdevSetParam,
    PdevSuspend,
    PdevResume,
    ScanStart,
    ScanStop,
    ForceFwHang,

    ExtractServiceReady,
    ExtractServiceReadyExt,
    ExtractServiceReadyExt2,
    ExtractFwReady,
    ExtractVdevStartResponse,
    ExtractVdevStopped,
    ExtractPeerDeleteResponse,
    ExtractScanEvent,
    ExtractMgmtRx,
}

impl OpId {
    pub const COUNT: usize = Self::ALL.len();

    pub const ALL: [OpId; 24] = [
        OpId::VdevCreate,
        OpId::VdevDelete,
        OpId::VdevStart,
        OpId::VdevStop,
        OpId::VdevUp,
        OpId::VdevDown,
        OpId::PeerCreate,
        OpId::PeerDelete,
        OpId::PeerFlushTids,
        OpId::PdevSetParam,
        OpId::PdevSuspend,
        OpId::PdevResume,
        OpId::ScanStart,
        OpId::ScanStop,
        OpId::ForceFwHang,
        OpId::ExtractServiceReady,
        OpId::ExtractServiceReadyExt,
        OpId::ExtractServiceReadyExt2,
        OpId::ExtractFwReady,
        OpId::ExtractVdevStartResponse,
        OpId::ExtractVdevStopped,
        OpId::ExtractPeerDeleteResponse,
        OpId::ExtractScanEvent,
        OpId::ExtractMgmtRx,
    ];

    pub const fn is_extract(self) -> bool {
        (self as usize) >= (OpId::ExtractServiceReady as usize)
    }
}

/// Argument bundle handed through a table slot. Command slots take their
/// typed parameters; extract slots take the borrowed raw event bytes.
pub enum OpArgs<'a> {
    VdevCreate(&'a VdevCreateParams),
    VdevDelete { vdev_id: u32 },
    VdevStart(&'a VdevStartParams),
    VdevStop { vdev_id: u32 },
    VdevUp(&'a VdevUpParams),
    VdevDown { vdev_id: u32 },
    PeerCreate(&'a PeerCreateParams),
    PeerDelete(&'a PeerDeleteParams),
    PeerFlushTids(&'a PeerFlushTidsParams),
    PdevSetParam(&'a PdevSetParamParams),
    PdevSuspend(&'a PdevSuspendParams),
    PdevResume(&'a PdevResumeParams),
    ScanStart(&'a ScanStartParams),
    ScanStop(&'a ScanStopParams),
    ForceFwHang(&'a ForceFwHangParams),
    Event(&'a [u8]),
}

/// What a slot produces: nothing for a dispatched command, a decoded owned
/// event for an extractor.
#[derive(Debug)]
pub enum OpReply {
    Sent,
    Event(WmiEvent),
}

/// Everything a slot may touch: the transport for sends and the identifier
/// translation tables. Capability state deliberately stays outside; gating
/// happens in the device context before dispatch.
pub struct OpCtx<'a, T: WmiTransport> {
    pub transport: &'a mut T,
    pub pdev: &'a PdevMap,
}

pub type OpFn<T> = fn(&mut OpCtx<'_, T>, OpId, OpArgs<'_>) -> Result<OpReply>;

/// The stub populating every slot the selected backend lacks. Also the
/// answer when a slot is invoked with the wrong argument bundle, which is a
/// caller bug and must not reach the wire.
fn not_supported<T: WmiTransport>(
    _ctx: &mut OpCtx<'_, T>,
    op: OpId,
    _args: OpArgs<'_>,
) -> Result<OpReply> {
    Err(WmiError::NotSupported { op })
}

/// The dispatch table. Built once by [`attach`]; read-only afterwards.
pub struct OpTable<T: WmiTransport> {
    slots: [OpFn<T>; OpId::COUNT],
    supported: [bool; OpId::COUNT],
    backend: Backend,
}

impl<T: WmiTransport> OpTable<T> {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn get(&self, op: OpId) -> OpFn<T> {
        self.slots[op as usize]
    }

    /// Whether the active backend has a real implementation (not the stub)
    /// behind `op`.
    pub fn supports(&self, op: OpId) -> bool {
        self.supported[op as usize]
    }
}

/// Populates every slot for the selected backend. No slot is ever left
/// empty: lookups cannot fault, only return `NotSupported`.
pub fn attach<T: WmiTransport>(backend: Backend) -> OpTable<T> {
    let mut slots: [OpFn<T>; OpId::COUNT] = [not_supported::<T>; OpId::COUNT];
    let mut supported = [false; OpId::COUNT];
    for op in OpId::ALL {
        let slot = match backend {
            Backend::Tlv => tlv::op_fn::<T>(op),
            Backend::Legacy => legacy::op_fn::<T>(op),
        };
        if let Some(f) = slot {
            slots[op as usize] = f;
            supported[op as usize] = true;
        }
    }
    OpTable {
        slots,
        supported,
        backend,
    }
}
