//! Per-device codec context.
//!
//! One [`WmiDevice`] exists per radio co-processor instance and owns all
//! mutable codec state for it: the transport handle, the dispatch table
//! built at attach time, the identifier translation tables for the chip
//! variant, and the negotiation state machine. Nothing here is shared or
//! global; two devices never observe each other.

use tracing::{debug, warn};
use wmi_wire::event::WmiEventId;

use crate::error::{Result, WmiError};
use crate::events::WmiEvent;
use crate::negotiation::{Negotiation, NegotiationState, WmiVersion, HOST_VERSION};
use crate::ops::{attach, Backend, OpArgs, OpCtx, OpId, OpReply, OpTable};
use crate::params::{
    ForceFwHangParams, PdevResumeParams, PdevSetParamParams, PdevSuspendParams, PeerCreateParams,
    PeerDeleteParams, PeerFlushTidsParams, ScanStartParams, ScanStopParams, VdevCreateParams,
    VdevStartParams, VdevUpParams,
};
use crate::pdev::{ChipVariant, PdevMap};
use crate::services::ServiceId;
use crate::transport::WmiTransport;

/// Attach-time configuration. Everything has a sensible default for the
/// current firmware generation on a single-radio chip.
#[derive(Debug, Copy, Clone)]
pub struct WmiConfig {
    pub backend: Backend,
    pub chip: ChipVariant,
    pub host_version: WmiVersion,
}

impl Default for WmiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Tlv,
            chip: ChipVariant::SingleRadio,
            host_version: HOST_VERSION,
        }
    }
}

/// The codec context for one device.
pub struct WmiDevice<T: WmiTransport> {
    transport: T,
    table: OpTable<T>,
    pdev: PdevMap,
    negotiation: Negotiation,
}

impl<T: WmiTransport> WmiDevice<T> {
    pub fn attach(transport: T, config: WmiConfig) -> Self {
        debug!(backend = ?config.backend, chip = ?config.chip, "attaching codec");
        Self {
            transport,
            table: attach(config.backend),
            pdev: PdevMap::new(config.chip),
            negotiation: Negotiation::new(config.host_version),
        }
    }

    pub fn backend(&self) -> Backend {
        self.table.backend()
    }

    pub fn transport_ref(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn negotiation_state(&self) -> NegotiationState {
        self.negotiation.state()
    }

    /// Whether the active backend implements `op` (capability of the
    /// backend, independent of negotiation progress).
    pub fn supports(&self, op: OpId) -> bool {
        self.table.supports(op)
    }

    /// Whether firmware advertised `service`. Meaningless before
    /// negotiation completes, so gated the same way commands are.
    pub fn service_enabled(&self, service: ServiceId) -> Result<bool> {
        self.ensure_ready()?;
        Ok(self.negotiation.services().is_enabled(service))
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.negotiation.is_ready() {
            Ok(())
        } else {
            Err(WmiError::NotReady {
                state: self.negotiation.state(),
            })
        }
    }

    fn dispatch(&mut self, op: OpId, args: OpArgs<'_>) -> Result<OpReply> {
        let f = self.table.get(op);
        let mut ctx = OpCtx {
            transport: &mut self.transport,
            pdev: &self.pdev,
        };
        f(&mut ctx, op, args)
    }

    fn command(&mut self, op: OpId, args: OpArgs<'_>) -> Result<()> {
        debug_assert!(!op.is_extract());
        self.ensure_ready()?;
        self.dispatch(op, args).map(|_| ())
    }

    fn extract(&mut self, op: OpId, raw: &[u8]) -> Result<WmiEvent> {
        debug_assert!(op.is_extract());
        match self.dispatch(op, OpArgs::Event(raw))? {
            OpReply::Event(ev) => Ok(ev),
            // Extract slots only ever produce events.
            OpReply::Sent => Err(WmiError::NotSupported { op }),
        }
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn vdev_create(&mut self, params: &VdevCreateParams) -> Result<()> {
        self.command(OpId::VdevCreate, OpArgs::VdevCreate(params))
    }

    pub fn vdev_delete(&mut self, vdev_id: u32) -> Result<()> {
        self.command(OpId::VdevDelete, OpArgs::VdevDelete { vdev_id })
    }

    pub fn vdev_start(&mut self, params: &VdevStartParams) -> Result<()> {
        self.command(OpId::VdevStart, OpArgs::VdevStart(params))
    }

    pub fn vdev_stop(&mut self, vdev_id: u32) -> Result<()> {
        self.command(OpId::VdevStop, OpArgs::VdevStop { vdev_id })
    }

    pub fn vdev_up(&mut self, params: &VdevUpParams) -> Result<()> {
        self.command(OpId::VdevUp, OpArgs::VdevUp(params))
    }

    pub fn vdev_down(&mut self, vdev_id: u32) -> Result<()> {
        self.command(OpId::VdevDown, OpArgs::VdevDown { vdev_id })
    }

    pub fn peer_create(&mut self, params: &PeerCreateParams) -> Result<()> {
        self.command(OpId::PeerCreate, OpArgs::PeerCreate(params))
    }

    pub fn peer_delete(&mut self, params: &PeerDeleteParams) -> Result<()> {
        self.command(OpId::PeerDelete, OpArgs::PeerDelete(params))
    }

    pub fn peer_flush_tids(&mut self, params: &PeerFlushTidsParams) -> Result<()> {
        self.command(OpId::PeerFlushTids, OpArgs::PeerFlushTids(params))
    }

    pub fn pdev_set_param(&mut self, params: &PdevSetParamParams) -> Result<()> {
        self.command(OpId::PdevSetParam, OpArgs::PdevSetParam(params))
    }

    pub fn pdev_suspend(&mut self, params: &PdevSuspendParams) -> Result<()> {
        self.command(OpId::PdevSuspend, OpArgs::PdevSuspend(params))
    }

    pub fn pdev_resume(&mut self, params: &PdevResumeParams) -> Result<()> {
        self.command(OpId::PdevResume, OpArgs::PdevResume(params))
    }

    pub fn scan_start(&mut self, params: &ScanStartParams) -> Result<()> {
        self.command(OpId::ScanStart, OpArgs::ScanStart(params))
    }

    pub fn scan_stop(&mut self, params: &ScanStopParams) -> Result<()> {
        self.command(OpId::ScanStop, OpArgs::ScanStop(params))
    }

    pub fn force_fw_hang(&mut self, params: &ForceFwHangParams) -> Result<()> {
        self.command(OpId::ForceFwHang, OpArgs::ForceFwHang(params))
    }

    // ---------------------------------------------------------------------
    // Event intake
    // ---------------------------------------------------------------------

    /// Routes one received event buffer. Negotiation events drive the state
    /// machine directly; all other events are refused until negotiation
    /// reaches `Ready`. A malformed buffer is dropped whole, with a log
    /// line, and nothing is extracted from it.
    pub fn handle_event(&mut self, event_id: u32, raw: &[u8]) -> Result<WmiEvent> {
        let Some(id) = WmiEventId::from_u32(event_id) else {
            warn!(event_id, "dropping unrecognized event");
            return Err(WmiError::UnknownEventId { event_id });
        };

        let result = self.route_event(id, raw);
        if let Err(WmiError::MalformedEvent { reason, offset }) = &result {
            warn!(event = ?id, reason, offset, "dropping malformed event");
        }
        result
    }

    fn route_event(&mut self, id: WmiEventId, raw: &[u8]) -> Result<WmiEvent> {
        match id {
            WmiEventId::ServiceReady => {
                let ev = self.extract(OpId::ExtractServiceReady, raw)?;
                if let WmiEvent::ServiceReady(info) = &ev {
                    self.negotiation.on_service_ready(info)?;
                }
                Ok(ev)
            }
            WmiEventId::ServiceReadyExt => {
                let ev = self.extract(OpId::ExtractServiceReadyExt, raw)?;
                if let WmiEvent::ServiceReadyExt { words } = &ev {
                    self.negotiation.on_service_ready_ext(words.clone())?;
                }
                Ok(ev)
            }
            WmiEventId::ServiceReadyExt2 => {
                let ev = self.extract(OpId::ExtractServiceReadyExt2, raw)?;
                if let WmiEvent::ServiceReadyExt2 { words } = &ev {
                    self.negotiation.on_service_ready_ext2(words.clone())?;
                }
                Ok(ev)
            }
            WmiEventId::Ready => {
                let ev = self.extract(OpId::ExtractFwReady, raw)?;
                if let WmiEvent::FwReady(info) = &ev {
                    self.negotiation.on_fw_ready(info)?;
                }
                Ok(ev)
            }
            WmiEventId::VdevStartResponse => {
                self.ensure_ready()?;
                self.extract(OpId::ExtractVdevStartResponse, raw)
            }
            WmiEventId::VdevStopped => {
                self.ensure_ready()?;
                self.extract(OpId::ExtractVdevStopped, raw)
            }
            WmiEventId::PeerDeleteResponse => {
                self.ensure_ready()?;
                self.extract(OpId::ExtractPeerDeleteResponse, raw)
            }
            WmiEventId::ScanEvent => {
                self.ensure_ready()?;
                self.extract(OpId::ExtractScanEvent, raw)
            }
            WmiEventId::MgmtRx => {
                self.ensure_ready()?;
                self.extract(OpId::ExtractMgmtRx, raw)
            }
        }
    }
}
