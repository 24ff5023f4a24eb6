//! ABI/capability negotiation.
//!
//! Runs once per device bring-up: the service-ready event carries the
//! firmware's protocol version and base capability bitmap, optional
//! service-ready-ext/-ext2 events carry later bitmap generations, and the
//! ready event closes negotiation. No other codec operation is valid until
//! the state is `Ready`; an incompatible version parks the state at
//! `Failed` permanently, which deliberately keeps the device down.

use tracing::{debug, error};

use crate::error::{Result, WmiError};
use crate::events::{ReadyInfo, ServiceReadyInfo};
use crate::services::{Generation, ServiceMap};

/// Host/firmware protocol version pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WmiVersion {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for WmiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Protocol version compiled into this host.
pub const HOST_VERSION: WmiVersion = WmiVersion { major: 1, minor: 6 };

/// Known-compatible firmware versions: `(major, minimum minor)`. Minor skew
/// at or above the listed floor is expected and tolerated; a major not
/// listed here is a hard mismatch. This is an explicit whitelist, not an
/// equality or ordering rule, because compatibility breaks have not been
/// monotonic across firmware lines.
const COMPATIBLE: &[(u32, u32)] = &[(1, 2)];

/// The firmware must share the host's major and clear the whitelist floor
/// for that major. The host version is the one handed to
/// [`Negotiation::new`], so a non-default host build narrows the accept set
/// rather than being ignored.
pub fn versions_compatible(host: WmiVersion, firmware: WmiVersion) -> bool {
    firmware.major == host.major
        && COMPATIBLE
            .iter()
            .any(|&(major, min_minor)| firmware.major == major && firmware.minor >= min_minor)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NegotiationState {
    /// Nothing heard from firmware yet.
    Uninitialized,
    /// Service-ready received and versions verified; later bitmap
    /// generations may still arrive.
    Negotiating,
    /// Terminal success; the capability record is final.
    Ready,
    /// Terminal failure; the device never comes up.
    Failed,
}

/// Per-device negotiation state machine. Single writer during bring-up;
/// read-only once `Ready`.
#[derive(Debug)]
pub struct Negotiation {
    state: NegotiationState,
    host: WmiVersion,
    services: ServiceMap,
}

impl Negotiation {
    pub fn new(host: WmiVersion) -> Self {
        Self {
            state: NegotiationState::Uninitialized,
            host,
            services: ServiceMap::default(),
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == NegotiationState::Ready
    }

    /// The finalized capability record. Callers must gate on readiness
    /// first; before `Ready` the record is still being written.
    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    pub fn on_service_ready(&mut self, info: &ServiceReadyInfo) -> Result<()> {
        if self.state != NegotiationState::Uninitialized {
            return Err(WmiError::MalformedEvent {
                reason: "service-ready in unexpected negotiation state",
                offset: 0,
            });
        }

        if !versions_compatible(self.host, info.fw_version) {
            self.state = NegotiationState::Failed;
            error!(
                host = %self.host,
                firmware = %info.fw_version,
                "firmware ABI incompatible, refusing bring-up"
            );
            return Err(WmiError::VersionIncompatible {
                host: self.host,
                firmware: info.fw_version,
            });
        }

        debug!(
            firmware = %info.fw_version,
            build = info.fw_build_number,
            phys = info.num_phys,
            words = info.service_words.len(),
            "service ready"
        );
        self.services
            .set_generation(Generation::Base, info.service_words.clone());
        self.state = NegotiationState::Negotiating;
        Ok(())
    }

    pub fn on_service_ready_ext(&mut self, words: Vec<u32>) -> Result<()> {
        self.extend(Generation::Ext, words)
    }

    pub fn on_service_ready_ext2(&mut self, words: Vec<u32>) -> Result<()> {
        self.extend(Generation::Ext2, words)
    }

    fn extend(&mut self, generation: Generation, words: Vec<u32>) -> Result<()> {
        if self.state != NegotiationState::Negotiating {
            return Err(WmiError::MalformedEvent {
                reason: "service-ready extension outside negotiation",
                offset: 0,
            });
        }
        debug!(?generation, words = words.len(), "service ready extension");
        self.services.set_generation(generation, words);
        Ok(())
    }

    /// The firmware ready event: the one transition out of `Negotiating`.
    pub fn on_fw_ready(&mut self, info: &ReadyInfo) -> Result<()> {
        if self.state != NegotiationState::Negotiating {
            return Err(WmiError::MalformedEvent {
                reason: "ready event outside negotiation",
                offset: 0,
            });
        }
        debug!(status = info.status, mac = ?info.mac, "firmware ready, negotiation complete");
        self.state = NegotiationState::Ready;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceId;

    fn service_ready(major: u32, minor: u32) -> ServiceReadyInfo {
        ServiceReadyInfo {
            fw_version: WmiVersion { major, minor },
            fw_build_number: 100,
            num_phys: 1,
            service_words: vec![0b11, 0, 0, 0],
        }
    }

    fn ready() -> ReadyInfo {
        ReadyInfo {
            status: 0,
            mac: [2, 0, 0, 0, 0, 1],
            num_total_peers: 32,
        }
    }

    #[test]
    fn happy_path_reaches_ready() {
        let mut n = Negotiation::new(HOST_VERSION);
        n.on_service_ready(&service_ready(1, 6)).unwrap();
        assert_eq!(n.state(), NegotiationState::Negotiating);
        n.on_service_ready_ext(vec![1]).unwrap();
        n.on_fw_ready(&ready()).unwrap();
        assert!(n.is_ready());
        assert!(n.services().is_enabled(ServiceId::ScanOffload));
        assert!(n.services().is_enabled(ServiceId::DualBandSimultaneous));
    }

    #[test]
    fn minor_skew_is_tolerated_major_skew_is_not() {
        assert!(versions_compatible(HOST_VERSION, WmiVersion { major: 1, minor: 2 }));
        assert!(versions_compatible(HOST_VERSION, WmiVersion { major: 1, minor: 9 }));
        assert!(!versions_compatible(HOST_VERSION, WmiVersion { major: 1, minor: 1 }));
        assert!(!versions_compatible(HOST_VERSION, WmiVersion { major: 2, minor: 6 }));
        assert!(!versions_compatible(HOST_VERSION, WmiVersion { major: 0, minor: 6 }));
    }

    #[test]
    fn configured_host_version_narrows_the_accept_set() {
        // A host built against a different major refuses firmware the
        // default host would take.
        let host = WmiVersion { major: 2, minor: 0 };
        assert!(!versions_compatible(host, WmiVersion { major: 1, minor: 6 }));

        let mut n = Negotiation::new(host);
        let err = n.on_service_ready(&service_ready(1, 6)).unwrap_err();
        assert!(matches!(err, WmiError::VersionIncompatible { .. }));
        assert_eq!(n.state(), NegotiationState::Failed);
    }

    #[test]
    fn version_mismatch_is_terminal() {
        let mut n = Negotiation::new(HOST_VERSION);
        let err = n.on_service_ready(&service_ready(2, 0)).unwrap_err();
        assert!(matches!(err, WmiError::VersionIncompatible { .. }));
        assert_eq!(n.state(), NegotiationState::Failed);
        // A compatible retry does not resurrect the device.
        assert!(n.on_service_ready(&service_ready(1, 6)).is_err());
        assert!(!n.is_ready());
    }

    #[test]
    fn extensions_require_negotiating_state() {
        let mut n = Negotiation::new(HOST_VERSION);
        assert!(n.on_service_ready_ext(vec![1]).is_err());
        assert!(n.on_fw_ready(&ready()).is_err());
    }
}
