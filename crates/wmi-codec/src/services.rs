//! Firmware service capability record.
//!
//! Capabilities arrive as up to three successively introduced bitmap
//! generations. A service identifier resolves through a lookup table to a
//! (generation, bit) pair; bit `N` lives in word `N / 32`, bit `N % 32` of
//! that generation's words. A service is supported only if its generation
//! was actually received during negotiation; absent generations read as
//! unsupported, never as stale or garbage bits.

/// Bitmap generation a service bit belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Generation {
    Base,
    Ext,
    Ext2,
}

/// Abstract service identifiers, stable on the host side. The wire bit
/// position is a property of the firmware generation, looked up below, and
/// deliberately not derivable from the discriminant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ServiceId {
    ScanOffload,
    BeaconOffload,
    StaPowerSave,
    ApPowerSave,
    PeerStats,
    MgmtTxWmi,

    DualBandSimultaneous,
    ExtendedPeerStats,
    TxPowerControl,

    MultiLinkOperation,
    DynamicSpectrumSharing,
}

impl ServiceId {
    pub const ALL: [ServiceId; 11] = [
        ServiceId::ScanOffload,
        ServiceId::BeaconOffload,
        ServiceId::StaPowerSave,
        ServiceId::ApPowerSave,
        ServiceId::PeerStats,
        ServiceId::MgmtTxWmi,
        ServiceId::DualBandSimultaneous,
        ServiceId::ExtendedPeerStats,
        ServiceId::TxPowerControl,
        ServiceId::MultiLinkOperation,
        ServiceId::DynamicSpectrumSharing,
    ];

    /// Wire position of this service's bit.
    pub const fn resolve(self) -> (Generation, u32) {
        match self {
            ServiceId::ScanOffload => (Generation::Base, 0),
            ServiceId::BeaconOffload => (Generation::Base, 1),
            ServiceId::StaPowerSave => (Generation::Base, 4),
            ServiceId::ApPowerSave => (Generation::Base, 5),
            ServiceId::PeerStats => (Generation::Base, 27),
            ServiceId::MgmtTxWmi => (Generation::Base, 38),

            ServiceId::DualBandSimultaneous => (Generation::Ext, 0),
            ServiceId::ExtendedPeerStats => (Generation::Ext, 11),
            ServiceId::TxPowerControl => (Generation::Ext, 33),

            ServiceId::MultiLinkOperation => (Generation::Ext2, 2),
            ServiceId::DynamicSpectrumSharing => (Generation::Ext2, 16),
        }
    }
}

/// The durable capability record. Written once during negotiation, read
/// only thereafter.
#[derive(Debug, Default, Clone)]
pub struct ServiceMap {
    base: Option<Box<[u32]>>,
    ext: Option<Box<[u32]>>,
    ext2: Option<Box<[u32]>>,
}

impl ServiceMap {
    pub(crate) fn set_generation(&mut self, generation: Generation, words: Vec<u32>) {
        let slot = match generation {
            Generation::Base => &mut self.base,
            Generation::Ext => &mut self.ext,
            Generation::Ext2 => &mut self.ext2,
        };
        *slot = Some(words.into_boxed_slice());
    }

    pub fn generation_received(&self, generation: Generation) -> bool {
        match generation {
            Generation::Base => self.base.is_some(),
            Generation::Ext => self.ext.is_some(),
            Generation::Ext2 => self.ext2.is_some(),
        }
    }

    /// Whether firmware advertised `service`. False when the service's
    /// generation was never received or its bit lies beyond the words the
    /// firmware sent.
    pub fn is_enabled(&self, service: ServiceId) -> bool {
        let (generation, bit) = service.resolve();
        let words = match generation {
            Generation::Base => self.base.as_deref(),
            Generation::Ext => self.ext.as_deref(),
            Generation::Ext2 => self.ext2.as_deref(),
        };
        let Some(words) = words else {
            return false;
        };
        let Some(&word) = words.get((bit / 32) as usize) else {
            return false;
        };
        word & (1 << (bit % 32)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bits(bits: &[u32]) -> Vec<u32> {
        let mut words = vec![0u32; 4];
        for &b in bits {
            words[(b / 32) as usize] |= 1 << (b % 32);
        }
        words
    }

    #[test]
    fn bit_resolution_spans_words() {
        let mut map = ServiceMap::default();
        map.set_generation(Generation::Base, with_bits(&[0, 27, 38]));
        assert!(map.is_enabled(ServiceId::ScanOffload));
        assert!(map.is_enabled(ServiceId::PeerStats));
        assert!(map.is_enabled(ServiceId::MgmtTxWmi));
        assert!(!map.is_enabled(ServiceId::BeaconOffload));
    }

    #[test]
    fn absent_generation_reads_as_unsupported() {
        let mut map = ServiceMap::default();
        map.set_generation(Generation::Base, with_bits(&[0, 1]));
        // Ext generation never arrived; every ext/ext2 service is off.
        assert!(!map.is_enabled(ServiceId::DualBandSimultaneous));
        assert!(!map.is_enabled(ServiceId::TxPowerControl));
        assert!(!map.is_enabled(ServiceId::MultiLinkOperation));
        assert!(!map.generation_received(Generation::Ext));
    }

    #[test]
    fn short_word_array_reads_as_unsupported() {
        let mut map = ServiceMap::default();
        // One word only; TxPowerControl (bit 33) lies beyond it.
        map.set_generation(Generation::Ext, vec![u32::MAX]);
        assert!(map.is_enabled(ServiceId::DualBandSimultaneous));
        assert!(!map.is_enabled(ServiceId::TxPowerControl));
    }
}
