//! Physical-device identifier translation.
//!
//! Host code addresses radios with stable indices; firmware uses its own
//! encoding, and the two are related by a finite, chip-dependent table, not
//! a formula. The whole-SoC pseudo-device in particular sits at `0xff` on
//! the host side and `0` on the target side, so no arithmetic relationship
//! may be assumed. Out-of-table inputs return `None`, never a value that
//! could be mistaken for a real index.

/// Host-side index of the whole-SoC pseudo-device.
pub const HOST_PDEV_ID_SOC: u32 = 0xff;

/// Target-side encoding of the whole-SoC pseudo-device.
pub const TARGET_PDEV_ID_SOC: u32 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    HostToTarget,
    TargetToHost,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::HostToTarget => write!(f, "host-to-target"),
            Direction::TargetToHost => write!(f, "target-to-host"),
        }
    }
}

/// Which translation table applies. Firmware for single-radio chips only
/// enumerates one physical device; multi-radio chips enumerate three.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ChipVariant {
    #[default]
    SingleRadio,
    MultiRadio,
}

const SINGLE_RADIO: &[(u32, u32)] = &[(0, 1), (HOST_PDEV_ID_SOC, TARGET_PDEV_ID_SOC)];

const MULTI_RADIO: &[(u32, u32)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (HOST_PDEV_ID_SOC, TARGET_PDEV_ID_SOC),
];

/// Both direction tables for the active chip variant.
#[derive(Debug, Copy, Clone)]
pub struct PdevMap {
    pairs: &'static [(u32, u32)],
}

impl PdevMap {
    pub fn new(variant: ChipVariant) -> Self {
        let pairs = match variant {
            ChipVariant::SingleRadio => SINGLE_RADIO,
            ChipVariant::MultiRadio => MULTI_RADIO,
        };
        Self { pairs }
    }

    pub fn host_to_target(&self, host_id: u32) -> Option<u32> {
        self.pairs
            .iter()
            .find(|&&(h, _)| h == host_id)
            .map(|&(_, t)| t)
    }

    pub fn target_to_host(&self, target_id: u32) -> Option<u32> {
        self.pairs
            .iter()
            .find(|&&(_, t)| t == target_id)
            .map(|&(h, _)| h)
    }

    /// Host indices enumerated by the active table, for callers that iterate
    /// radios.
    pub fn host_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.pairs.iter().map(|&(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soc_pseudo_device_breaks_monotonicity() {
        let map = PdevMap::new(ChipVariant::MultiRadio);
        assert_eq!(map.host_to_target(HOST_PDEV_ID_SOC), Some(TARGET_PDEV_ID_SOC));
        assert_eq!(map.target_to_host(TARGET_PDEV_ID_SOC), Some(HOST_PDEV_ID_SOC));
        assert_eq!(map.host_to_target(0), Some(1));
        assert_eq!(map.host_to_target(2), Some(3));
    }

    #[test]
    fn out_of_table_is_none_in_both_directions() {
        let map = PdevMap::new(ChipVariant::SingleRadio);
        assert_eq!(map.host_to_target(1), None);
        assert_eq!(map.host_to_target(3), None);
        assert_eq!(map.target_to_host(2), None);
        assert_eq!(map.target_to_host(0xff), None);
    }

    #[test]
    fn roundtrip_is_identity_over_the_table() {
        let map = PdevMap::new(ChipVariant::MultiRadio);
        for host_id in map.host_ids() {
            let t = map.host_to_target(host_id).unwrap();
            assert_eq!(map.target_to_host(t), Some(host_id));
        }
    }
}
