use proptest::prelude::*;

use crate::parser::EventView;
use crate::pdev::{ChipVariant, PdevMap, HOST_PDEV_ID_SOC, TARGET_PDEV_ID_SOC};
use wmi_wire::event::WmiEventId;
use wmi_wire::tlv::{align4, TlvStream, TLV_HDR_SIZE};

const MAX_EVENT_LEN: usize = 512;

fn event_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=MAX_EVENT_LEN)
}

proptest! {
    // The parser either indexes the buffer or returns MalformedEvent; it
    // never panics and never reads outside the buffer, whatever firmware
    // sends.
    #[test]
    fn parse_never_panics_on_arbitrary_bytes(raw in event_bytes_strategy()) {
        let _ = EventView::parse(&raw);
    }

    #[test]
    fn parse_for_never_panics_on_arbitrary_bytes(raw in event_bytes_strategy()) {
        let _ = EventView::parse_for(&raw, WmiEventId::MgmtRx);
        let _ = EventView::parse_for(&raw, WmiEventId::ServiceReady);
    }

    // Every indexed record lies entirely inside the buffer when parsing
    // succeeds.
    #[test]
    fn indexed_records_stay_in_bounds(raw in event_bytes_strategy()) {
        if let Ok(view) = EventView::parse(&raw) {
            for entry in view.index() {
                prop_assert!(entry.payload_off >= TLV_HDR_SIZE);
                prop_assert!(entry.payload_off + entry.len <= raw.len());
            }
        }
    }

    // The raw stream iterator agrees with itself: walking twice yields the
    // same records, and a success walk covers payloads only at aligned
    // strides.
    #[test]
    fn stream_iteration_is_deterministic(raw in event_bytes_strategy()) {
        let a: Vec<_> = TlvStream::new(&raw).collect();
        let b: Vec<_> = TlvStream::new(&raw).collect();
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            match (x, y) {
                (Ok(p), Ok(q)) => {
                    prop_assert_eq!(p.tag, q.tag);
                    prop_assert_eq!(p.payload_off, q.payload_off);
                    prop_assert_eq!(p.len, q.len);
                    prop_assert_eq!(align4(p.len) % 4, 0);
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "walks disagreed"),
            }
        }
    }

    // The translator is total over its table and rejects everything else,
    // in both directions, for both chip variants.
    #[test]
    fn pdev_translation_is_a_partial_bijection(id in 0u32..0x200) {
        for variant in [ChipVariant::SingleRadio, ChipVariant::MultiRadio] {
            let map = PdevMap::new(variant);
            if let Some(target) = map.host_to_target(id) {
                prop_assert_eq!(map.target_to_host(target), Some(id));
            }
            if let Some(host) = map.target_to_host(id) {
                prop_assert_eq!(map.host_to_target(host), Some(id));
            }
        }
    }
}

#[test]
fn soc_ids_translate_on_every_variant() {
    for variant in [ChipVariant::SingleRadio, ChipVariant::MultiRadio] {
        let map = PdevMap::new(variant);
        assert_eq!(map.host_to_target(HOST_PDEV_ID_SOC), Some(TARGET_PDEV_ID_SOC));
        assert_eq!(map.target_to_host(TARGET_PDEV_ID_SOC), Some(HOST_PDEV_ID_SOC));
    }
}
