use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chart_layout::axis::{Axis, AxisConfig};
use chart_layout::core::{Side, SyncBitState, sync_state_listener};
use proptest::prelude::*;

fn side_strategy() -> impl Strategy<Value = Side> {
    prop::sample::select(vec![Side::Left, Side::Right, Side::Top, Side::Bottom])
}

proptest! {
    #[test]
    fn display_position_is_affine_in_the_value(
        min in -10_000.0f64..10_000.0,
        span in 1.0f64..100_000.0,
        length in 1.0f64..4_000.0,
        side in side_strategy(),
        invert in any::<bool>(),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let max = min + span;
        let mut axis = Axis::linear("p")
            .with_side(side)
            .with_config(AxisConfig::fixed(span / 4.0).with_invert(invert));
        prop_assert!(axis.set(min, max));
        if side.is_horizontal() {
            axis.set_layout_size(length, 30.0);
        } else {
            axis.set_layout_size(30.0, length);
        }

        let (va, vb) = (min + a * span, min + b * span);
        let (pa, pb) = (axis.display_position(va), axis.display_position(vb));
        let expected = (vb - va) * axis.scale();
        prop_assert!(((pb - pa) - expected).abs() <= 1e-6 * length.max(1.0));

        let recovered = axis.value_for_display(pa);
        prop_assert!((recovered - va).abs() <= 1e-6 * span.max(1.0));

        let ends = [axis.display_position(min), axis.display_position(max)];
        for end in ends {
            prop_assert!(end >= -1e-6 && end <= length + 1e-6);
        }
    }

    #[test]
    fn sync_state_reports_each_bit_once(bits in prop::collection::vec(0u32..32, 1..64)) {
        let state = SyncBitState::init_clean("prop", !0);
        let seen = Arc::new(AtomicU32::new(0));
        let duplicate = Arc::new(AtomicU32::new(0));
        let (seen_in, duplicate_in) = (Arc::clone(&seen), Arc::clone(&duplicate));
        state.add_change_listener(sync_state_listener(move |_, delta| {
            let previous = seen_in.fetch_or(delta, Ordering::SeqCst);
            duplicate_in.fetch_or(previous & delta, Ordering::SeqCst);
        }));

        let mut expected = 0u32;
        for bit in bits {
            state.set_dirty(1 << bit);
            expected |= 1 << bit;
        }
        prop_assert_eq!(state.bits(), expected);
        prop_assert_eq!(seen.load(Ordering::SeqCst), expected);
        prop_assert_eq!(duplicate.load(Ordering::SeqCst), 0);
    }
}
