pub mod axis_range;
pub mod bit_state;
pub mod chart_bits;
pub mod sync_bit_state;
pub mod tick_mark;
pub mod types;

pub use axis_range::{AxisRange, calculate_new_scale};
pub use bit_state::{BitState, NO_FILTER, StateListener, state_listener};
pub use chart_bits::{AXIS_MASK, ChartBit, DATASET_MASK, KNOWN_MASK, LEGEND_MASK};
pub use sync_bit_state::{SyncBitState, SyncStateListener, sync_state_listener};
pub use tick_mark::TickMark;
pub use types::{AxisId, DataPoint, Insets, Orientation, Rect, Side};
