use serde::{Deserialize, Serialize};

/// Named concern tracked by chart, axis and dataset bit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartBit {
    /// Node sizes or placement changed.
    ChartLayout,
    /// The main data canvas needs a repaint.
    ChartCanvas,
    ChartAxes,
    ChartRenderers,
    ChartDataSets,
    ChartLegend,
    ChartPlugins,
    AxisLayout,
    AxisCanvas,
    AxisRange,
    AxisTickLabelText,
    AxisLabelText,
    DataSetData,
    DataSetRange,
    DataSetName,
}

impl ChartBit {
    pub const ALL: [ChartBit; 15] = [
        Self::ChartLayout,
        Self::ChartCanvas,
        Self::ChartAxes,
        Self::ChartRenderers,
        Self::ChartDataSets,
        Self::ChartLegend,
        Self::ChartPlugins,
        Self::AxisLayout,
        Self::AxisCanvas,
        Self::AxisRange,
        Self::AxisTickLabelText,
        Self::AxisLabelText,
        Self::DataSetData,
        Self::DataSetRange,
        Self::DataSetName,
    ];

    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::ChartLayout => 1 << 0,
            Self::ChartCanvas => 1 << 1,
            Self::ChartAxes => 1 << 2,
            Self::ChartRenderers => 1 << 3,
            Self::ChartDataSets => 1 << 4,
            Self::ChartLegend => 1 << 5,
            Self::ChartPlugins => 1 << 6,
            Self::AxisLayout => 1 << 7,
            Self::AxisCanvas => 1 << 8,
            Self::AxisRange => 1 << 9,
            Self::AxisTickLabelText => 1 << 10,
            Self::AxisLabelText => 1 << 11,
            Self::DataSetData => 1 << 12,
            Self::DataSetRange => 1 << 13,
            Self::DataSetName => 1 << 14,
        }
    }

    /// Union of the given bits.
    #[must_use]
    pub const fn mask(bits: &[ChartBit]) -> u32 {
        let mut mask = 0;
        let mut index = 0;
        while index < bits.len() {
            mask |= bits[index].bit();
            index += 1;
        }
        mask
    }
}

/// Every named bit. Unknown bits may still travel through a state, but only
/// these schedule a layout pass.
pub const KNOWN_MASK: u32 = ChartBit::mask(&ChartBit::ALL);

/// Bits that require the legend to be rebuilt.
pub const LEGEND_MASK: u32 = ChartBit::mask(&[
    ChartBit::ChartLegend,
    ChartBit::ChartDataSets,
    ChartBit::ChartRenderers,
]);

/// Everything an axis reports when its range, ticks or labels change.
pub const AXIS_MASK: u32 = ChartBit::mask(&[
    ChartBit::AxisLayout,
    ChartBit::AxisCanvas,
    ChartBit::AxisRange,
    ChartBit::AxisTickLabelText,
    ChartBit::AxisLabelText,
]);

/// Everything a dataset reports on content mutation.
pub const DATASET_MASK: u32 = ChartBit::mask(&[
    ChartBit::DataSetData,
    ChartBit::DataSetRange,
    ChartBit::DataSetName,
]);

#[cfg(test)]
mod tests {
    use super::{AXIS_MASK, ChartBit, DATASET_MASK, KNOWN_MASK, LEGEND_MASK};

    #[test]
    fn bits_are_distinct_single_bits() {
        let mut seen = 0u32;
        for bit in ChartBit::ALL {
            assert_eq!(bit.bit().count_ones(), 1, "{bit:?}");
            assert_eq!(seen & bit.bit(), 0, "{bit:?} reused");
            seen |= bit.bit();
        }
        assert_eq!(seen, KNOWN_MASK);
    }

    #[test]
    fn group_masks_are_disjoint() {
        assert_eq!(AXIS_MASK & DATASET_MASK, 0);
        assert_eq!(LEGEND_MASK & AXIS_MASK, 0);
        assert_eq!(LEGEND_MASK.count_ones(), 3);
    }
}
