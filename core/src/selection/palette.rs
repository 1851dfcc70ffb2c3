//! Group and label colours
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

/// Twenty saturated, grey-free colours with wide hue spacing
pub const COLORS: [&str; 20] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#17becf", "#7f3c8d", "#11a579",
    "#3969ac", "#f2b701", "#e73f74", "#80ba5a", "#e68310",
    "#008695", "#cf1c90", "#f97b72", "#4b4b8f", "#2d6a4f",
];

/// Colour for a palette slot, wrapping around the palette
#[inline]
pub fn color(slot: usize) -> &'static str {
    COLORS[slot % COLORS.len()]
}

/// Colour of selection group `group`. Depends on the group position only.
#[inline]
pub fn group_color(group: usize) -> &'static str {
    color(group)
}

/// Palette slot for a cluster label; negative labels wrap as well
#[inline]
pub fn label_slot(label: i64) -> usize {
    label.rem_euclid(COLORS.len() as i64) as usize
}
