//! Shared UI theme constants.

use ratatui::style::Color;

// Terminal-green palette
pub const TEXT: Color = Color::Rgb(0, 255, 65);
pub const DIM: Color = Color::Rgb(0, 143, 17);
pub const ZEBRA: Color = Color::Rgb(10, 30, 14);

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);
