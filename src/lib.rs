pub mod cell;
pub mod config;
pub mod events;
pub mod grid;
pub mod io;
pub mod parse_rle;
pub mod pattern;
pub mod render;
pub mod rule_set;
pub mod simulation;

mod parse_util;

pub type ScreenSize = u16;
pub type WorldOffset = i64;
