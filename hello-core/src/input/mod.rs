//! Input module for hello-core.
//!
//! Responsibilities:
//! - Snapshot the d-pad of controller port 0 once per frame.
//! - Apply that snapshot to the square position, one pixel per direction per poll.

use bitflags::bitflags;
use libretro_sys::{
    DEVICE_ID_JOYPAD_DOWN, DEVICE_ID_JOYPAD_LEFT, DEVICE_ID_JOYPAD_RIGHT, DEVICE_ID_JOYPAD_UP,
    DEVICE_JOYPAD,
};

use crate::abi::{HEIGHT, SQUARE_SIZE, WIDTH};
use crate::host::InputState;

bitflags! {
    #[derive(Default)]
    pub struct DPad: u8 {
        const UP = 0x08;
        const DOWN = 0x04;
        const LEFT = 0x02;
        const RIGHT = 0x01;
    }
}

/// Joypad button ids, in the order they are applied to the square.
const BUTTONS: [(DPad, u32); 4] = [
    (DPad::RIGHT, DEVICE_ID_JOYPAD_RIGHT),
    (DPad::LEFT, DEVICE_ID_JOYPAD_LEFT),
    (DPad::DOWN, DEVICE_ID_JOYPAD_DOWN),
    (DPad::UP, DEVICE_ID_JOYPAD_UP),
];

impl DPad {
    /// Read the four directions of port 0 / joypad / index 0.
    pub fn read(state: &mut dyn InputState) -> Self {
        BUTTONS
            .iter()
            .filter(|(_, id)| state.pressed(0, DEVICE_JOYPAD, 0, *id))
            .fold(DPad::empty(), |acc, (dir, _)| acc | *dir)
    }
}

/// Top-left corner of the square. Always fully on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub x: i32,
    pub y: i32,
}

impl Square {
    pub const MAX_X: i32 = WIDTH as i32 - SQUARE_SIZE;
    pub const MAX_Y: i32 = HEIGHT as i32 - SQUARE_SIZE;

    /// Move one pixel per pressed direction.
    ///
    /// Directions apply in the order right, left, down, up, each clamped on its own.
    /// Pressing right and left together at the right edge therefore ends one pixel
    /// left of it.
    pub fn step(&mut self, dpad: DPad) {
        if dpad.contains(DPad::RIGHT) {
            self.x = (self.x + 1).min(Self::MAX_X);
        }
        if dpad.contains(DPad::LEFT) {
            self.x = (self.x - 1).max(0);
        }
        if dpad.contains(DPad::DOWN) {
            self.y = (self.y + 1).min(Self::MAX_Y);
        }
        if dpad.contains(DPad::UP) {
            self.y = (self.y - 1).max(0);
        }
    }
}
