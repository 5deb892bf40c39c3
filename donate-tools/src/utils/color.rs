// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! ANSI colors for terminal output.

use std::fmt::{Debug, Display};

pub const GREY: &str = "\x1b[0;0m\x1b[90m";
pub const LAVENDER: &str = "\x1b[38;5;183;1m";
pub const MINT: &str = "\x1b[38;5;48;1m";
pub const PINK: &str = "\x1b[38;5;161;1m";
pub const RED: &str = "\x1b[31;1m";
pub const CLEAR: &str = "\x1b[0;0m";
pub const YELLOW: &str = "\x1b[33;1m";

pub trait Color {
    fn color(&self, color: &str) -> String;

    fn grey(&self) -> String;
    fn mint(&self) -> String;
    fn pink(&self) -> String;
    fn red(&self) -> String;
    fn yellow(&self) -> String;
}

impl<T: Display> Color for T {
    fn color(&self, color: &str) -> String {
        format!("{color}{self}{CLEAR}")
    }

    fn grey(&self) -> String {
        self.color(GREY)
    }
    fn mint(&self) -> String {
        self.color(MINT)
    }
    fn pink(&self) -> String {
        self.color(PINK)
    }
    fn red(&self) -> String {
        self.color(RED)
    }
    fn yellow(&self) -> String {
        self.color(YELLOW)
    }
}

/// Colors the `Debug` rendering, for values such as hashes and addresses.
pub trait DebugColor {
    fn debug_color(&self, color: &str) -> String;

    fn debug_lavender(&self) -> String;
    fn debug_red(&self) -> String;
}

impl<T: Debug> DebugColor for T {
    fn debug_color(&self, color: &str) -> String {
        format!("{color}{self:?}{CLEAR}")
    }

    fn debug_lavender(&self) -> String {
        self.debug_color(LAVENDER)
    }
    fn debug_red(&self) -> String {
        self.debug_color(RED)
    }
}
