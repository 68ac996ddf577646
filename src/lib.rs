//! macshift: temporary Wi-Fi MAC address changer
//!
//! A library for presenting a different hardware address on a wireless
//! adapter and restoring the original one on every exit path, including
//! interruption.

pub mod command;
pub mod config;
pub mod control;
pub mod network;
pub mod registry;
pub mod restore;
pub mod session;
pub mod time;
