#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod assignment;
mod medium;
mod contention;

pub use assignment::ChannelAssignment;
pub use medium::{Inbox, Reception, Transmission};
pub use contention::{resolve, ChannelConfig, CollisionPolicy, ReceptionCounters};
