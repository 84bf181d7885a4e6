//! Room membership
//!
//! Rooms are created implicitly by the first join and deleted the moment the
//! last member leaves. Nothing about a room outlives its membership.

mod registry;

pub use registry::{Membership, RoomRegistry};
