//! Sweep enumeration and the frame queue.

pub mod enumerate;
pub mod frame_spec;
pub mod queue;
