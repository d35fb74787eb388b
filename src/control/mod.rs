//! Belt control: rate estimation, regime classification, speed ramps and
//! the belt controller itself.

pub mod belt;
pub mod ramp;
pub mod rate;
pub mod regime;
