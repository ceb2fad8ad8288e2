//! Default lowerings of well-known methods into SQL expressions.

pub mod contains;
pub mod conversion;
pub mod like;
pub mod math;
pub mod string;
