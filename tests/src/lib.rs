//! End-to-end checks of next hop resolution and the SYN scan loop against a
//! simulated ethernet segment.

pub mod util;

#[cfg(test)]
mod scan;
