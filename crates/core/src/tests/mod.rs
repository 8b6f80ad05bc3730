//! Test support shared with downstream crates (`tests` feature)
