//! End-to-end tests for the sv360 crates.
//!
//! These tests run whole pipelines: raw frame I/O, unpacking, sphere padding,
//! conversion between projections and packing.
