//! Unit tests for bitmap encoding and decoding.
//!
//! These tests verify the byte layout of written files, reproducibility,
//! and that decoding recovers the encoded canvas.
