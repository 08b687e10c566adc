//! Cross-module tests over whole frames
//!
//! Unit tests live next to each module; these drive the index and the
//! resolver together on generated scenes.
