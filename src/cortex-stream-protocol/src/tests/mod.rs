//! Unit tests for cortex-stream-protocol.
