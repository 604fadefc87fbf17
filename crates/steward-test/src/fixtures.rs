//! Test fixtures for principals.

use steward_core::Principal;

/// Deterministic principal derived from a label.
#[must_use]
pub fn principal(label: &str) -> Principal {
    Principal::derive(label)
}

/// Several deterministic principals at once.
#[must_use]
pub fn principals<const N: usize>(labels: [&str; N]) -> [Principal; N] {
    labels.map(Principal::derive)
}

/// Principal whose bytes are all `byte`; handy for readable assertions.
#[must_use]
pub fn principal_of(byte: u8) -> Principal {
    Principal::from_bytes([byte; steward_core::PRINCIPAL_LEN])
}
