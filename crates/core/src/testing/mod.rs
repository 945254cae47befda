//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external collaborator traits, allowing full
//! pipeline tests without rsync or a mounted device.

mod mock_space_probe;
mod mock_transfer;

pub use mock_space_probe::MockSpaceProbe;
pub use mock_transfer::MockTransfer;
