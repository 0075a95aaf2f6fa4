//! Capabilities shared by field and particle containers.

use crate::error::StagingError;

/// State that may be mirrored in accelerator memory.
///
/// A multi-step call stages everything in once before the first step
/// and out once after the last; the host copy is stale in between and
/// exact at both ends. Host-only containers keep the default no-ops.
pub trait Resident {
    /// Copy host state to the device.
    fn stage_in(&mut self) -> Result<(), StagingError> {
        Ok(())
    }

    /// Copy device state back to the host.
    fn stage_out(&mut self) -> Result<(), StagingError> {
        Ok(())
    }
}
