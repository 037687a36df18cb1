// Licensed under the Apache-2.0 license

//! Session close, debug lock and lifecycle state change

use crate::AdacResult;
use adac_host_command_types::{AdacCommand, AdacStatus};
use adac_host_session::AdacSession;

/// Close the debug session and let the target resume booting.
///
/// Returns the raw response status.
pub fn adac_cmd_resume_boot(session: &mut AdacSession) -> AdacResult<u16> {
    let response = session.execute(AdacCommand::ResumeBoot.into(), &[])?;
    Ok(response.status())
}

/// Ask the target to lock debug access.
///
/// Returns the raw response status. A target without a debug lock answers
/// `UNSUPPORTED`.
pub fn adac_cmd_lock_debug(session: &mut AdacSession) -> AdacResult<u16> {
    let response = session.execute(AdacCommand::LockDebug.into(), &[])?;
    if response.adac_status() == Some(AdacStatus::Success) {
        log::info!("Target is locked");
    }
    Ok(response.status())
}

/// Request a lifecycle state change described by a TLV sequence, possibly
/// empty. Returns the raw response status.
pub fn adac_cmd_lcs_change(session: &mut AdacSession, tlvs: &[u8]) -> AdacResult<u16> {
    let response = session.execute(AdacCommand::LcsChange.into(), tlvs)?;
    Ok(response.status())
}
