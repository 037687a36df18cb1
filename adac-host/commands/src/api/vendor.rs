// Licensed under the Apache-2.0 license

//! Vendor specific commands

use crate::{AdacError, AdacResult};
use adac_host_command_types::is_vendor_command;
use adac_host_session::AdacSession;

/// Response to a vendor command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorResponse {
    pub status: u16,
    pub data: Vec<u8>,
}

/// Send a vendor command (bit 15 of `command` set) with an opaque payload
pub fn adac_cmd_vendor(
    session: &mut AdacSession,
    command: u16,
    payload: &[u8],
) -> AdacResult<VendorResponse> {
    if !is_vendor_command(command) {
        return Err(AdacError::NotVendorCommand(command));
    }

    let response = session.execute(command, payload)?;
    Ok(VendorResponse {
        status: response.status(),
        data: response.data().to_vec(),
    })
}
