// Licensed under the Apache-2.0 license

//! Target discovery and cryptosystem negotiation

use crate::{AdacError, AdacResult};
use adac_host_command_types::{
    AdacCommand, AdacStatus, CERT_FORMATS, CRYPTOSYSTEMS, PSA_BINARY_CRT, PSA_BINARY_TOKEN,
    TOKEN_FORMATS,
};
use adac_host_session::AdacSession;
use adac_host_transport::TlvIter;

/// One TLV record of a discovery response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub type_id: u16,
    pub reserved: u16,
    pub value: Vec<u8>,
}

/// Capabilities advertised by the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    raw: Vec<u8>,
    records: Vec<DiscoveryRecord>,
}

fn u16_list(value: &[u8]) -> Vec<u16> {
    value
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect()
}

impl DiscoveryReport {
    /// Parse the TLV sequence of a discovery response.
    ///
    /// Records of unknown type are kept but otherwise ignored.
    pub fn parse(data: &[u8]) -> AdacResult<Self> {
        let mut records = Vec::new();
        for tlv in TlvIter::new(data) {
            let tlv = tlv.map_err(AdacError::Response)?;
            records.push(DiscoveryRecord {
                type_id: tlv.type_id(),
                reserved: tlv.reserved(),
                value: tlv.value().to_vec(),
            });
        }
        Ok(Self {
            raw: data.to_vec(),
            records,
        })
    }

    pub fn records(&self) -> &[DiscoveryRecord] {
        &self.records
    }

    /// Response payload as received
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn find(&self, type_id: u16) -> Option<&DiscoveryRecord> {
        self.records.iter().find(|record| record.type_id == type_id)
    }

    /// Key types listed in the cryptosystems record
    pub fn cryptosystems(&self) -> Option<&[u8]> {
        self.find(CRYPTOSYSTEMS).map(|record| record.value.as_slice())
    }

    pub fn token_formats(&self) -> Option<Vec<u16>> {
        self.find(TOKEN_FORMATS).map(|record| u16_list(&record.value))
    }

    pub fn cert_formats(&self) -> Option<Vec<u16>> {
        self.find(CERT_FORMATS).map(|record| u16_list(&record.value))
    }

    /// Check that the target supports `key_system`
    pub fn check_support(&self, key_system: u8) -> AdacResult<()> {
        check_support(&self.raw, key_system)
    }

    /// Check that the target accepts PSA binary tokens and certificates
    pub fn check_formats(&self) -> AdacResult<()> {
        if !self
            .token_formats()
            .is_some_and(|formats| formats.contains(&PSA_BINARY_TOKEN))
        {
            return Err(AdacError::FormatUnsupported("PSA binary token format"));
        }
        if !self
            .cert_formats()
            .is_some_and(|formats| formats.contains(&PSA_BINARY_CRT))
        {
            return Err(AdacError::FormatUnsupported("PSA binary certificate format"));
        }
        Ok(())
    }

    /// Check that every record leaves its reserved field zero
    pub fn check_reserved(&self) -> AdacResult<()> {
        match self.records.iter().find(|record| record.reserved != 0) {
            Some(record) => Err(AdacError::ReservedNotZero {
                type_id: record.type_id,
                value: record.reserved,
            }),
            None => Ok(()),
        }
    }
}

/// Check a discovery response for support of `key_system`.
///
/// Fails with [`AdacError::CryptosystemListMissing`] if the response has no
/// cryptosystems record and [`AdacError::CryptosystemUnsupported`] if the
/// record does not list `key_system`. The walk stops at the first malformed
/// record.
pub fn check_support(discovery: &[u8], key_system: u8) -> AdacResult<()> {
    let mut listed = None;
    for tlv in TlvIter::new(discovery) {
        let Ok(tlv) = tlv else {
            log::debug!("Discovery response ends with a malformed TLV");
            break;
        };
        if tlv.type_id() == CRYPTOSYSTEMS {
            let found = tlv.value().contains(&key_system);
            listed = Some(listed.unwrap_or(false) || found);
        }
    }

    match listed {
        None => {
            log::error!("Cryptosystem Type ID not specified");
            Err(AdacError::CryptosystemListMissing)
        }
        Some(false) => {
            log::error!("Cryptosystem not supported by target");
            Err(AdacError::CryptosystemUnsupported(key_system))
        }
        Some(true) => {
            log::info!("Cryptosystem supported by target");
            Ok(())
        }
    }
}

/// Ask the target what it supports
pub fn adac_cmd_discovery(session: &mut AdacSession) -> AdacResult<DiscoveryReport> {
    let response = session.execute(AdacCommand::Discovery.into(), &[])?;
    log::info!("Receiving discovery response...");

    if response.adac_status() != Some(AdacStatus::Success) {
        return Err(AdacError::UnexpectedStatus {
            command: AdacCommand::Discovery,
            status: response.status(),
        });
    }

    let report = DiscoveryReport::parse(response.data())?;
    response.release();
    Ok(report)
}
