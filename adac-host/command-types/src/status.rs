// Licensed under the Apache-2.0 license

//! PSA Status Codes
//!
//! Local status values reported for failures that never travel on the wire

/// PSA status code
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsaStatus {
    Success = 0,
    GenericError = -132,
    NotPermitted = -133,
    NotSupported = -134,
    InvalidArgument = -135,
    DoesNotExist = -140,
    CommunicationFailure = -145,
}

impl PsaStatus {
    pub fn is_success(self) -> bool {
        self == PsaStatus::Success
    }
}

impl core::fmt::Display for PsaStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PsaStatus::Success => "PSA_SUCCESS",
            PsaStatus::GenericError => "PSA_ERROR_GENERIC_ERROR",
            PsaStatus::NotPermitted => "PSA_ERROR_NOT_PERMITTED",
            PsaStatus::NotSupported => "PSA_ERROR_NOT_SUPPORTED",
            PsaStatus::InvalidArgument => "PSA_ERROR_INVALID_ARGUMENT",
            PsaStatus::DoesNotExist => "PSA_ERROR_DOES_NOT_EXIST",
            PsaStatus::CommunicationFailure => "PSA_ERROR_COMMUNICATION_FAILURE",
        };
        write!(f, "{} ({})", name, *self as i32)
    }
}
