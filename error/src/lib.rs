/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Error type and status code mapping shared by the fTPM helper crates.

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::fmt;
use core::num::{NonZeroU32, TryFromIntError};

/// fTPM helper error type
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct HelperError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, tee status, doc) tuples and generates
/// constant definitions for each error code, plus lookups used for
/// diagnostics and for the GlobalPlatform status returned to the caller.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $tee:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: HelperError = HelperError::new_const($value);
        )*

        /// Name of the error constant, or `"UNKNOWN"` for codes not defined here
        pub fn name(&self) -> &'static str {
            $(
                if *self == Self::$name {
                    return stringify!($name);
                }
            )*
            "UNKNOWN"
        }

        /// GlobalPlatform TEE status reported to the normal world for this error
        pub fn tee_status(&self) -> u32 {
            $(
                if *self == Self::$name {
                    return $tee;
                }
            )*
            $crate::tee::TEE_ERROR_GENERIC
        }

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

/// GlobalPlatform TEE Internal Core API status codes
pub mod tee {
    pub const TEE_SUCCESS: u32 = 0x0000_0000;
    pub const TEE_ERROR_GENERIC: u32 = 0xFFFF_0000;
    pub const TEE_ERROR_ACCESS_DENIED: u32 = 0xFFFF_0001;
    pub const TEE_ERROR_BAD_FORMAT: u32 = 0xFFFF_0005;
    pub const TEE_ERROR_BAD_PARAMETERS: u32 = 0xFFFF_0006;
    pub const TEE_ERROR_BAD_STATE: u32 = 0xFFFF_0007;
    pub const TEE_ERROR_ITEM_NOT_FOUND: u32 = 0xFFFF_0008;
    pub const TEE_ERROR_NOT_SUPPORTED: u32 = 0xFFFF_000A;
    pub const TEE_ERROR_SHORT_BUFFER: u32 = 0xFFFF_0010;
    pub const TEE_ERROR_STORAGE_NOT_AVAILABLE: u32 = 0xF010_0003;
}

use tee::*;

impl HelperError {
    /// Create a helper error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a HelperError from a u32 is to
    /// use `HelperError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("HelperError cannot be 0"),
        }
    }

    define_error_constants![
        (
            INVALID_PARAMETERS,
            0x0001_0001,
            TEE_ERROR_BAD_PARAMETERS,
            "Dispatcher Error: Parameter types or buffers do not match the command"
        ),
        (
            UNSUPPORTED_COMMAND,
            0x0001_0002,
            TEE_ERROR_NOT_SUPPORTED,
            "Dispatcher Error: Unknown command identifier"
        ),
        (
            BUFFER_TOO_SMALL,
            0x0001_0003,
            TEE_ERROR_SHORT_BUFFER,
            "Dispatcher Error: Output buffer cannot hold the result"
        ),
        (
            NOT_INITIALIZED,
            0x0002_0001,
            TEE_ERROR_BAD_STATE,
            "State Error: Normal world not ready or provisioning mode not determined"
        ),
        (
            INVALID_MODE,
            0x0002_0002,
            TEE_ERROR_BAD_STATE,
            "State Error: Operation not permitted in the current provisioning mode"
        ),
        (
            ALREADY_PROVISIONED,
            0x0003_0001,
            TEE_ERROR_ACCESS_DENIED,
            "Seed Error: Endorsement primary seed is already provisioned"
        ),
        (
            SEED_NOT_PROVISIONED,
            0x0003_0002,
            TEE_ERROR_ITEM_NOT_FOUND,
            "Seed Error: Endorsement primary seed is not provisioned"
        ),
        (
            STORAGE_FAILURE,
            0x0003_0003,
            TEE_ERROR_STORAGE_NOT_AVAILABLE,
            "Seed Error: Secure storage read or write failed"
        ),
        (
            CORRUPT_SEED_RECORD,
            0x0003_0004,
            TEE_ERROR_BAD_FORMAT,
            "Seed Error: Persisted seed record is malformed"
        ),
        (
            UNSUPPORTED_KIND,
            0x0004_0001,
            TEE_ERROR_NOT_SUPPORTED,
            "Credential Error: Unsupported certificate or CSR kind"
        ),
        (
            SIGNING_KEY_UNAVAILABLE,
            0x0004_0002,
            TEE_ERROR_ITEM_NOT_FOUND,
            "Credential Error: CSR signing key has not been provisioned"
        ),
        (
            INVALID_DIGEST_LENGTH,
            0x0004_0003,
            TEE_ERROR_BAD_PARAMETERS,
            "Credential Error: Digest length does not match SHA-256"
        ),
        (
            CRYPTO_FAILURE,
            0x0004_0004,
            TEE_ERROR_GENERIC,
            "Credential Error: Cryptographic primitive failed"
        ),
        (
            X509_ENCODING,
            0x0004_0005,
            TEE_ERROR_GENERIC,
            "Credential Error: Certificate or CSR exceeds the encoding limits"
        ),
        (
            CONFIG_INVALID,
            0x0005_0001,
            TEE_ERROR_BAD_FORMAT,
            "Config Error: Helper configuration could not be parsed"
        ),
        (
            INTERNAL,
            0x000F_0001,
            TEE_ERROR_GENERIC,
            "Internal error"
        ),
    ];
}

impl fmt::Debug for HelperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HelperError({}, 0x{:08x})", self.name(), self.0.get())
    }
}

impl fmt::Display for HelperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08x})", self.name(), self.0.get())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HelperError {}

impl From<core::num::NonZeroU32> for crate::HelperError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::HelperError(val)
    }
}

impl From<HelperError> for core::num::NonZeroU32 {
    fn from(val: HelperError) -> Self {
        val.0
    }
}

impl From<HelperError> for u32 {
    fn from(val: HelperError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for HelperError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(HelperError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type HelperResult<T> = Result<T, HelperError>;

/// Collapse a command result into the status word returned across the TEE boundary.
pub fn tee_status<T>(result: &HelperResult<T>) -> u32 {
    match result {
        Ok(_) => TEE_SUCCESS,
        Err(e) => e.tee_status(),
    }
}
