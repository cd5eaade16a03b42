// Licensed under the Apache-2.0 license

use crate::CSR_SIGNATURE_LEN;
use ftpm_helper_error::{HelperError, HelperResult};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CommandId(pub u32);

impl CommandId {
    pub const PING_NS: Self = Self(0xffff_0001);
    pub const QUERY_SN: Self = Self(0xffff_0002);
    pub const QUERY_ECID: Self = Self(0xffff_0003);
    pub const QUERY_PROV_MODE: Self = Self(0xffff_0004);

    // Certificate retrieval.
    pub const GET_RSA_EK_CERT: Self = Self(0xffff_0005);
    pub const GET_EC_EK_CERT: Self = Self(0xffff_0006);
    pub const GET_SID_CERT: Self = Self(0xffff_0007);
    pub const GET_FW_ID_CERT: Self = Self(0xffff_0008);

    // EK CSR generation and signing.
    pub const GET_RSA_EK_CSR: Self = Self(0xffff_0009);
    pub const GET_EC_EK_CSR: Self = Self(0xffff_000a);
    pub const SIGN_EK_CSR: Self = Self(0xffff_000b);

    /// Online provisioning of the endorsement primary seed.
    pub const INJECT_EPS: Self = Self(0xffff_000c);
}

impl From<u32> for CommandId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CommandId> for u32 {
    fn from(value: CommandId) -> Self {
        value.0
    }
}

impl core::fmt::Debug for CommandId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match HelperCmd::try_from(*self) {
            Ok(cmd) => write!(f, "CommandId({})", cmd.name()),
            Err(_) => write!(f, "CommandId(0x{:08x})", self.0),
        }
    }
}

/// Certificates the helper can release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertKind {
    EkRsa,
    EkEc,
    SiliconId,
    FirmwareId,
}

/// EK key types a CSR can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsrKind {
    EkRsa,
    EkEc,
}

impl TryFrom<CertKind> for CsrKind {
    type Error = HelperError;

    fn try_from(kind: CertKind) -> HelperResult<Self> {
        match kind {
            CertKind::EkRsa => Ok(CsrKind::EkRsa),
            CertKind::EkEc => Ok(CsrKind::EkEc),
            CertKind::SiliconId | CertKind::FirmwareId => Err(HelperError::UNSUPPORTED_KIND),
        }
    }
}

/// Decoded form of a command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperCmd {
    PingNs,
    QuerySn,
    QueryEcid,
    QueryProvMode,
    GetCert(CertKind),
    GetCsr(CsrKind),
    SignEkCsr,
    InjectEps,
}

impl HelperCmd {
    pub fn name(&self) -> &'static str {
        match self {
            HelperCmd::PingNs => "PING_NS",
            HelperCmd::QuerySn => "QUERY_SN",
            HelperCmd::QueryEcid => "QUERY_ECID",
            HelperCmd::QueryProvMode => "QUERY_PROV_MODE",
            HelperCmd::GetCert(CertKind::EkRsa) => "GET_RSA_EK_CERT",
            HelperCmd::GetCert(CertKind::EkEc) => "GET_EC_EK_CERT",
            HelperCmd::GetCert(CertKind::SiliconId) => "GET_SID_CERT",
            HelperCmd::GetCert(CertKind::FirmwareId) => "GET_FW_ID_CERT",
            HelperCmd::GetCsr(CsrKind::EkRsa) => "GET_RSA_EK_CSR",
            HelperCmd::GetCsr(CsrKind::EkEc) => "GET_EC_EK_CSR",
            HelperCmd::SignEkCsr => "SIGN_EK_CSR",
            HelperCmd::InjectEps => "INJECT_EPS",
        }
    }
}

impl TryFrom<CommandId> for HelperCmd {
    type Error = HelperError;

    fn try_from(id: CommandId) -> HelperResult<Self> {
        Ok(match id {
            CommandId::PING_NS => HelperCmd::PingNs,
            CommandId::QUERY_SN => HelperCmd::QuerySn,
            CommandId::QUERY_ECID => HelperCmd::QueryEcid,
            CommandId::QUERY_PROV_MODE => HelperCmd::QueryProvMode,
            CommandId::GET_RSA_EK_CERT => HelperCmd::GetCert(CertKind::EkRsa),
            CommandId::GET_EC_EK_CERT => HelperCmd::GetCert(CertKind::EkEc),
            CommandId::GET_SID_CERT => HelperCmd::GetCert(CertKind::SiliconId),
            CommandId::GET_FW_ID_CERT => HelperCmd::GetCert(CertKind::FirmwareId),
            CommandId::GET_RSA_EK_CSR => HelperCmd::GetCsr(CsrKind::EkRsa),
            CommandId::GET_EC_EK_CSR => HelperCmd::GetCsr(CsrKind::EkEc),
            CommandId::SIGN_EK_CSR => HelperCmd::SignEkCsr,
            CommandId::INJECT_EPS => HelperCmd::InjectEps,
            _ => return Err(HelperError::UNSUPPORTED_COMMAND),
        })
    }
}

impl From<HelperCmd> for CommandId {
    fn from(cmd: HelperCmd) -> Self {
        match cmd {
            HelperCmd::PingNs => CommandId::PING_NS,
            HelperCmd::QuerySn => CommandId::QUERY_SN,
            HelperCmd::QueryEcid => CommandId::QUERY_ECID,
            HelperCmd::QueryProvMode => CommandId::QUERY_PROV_MODE,
            HelperCmd::GetCert(CertKind::EkRsa) => CommandId::GET_RSA_EK_CERT,
            HelperCmd::GetCert(CertKind::EkEc) => CommandId::GET_EC_EK_CERT,
            HelperCmd::GetCert(CertKind::SiliconId) => CommandId::GET_SID_CERT,
            HelperCmd::GetCert(CertKind::FirmwareId) => CommandId::GET_FW_ID_CERT,
            HelperCmd::GetCsr(CsrKind::EkRsa) => CommandId::GET_RSA_EK_CSR,
            HelperCmd::GetCsr(CsrKind::EkEc) => CommandId::GET_EC_EK_CSR,
            HelperCmd::SignEkCsr => CommandId::SIGN_EK_CSR,
            HelperCmd::InjectEps => CommandId::INJECT_EPS,
        }
    }
}

/// Readiness of the normal world, as reported by PING_NS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsState {
    NotReady,
    Ready,
}

impl NsState {
    pub const NOT_READY_VALUE: u32 = 0xff00_0001;
    pub const READY_VALUE: u32 = 0xff00_0002;
}

impl From<NsState> for u32 {
    fn from(state: NsState) -> Self {
        match state {
            NsState::NotReady => NsState::NOT_READY_VALUE,
            NsState::Ready => NsState::READY_VALUE,
        }
    }
}

impl TryFrom<u32> for NsState {
    type Error = HelperError;

    fn try_from(value: u32) -> HelperResult<Self> {
        match value {
            NsState::NOT_READY_VALUE => Ok(NsState::NotReady),
            NsState::READY_VALUE => Ok(NsState::Ready),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningMode {
    Unknown,
    Offline,
    Online,
}

impl ProvisioningMode {
    pub const OFFLINE_VALUE: u32 = 0xff00_000a;
    pub const ONLINE_VALUE: u32 = 0xff00_000b;
    pub const UNKNOWN_VALUE: u32 = 0xff00_000c;
}

impl From<ProvisioningMode> for u32 {
    fn from(mode: ProvisioningMode) -> Self {
        match mode {
            ProvisioningMode::Offline => ProvisioningMode::OFFLINE_VALUE,
            ProvisioningMode::Online => ProvisioningMode::ONLINE_VALUE,
            ProvisioningMode::Unknown => ProvisioningMode::UNKNOWN_VALUE,
        }
    }
}

impl TryFrom<u32> for ProvisioningMode {
    type Error = HelperError;

    fn try_from(value: u32) -> HelperResult<Self> {
        match value {
            ProvisioningMode::OFFLINE_VALUE => Ok(ProvisioningMode::Offline),
            ProvisioningMode::ONLINE_VALUE => Ok(ProvisioningMode::Online),
            ProvisioningMode::UNKNOWN_VALUE => Ok(ProvisioningMode::Unknown),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }
}

/// SIGN_EK_CSR response: a DER ECDSA-Sig-Value, zero padded.
#[repr(C)]
#[derive(Debug, IntoBytes, FromBytes, Immutable, KnownLayout, PartialEq, Eq)]
pub struct EkCsrSignature {
    pub data: [u8; CSR_SIGNATURE_LEN],
}

impl Default for EkCsrSignature {
    fn default() -> Self {
        Self {
            data: [0u8; CSR_SIGNATURE_LEN],
        }
    }
}

impl EkCsrSignature {
    /// Wrap a DER signature. Fails if it does not fit.
    pub fn from_der(der: &[u8]) -> HelperResult<Self> {
        let mut sig = Self::default();
        sig.data
            .get_mut(..der.len())
            .ok_or(HelperError::BUFFER_TOO_SMALL)?
            .copy_from_slice(der);
        Ok(sig)
    }

    /// The DER signature without padding, using the outer SEQUENCE length.
    pub fn der(&self) -> Option<&[u8]> {
        if self.data[0] != 0x30 || self.data[1] & 0x80 != 0 {
            return None;
        }
        self.data.get(..2 + self.data[1] as usize)
    }
}
