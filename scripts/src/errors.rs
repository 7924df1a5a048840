//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error parsing an address given as configuration
    InvalidAddress(String),
    /// A deployment tag that no task is registered under
    UnknownTag(String),
    /// No compilation artifact exists for a contract
    ArtifactNotFound(String),
    /// More than one compilation artifact exists for a contract name
    AmbiguousArtifact(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// The initializer call does not match the contract ABI
    InitializerMismatch(String),
    /// Error reading a deployment record
    ReadDeployments(String),
    /// Error writing a deployment record
    WriteDeployments(String),
    /// No deployment record exists for a contract
    DeploymentNotFound(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// The sending account is not allowed to perform an operation
    Unauthorized(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::InvalidAddress(s) => write!(f, "invalid address: {}", s),
            ScriptError::UnknownTag(s) => write!(f, "unknown deployment tag: {}", s),
            ScriptError::ArtifactNotFound(s) => write!(f, "artifact not found: {}", s),
            ScriptError::AmbiguousArtifact(s) => write!(f, "ambiguous artifact: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::InitializerMismatch(s) => write!(f, "initializer mismatch: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::DeploymentNotFound(s) => write!(f, "no deployment found for {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Unauthorized(s) => write!(f, "unauthorized: {}", s),
        }
    }
}

impl Error for ScriptError {}
