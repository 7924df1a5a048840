//! Loading of compiled contract artifacts.
//!
//! Artifacts are the JSON files a Solidity toolchain writes per contract,
//! holding its ABI and creation bytecode. Both the Hardhat layout
//! (`"bytecode": "0x.."`) and the Foundry layout
//! (`"bytecode": { "object": "0x.." }`) are understood.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
};
use alloy_primitives::Bytes;
use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{JSON_EXTENSION, LIBRARY_PLACEHOLDER_MARKER},
    errors::ScriptError,
    types::InitCall,
};

/// A compiled contract
#[derive(Debug, Clone)]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

/// The on-disk shape of an artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// Present in Hardhat artifacts only
    #[serde(default)]
    contract_name: Option<String>,
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// Creation bytecode, either inline or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat layout
    Hex(String),
    /// Foundry layout
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

impl RawBytecode {
    /// The hex-encoded bytecode
    fn hex(&self) -> &str {
        match self {
            RawBytecode::Hex(s) => s,
            RawBytecode::Object { object } => object,
        }
    }
}

impl Artifact {
    /// Parse an artifact from its JSON contents
    pub fn from_json(name: &str, contents: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;

        let bytecode_hex = raw.bytecode.hex();
        if bytecode_hex.contains(LIBRARY_PLACEHOLDER_MARKER) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name}: bytecode contains unlinked library references"
            )));
        }

        let bytecode = Bytes::from_str(bytecode_hex)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name}: no bytecode, the contract is abstract or an interface"
            )));
        }

        Ok(Self {
            contract_name: raw.contract_name.unwrap_or_else(|| name.to_string()),
            abi: raw.abi,
            bytecode,
        })
    }

    /// ABI-encode the given initializer call, failing if no overload of the
    /// method in the ABI accepts its arguments
    pub fn initializer_calldata(&self, init: &InitCall) -> Result<Bytes, ScriptError> {
        let mismatch = || {
            ScriptError::InitializerMismatch(format!(
                "{} has no method `{}` taking {} addresses",
                self.contract_name,
                init.method_name,
                init.args.len()
            ))
        };

        let args = init.args.iter().copied().map(DynSolValue::Address).collect_vec();
        let overloads = self.abi.function(&init.method_name).ok_or_else(mismatch)?;
        overloads
            .iter()
            .find_map(|function| function.abi_encode_input(&args).ok())
            .map(Bytes::from)
            .ok_or_else(mismatch)
    }
}

/// A directory of compilation artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// The root directory, searched recursively
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact of the named contract.
    ///
    /// The name must identify a single artifact under the root. Dependencies
    /// declaring a contract of the same name make it ambiguous.
    pub fn load(&self, name: &str) -> Result<Artifact, ScriptError> {
        let file_name = format!("{name}.{JSON_EXTENSION}");
        let mut matches = Vec::new();
        find_files(&self.root, &file_name, &mut matches)?;

        let path = match matches.as_slice() {
            [] => {
                return Err(ScriptError::ArtifactNotFound(format!(
                    "{name} under {}",
                    self.root.display()
                )))
            }
            [path] => path,
            paths => {
                return Err(ScriptError::AmbiguousArtifact(format!(
                    "{name} matches {}",
                    paths.iter().map(|path| path.display()).join(", ")
                )))
            }
        };

        debug!("Loading artifact for {} from {}", name, path.display());
        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        Artifact::from_json(name, &contents)
    }
}

/// Collect every file with the given name in a directory tree
fn find_files(
    dir: &Path,
    file_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))? {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|f| f == file_name) {
            matches.push(path);
        }
    }

    // Sorted so that errors list paths in a stable order
    subdirs.sort();
    for subdir in subdirs {
        find_files(&subdir, file_name, matches)?;
    }

    Ok(())
}
