// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Compiled contract artifacts.

use std::{fs, path::Path};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    primitives::{keccak256, Bytes, B256},
};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("artifact {0} has no bytecode")]
    EmptyBytecode(String),
    #[error("constructor of {name} expects {expected} arguments, got {got}")]
    ConstructorArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid function signature {0}")]
    Signature(String),
    #[error("function {name} expects {expected} arguments, got {got}")]
    FunctionArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),
}

/// A compiled contract as emitted by the Solidity toolchain.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    #[serde(default)]
    pub deployed_bytecode: Bytes,
}

impl Artifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: display.clone(),
            source,
        })?;
        let artifact: Self = serde_json::from_str(&contents).map_err(|source| {
            ArtifactError::Parse {
                path: display.clone(),
                source,
            }
        })?;
        if artifact.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(display));
        }
        Ok(artifact)
    }

    /// Creation code with ABI-encoded constructor arguments appended.
    ///
    /// Contracts without a declared constructor take no arguments.
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        let mut code = self.bytecode.to_vec();
        match &self.abi.constructor {
            Some(constructor) => {
                if constructor.inputs.len() != args.len() {
                    return Err(ArtifactError::ConstructorArity {
                        name: self.contract_name.clone(),
                        expected: constructor.inputs.len(),
                        got: args.len(),
                    });
                }
                code.extend(constructor.abi_encode_input_raw(args)?);
            }
            None if !args.is_empty() => {
                return Err(ArtifactError::ConstructorArity {
                    name: self.contract_name.clone(),
                    expected: 0,
                    got: args.len(),
                });
            }
            None => {}
        }
        Ok(code.into())
    }

    /// Hash of the runtime code, comparable against `keccak256(eth_getCode)`.
    pub fn code_hash(&self) -> B256 {
        keccak256(&self.deployed_bytecode)
    }
}

/// Encodes a call from a human-readable signature such as `reinitialize(uint64 version)` and
/// string arguments coerced to the parameter types.
pub fn encode_call(signature: &str, args: &[String]) -> Result<Bytes, ArtifactError> {
    let function =
        Function::parse(signature).map_err(|_| ArtifactError::Signature(signature.to_owned()))?;
    if function.inputs.len() != args.len() {
        return Err(ArtifactError::FunctionArity {
            name: function.name.clone(),
            expected: function.inputs.len(),
            got: args.len(),
        });
    }
    let mut values = Vec::with_capacity(args.len());
    for (arg, param) in args.iter().zip(function.inputs.iter()) {
        let ty = param.resolve()?;
        values.push(ty.coerce_str(arg)?);
    }
    Ok(function.abi_encode_input(&values)?.into())
}
