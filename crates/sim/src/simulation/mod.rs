// This file is part of Warden.
//
// Warden is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Warden is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Warden.
// If not, see https://www.gnu.org/licenses/.

use std::collections::HashMap;

use alloy_primitives::{Address, B256};
use strum::{Display, EnumString};
use warden_provider::{BlockId, ProviderError};
use warden_types::{Timestamp, UserOperationVariant, ValidationOutput, ValidationRevert};

mod validator;
pub use validator::Validator;

/// Storage slots per contract touched during validation.
pub type StorageMap = HashMap<Address, HashMap<B256, B256>>;

/// Code hashes of the contracts a validation run touched, used by tracing
/// validators to detect code changes between simulation and inclusion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReferencedCodeHashes {
    /// Addresses of all referenced contracts
    pub addresses: Vec<Address>,
    /// Combined hash of their code
    pub hash: B256,
}

/// Admission record for a validated user operation.
#[derive(Clone, Debug, Default)]
pub struct SimulationResult {
    /// Normalized EntryPoint validation output
    pub validation: ValidationOutput,
    /// Verification gas limit derived from the simulation
    pub verification_gas_limit: u128,
    /// Call gas limit derived from the simulation
    pub call_gas_limit: u128,
    /// Storage touched during validation; empty here, populated only by
    /// tracing validators
    pub storage_map: StorageMap,
    /// Referenced contract code hashes; populated only by tracing
    /// validators
    pub referenced_contracts: Option<ReferencedCodeHashes>,
}

/// API compatibility level for admission policy.
#[derive(Copy, Clone, Debug, Default, Display, EnumString, Eq, PartialEq)]
pub enum ApiVersion {
    /// Legacy level: no pre-verification gas enforcement
    #[strum(serialize = "v1")]
    V1,
    /// Current level
    #[default]
    #[strum(serialize = "v2")]
    V2,
}

/// Validation policy settings.
#[derive(Clone, Copy, Debug)]
pub struct SimulationSettings {
    /// API compatibility level
    pub api_version: ApiVersion,
    /// Disables the time-validity window checks
    pub disable_expiration_check: bool,
    /// Gas limit for `simulateValidation` calls
    pub max_validation_gas: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::default(),
            disable_expiration_check: false,
            max_validation_gas: 10_000_000,
        }
    }
}

/// Errors produced while deciding admission of a user operation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The on-chain simulation rejected the operation
    #[error("{0}")]
    SimulateValidation(String),
    /// Account or paymaster signature check failed
    #[error("{0}")]
    InvalidSignature(String),
    /// The validity window is too narrow or starts in the future
    #[error("User operation expires too soon: validAfter {valid_after}, validUntil {valid_until}, now {now}")]
    ExpiresShortly {
        /// Start of the window
        valid_after: Timestamp,
        /// End of the window
        valid_until: Timestamp,
        /// The clock the check ran against
        now: Timestamp,
    },
    /// The operation reverted while retrieving an execution result
    #[error("{0}")]
    UserOperationReverted(String),
    /// Transport or decode failure below the policy layer
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Anything else
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<ValidationRevert> for SimulationError {
    fn from(revert: ValidationRevert) -> Self {
        match revert {
            ValidationRevert::EntryPoint(reason) => Self::SimulateValidation(reason),
            op @ ValidationRevert::Operation { .. } => Self::SimulateValidation(op.to_string()),
            ValidationRevert::Unknown(data) => Self::Unexpected(anyhow::anyhow!(
                "unexpected revert data during simulation: {data}"
            )),
        }
    }
}

/// Decides whether a user operation is admissible.
///
/// This base implementation drives the EntryPoint simulation only; a
/// tracing validator implements the same interface and additionally fills
/// the storage map and referenced-contract hashes of the result.
#[async_trait::async_trait]
pub trait Simulator: Send + Sync {
    /// Validates a user operation against its EntryPoint.
    ///
    /// `expected_code_hashes` is the prior observation a tracing validator
    /// would recheck; the base validator accepts it for interface
    /// compatibility and does not consult it.
    async fn simulate_validation(
        &self,
        op: UserOperationVariant,
        block_id: Option<BlockId>,
        expected_code_hashes: Option<&ReferencedCodeHashes>,
    ) -> Result<SimulationResult, SimulationError>;
}
