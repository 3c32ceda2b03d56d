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

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use crate::{chain::ChainSpec, EntryPointVersion, GasFees};

/// User operation for EntryPoint v0.6
pub mod v0_6;
/// User operation for EntryPoint v0.7
pub mod v0_7;

/// Behavior common to both user-operation encodings.
pub trait UserOperation: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// The EntryPoint version this encoding belongs to.
    fn entry_point_version() -> EntryPointVersion;

    /// The canonical hash, as computed by the EntryPoint's `getUserOpHash`.
    fn hash(&self, entry_point: Address, chain_id: u64) -> B256;

    /// Sender account address.
    fn sender(&self) -> Address;

    /// Semi-abstracted nonce.
    fn nonce(&self) -> U256;

    /// Factory address, if the operation deploys the account.
    fn factory(&self) -> Option<Address>;

    /// Paymaster address, if a paymaster sponsors the operation.
    fn paymaster(&self) -> Option<Address>;

    /// Call data for the account's execution phase.
    fn call_data(&self) -> &Bytes;

    /// Call gas limit.
    fn call_gas_limit(&self) -> u128;

    /// Verification gas limit.
    fn verification_gas_limit(&self) -> u128;

    /// Declared pre-verification gas.
    fn pre_verification_gas(&self) -> u128;

    /// Max fee per gas.
    fn max_fee_per_gas(&self) -> u128;

    /// Max priority fee per gas.
    fn max_priority_fee_per_gas(&self) -> u128;

    /// Declared fees as a pair.
    fn gas_fees(&self) -> GasFees {
        GasFees {
            max_fee_per_gas: self.max_fee_per_gas(),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas(),
        }
    }

    /// Worst-case wei cost of the operation.
    ///
    /// With a paymaster the EntryPoint may run the verification phase up to
    /// three times, hence the multiplier.
    fn max_gas_cost(&self) -> U256 {
        let mul: u128 = if self.paymaster().is_some() { 3 } else { 1 };
        U256::from(self.max_fee_per_gas())
            * U256::from(
                self.pre_verification_gas()
                    + self.call_gas_limit()
                    + self.verification_gas_limit() * mul,
            )
    }

    /// Statically-computable portion of the operation's pre-verification
    /// gas: calldata cost plus fixed EntryPoint overhead.
    fn static_pre_verification_gas(&self, chain_spec: &ChainSpec) -> u128;
}

/// A user operation in either supported encoding.
///
/// Version detection is on shape at the deserialization boundary; the two
/// encodings are mutually exclusive per operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UserOperationVariant {
    /// v0.6 encoding
    V0_6(v0_6::UserOperation),
    /// v0.7 encoding
    V0_7(v0_7::UserOperation),
}

impl UserOperationVariant {
    /// The EntryPoint version of this operation.
    pub fn entry_point_version(&self) -> EntryPointVersion {
        match self {
            Self::V0_6(_) => EntryPointVersion::V0_6,
            Self::V0_7(_) => EntryPointVersion::V0_7,
        }
    }

    /// Consumes the variant, returning the v0.6 operation if it is one.
    pub fn into_v0_6(self) -> Option<v0_6::UserOperation> {
        match self {
            Self::V0_6(op) => Some(op),
            Self::V0_7(_) => None,
        }
    }

    /// Consumes the variant, returning the v0.7 operation if it is one.
    pub fn into_v0_7(self) -> Option<v0_7::UserOperation> {
        match self {
            Self::V0_6(_) => None,
            Self::V0_7(op) => Some(op),
        }
    }

    /// The canonical hash, as computed by the EntryPoint's `getUserOpHash`.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        match self {
            Self::V0_6(op) => op.hash(entry_point, chain_id),
            Self::V0_7(op) => op.hash(entry_point, chain_id),
        }
    }

    /// Sender account address.
    pub fn sender(&self) -> Address {
        match self {
            Self::V0_6(op) => op.sender(),
            Self::V0_7(op) => op.sender(),
        }
    }

    /// Factory address, if present.
    pub fn factory(&self) -> Option<Address> {
        match self {
            Self::V0_6(op) => op.factory(),
            Self::V0_7(op) => op.factory(),
        }
    }

    /// Paymaster address, if present.
    pub fn paymaster(&self) -> Option<Address> {
        match self {
            Self::V0_6(op) => op.paymaster(),
            Self::V0_7(op) => op.paymaster(),
        }
    }

    /// Call gas limit.
    pub fn call_gas_limit(&self) -> u128 {
        match self {
            Self::V0_6(op) => op.call_gas_limit(),
            Self::V0_7(op) => op.call_gas_limit(),
        }
    }

    /// Verification gas limit.
    pub fn verification_gas_limit(&self) -> u128 {
        match self {
            Self::V0_6(op) => op.verification_gas_limit(),
            Self::V0_7(op) => op.verification_gas_limit(),
        }
    }

    /// Declared pre-verification gas.
    pub fn pre_verification_gas(&self) -> u128 {
        match self {
            Self::V0_6(op) => op.pre_verification_gas(),
            Self::V0_7(op) => op.pre_verification_gas(),
        }
    }

    /// Max fee per gas.
    pub fn max_fee_per_gas(&self) -> u128 {
        match self {
            Self::V0_6(op) => op.max_fee_per_gas(),
            Self::V0_7(op) => op.max_fee_per_gas(),
        }
    }

    /// Max priority fee per gas.
    pub fn max_priority_fee_per_gas(&self) -> u128 {
        match self {
            Self::V0_6(op) => op.max_priority_fee_per_gas(),
            Self::V0_7(op) => op.max_priority_fee_per_gas(),
        }
    }

    /// Declared fees as a pair.
    pub fn gas_fees(&self) -> GasFees {
        GasFees {
            max_fee_per_gas: self.max_fee_per_gas(),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas(),
        }
    }

    /// Entity addresses of the operation, for attaching to stake records.
    pub fn entity_addresses(&self) -> crate::EntityAddresses {
        crate::EntityAddresses {
            sender: self.sender(),
            factory: self.factory(),
            paymaster: self.paymaster(),
        }
    }

    /// Statically-computable pre-verification gas.
    pub fn static_pre_verification_gas(&self, chain_spec: &ChainSpec) -> u128 {
        match self {
            Self::V0_6(op) => op.static_pre_verification_gas(chain_spec),
            Self::V0_7(op) => op.static_pre_verification_gas(chain_spec),
        }
    }
}

/// Gas cost of putting an ABI-encoded value on the wire, plus the
/// EntryPoint's per-word bookkeeping cost.
pub(crate) fn op_calldata_gas_cost<V: SolValue>(
    op: V,
    zero_byte_gas: u128,
    non_zero_byte_gas: u128,
    per_word_gas: u128,
) -> u128 {
    let encoded = op.abi_encode();
    let zeros = encoded.iter().filter(|&&b| b == 0).count() as u128;
    let non_zeros = encoded.len() as u128 - zeros;
    let words = (encoded.len() as u128 + 31) / 32;
    zeros * zero_byte_gas + non_zeros * non_zero_byte_gas + words * per_word_gas
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn test_calldata_gas_cost_all_zero_word() {
        // One 32-byte word of zeros: 32 zero bytes + 1 word.
        let cost = op_calldata_gas_cost(U256::ZERO, 4, 16, 4);
        assert_eq!(cost, 32 * 4 + 4);
    }

    #[test]
    fn test_calldata_gas_cost_mixed() {
        // U256::MAX encodes as 32 non-zero bytes.
        let cost = op_calldata_gas_cost(U256::MAX, 4, 16, 4);
        assert_eq!(cost, 32 * 16 + 4);
    }
}
