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
use alloy_sol_types::{sol, SolValue};
pub use warden_contracts::v0_7::PackedUserOperation;

use super::{UserOperation as UserOperationTrait, UserOperationVariant};
use crate::{chain::ChainSpec, EntryPointVersion};

/// User operation for EntryPoint v0.7
///
/// Unpacked field form. v0.7 splits `initCode` into `factory`+`factoryData`
/// and `paymasterAndData` into the paymaster address, its two gas limits,
/// and its data; the contract's packed form is produced on demand via
/// [`Self::pack`].
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct UserOperation {
    /// Sender
    pub sender: Address,
    /// Semi-abstracted nonce
    pub nonce: U256,
    /// Factory, present iff the operation deploys the account
    pub factory: Option<Address>,
    /// Data for the factory call
    pub factory_data: Bytes,
    /// Call data
    pub call_data: Bytes,
    /// Call gas limit
    pub call_gas_limit: u128,
    /// Verification gas limit
    pub verification_gas_limit: u128,
    /// Pre verification gas
    pub pre_verification_gas: u128,
    /// Max fee per gas
    pub max_fee_per_gas: u128,
    /// Max priority fee per gas
    pub max_priority_fee_per_gas: u128,
    /// Paymaster, present iff a paymaster sponsors the operation
    pub paymaster: Option<Address>,
    /// Paymaster verification gas limit
    pub paymaster_verification_gas_limit: u128,
    /// Paymaster post-op gas limit
    pub paymaster_post_op_gas_limit: u128,
    /// Data for the paymaster call
    pub paymaster_data: Bytes,
    /// Signature
    pub signature: Bytes,
}

sol! {
    #[allow(missing_docs)]
    #[derive(Default, Debug, PartialEq, Eq)]
    struct PackedUserOperationForHash {
        address sender;
        uint256 nonce;
        bytes32 hashInitCode;
        bytes32 hashCallData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes32 hashPaymasterAndData;
    }

    #[allow(missing_docs)]
    #[derive(Default, Debug, PartialEq, Eq)]
    struct PackedForHashEncoded {
        bytes32 encodedHash;
        address entryPoint;
        uint256 chainId;
    }
}

/// Two 128-bit values in one 32-byte word, high half first.
fn pack_u128_pair(high: u128, low: u128) -> B256 {
    let mut word = [0_u8; 32];
    word[..16].copy_from_slice(&high.to_be_bytes());
    word[16..].copy_from_slice(&low.to_be_bytes());
    B256::from(word)
}

impl UserOperation {
    /// Produces the contract's packed form of this operation.
    pub fn pack(&self) -> PackedUserOperation {
        PackedUserOperation {
            sender: self.sender,
            nonce: self.nonce,
            initCode: self.init_code(),
            callData: self.call_data.clone(),
            accountGasLimits: pack_u128_pair(self.verification_gas_limit, self.call_gas_limit),
            preVerificationGas: U256::from(self.pre_verification_gas),
            gasFees: pack_u128_pair(self.max_priority_fee_per_gas, self.max_fee_per_gas),
            paymasterAndData: self.paymaster_and_data(),
            signature: self.signature.clone(),
        }
    }

    /// The packed `initCode` field: factory address followed by its data,
    /// or empty when the account already exists.
    pub fn init_code(&self) -> Bytes {
        match self.factory {
            Some(factory) => {
                let mut out = Vec::with_capacity(20 + self.factory_data.len());
                out.extend_from_slice(factory.as_slice());
                out.extend_from_slice(&self.factory_data);
                out.into()
            }
            None => Bytes::default(),
        }
    }

    /// The packed `paymasterAndData` field: paymaster address, its two
    /// 16-byte gas limits, then its data. Empty without a paymaster.
    pub fn paymaster_and_data(&self) -> Bytes {
        match self.paymaster {
            Some(paymaster) => {
                let mut out = Vec::with_capacity(52 + self.paymaster_data.len());
                out.extend_from_slice(paymaster.as_slice());
                out.extend_from_slice(&self.paymaster_verification_gas_limit.to_be_bytes());
                out.extend_from_slice(&self.paymaster_post_op_gas_limit.to_be_bytes());
                out.extend_from_slice(&self.paymaster_data);
                out.into()
            }
            None => Bytes::default(),
        }
    }
}

impl UserOperationTrait for UserOperation {
    fn entry_point_version() -> EntryPointVersion {
        EntryPointVersion::V0_7
    }

    fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        let packed = self.pack();
        let for_hash = PackedUserOperationForHash {
            sender: packed.sender,
            nonce: packed.nonce,
            hashInitCode: alloy_primitives::keccak256(&packed.initCode),
            hashCallData: alloy_primitives::keccak256(&packed.callData),
            accountGasLimits: packed.accountGasLimits,
            preVerificationGas: packed.preVerificationGas,
            gasFees: packed.gasFees,
            hashPaymasterAndData: alloy_primitives::keccak256(&packed.paymasterAndData),
        };
        let encoded = PackedForHashEncoded {
            encodedHash: alloy_primitives::keccak256(for_hash.abi_encode()),
            entryPoint: entry_point,
            chainId: U256::from(chain_id),
        };

        alloy_primitives::keccak256(encoded.abi_encode())
    }

    fn sender(&self) -> Address {
        self.sender
    }

    fn nonce(&self) -> U256 {
        self.nonce
    }

    fn factory(&self) -> Option<Address> {
        self.factory
    }

    fn paymaster(&self) -> Option<Address> {
        self.paymaster
    }

    fn call_data(&self) -> &Bytes {
        &self.call_data
    }

    fn call_gas_limit(&self) -> u128 {
        self.call_gas_limit
    }

    fn verification_gas_limit(&self) -> u128 {
        self.verification_gas_limit
    }

    fn pre_verification_gas(&self) -> u128 {
        self.pre_verification_gas
    }

    fn max_fee_per_gas(&self) -> u128 {
        self.max_fee_per_gas
    }

    fn max_priority_fee_per_gas(&self) -> u128 {
        self.max_priority_fee_per_gas
    }

    fn static_pre_verification_gas(&self, chain_spec: &ChainSpec) -> u128 {
        super::op_calldata_gas_cost(
            self.pack(),
            chain_spec.calldata_zero_byte_gas as u128,
            chain_spec.calldata_non_zero_byte_gas as u128,
            chain_spec.per_user_op_word_gas as u128,
        ) + chain_spec.per_user_op_v0_7_gas as u128
            + (if self.factory.is_some() {
                chain_spec.per_user_op_deploy_overhead_gas as u128
            } else {
                0
            })
            + chain_spec.transaction_intrinsic_gas as u128
    }
}

impl From<UserOperation> for UserOperationVariant {
    fn from(op: UserOperation) -> Self {
        UserOperationVariant::V0_7(op)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes};

    use super::*;

    fn demo_op() -> UserOperation {
        UserOperation {
            sender: address!("1306b01bc3e4ad202612d3843387e94737673f53"),
            nonce: U256::from(8942),
            factory: Some(address!("6942069420694206942069420694206942069420")),
            factory_data: bytes!("deadbeef"),
            call_data: bytes!("0000000000000000000000000000000000000000080085"),
            call_gas_limit: 10_000,
            verification_gas_limit: 100_000,
            pre_verification_gas: 100,
            max_fee_per_gas: 99_999,
            max_priority_fee_per_gas: 9_999_999,
            paymaster: Some(address!("0123456789abcdef0123456789abcdef01234567")),
            paymaster_verification_gas_limit: 20_000,
            paymaster_post_op_gas_limit: 30_000,
            paymaster_data: bytes!("cafe"),
            signature: bytes!("da0929f527cded8d0a1eaf2e8861d7f7e2d8160b7b13942f99dd367df4473a"),
        }
    }

    #[test]
    fn test_pack_gas_words() {
        let packed = demo_op().pack();

        let account_gas_limits = packed.accountGasLimits.0;
        assert_eq!(
            u128::from_be_bytes(account_gas_limits[..16].try_into().unwrap()),
            100_000
        );
        assert_eq!(
            u128::from_be_bytes(account_gas_limits[16..].try_into().unwrap()),
            10_000
        );

        let gas_fees = packed.gasFees.0;
        assert_eq!(
            u128::from_be_bytes(gas_fees[..16].try_into().unwrap()),
            9_999_999
        );
        assert_eq!(
            u128::from_be_bytes(gas_fees[16..].try_into().unwrap()),
            99_999
        );
    }

    #[test]
    fn test_pack_init_code() {
        let packed = demo_op().pack();
        assert_eq!(
            packed.initCode,
            bytes!("6942069420694206942069420694206942069420deadbeef")
        );

        let no_factory = UserOperation {
            factory: None,
            ..demo_op()
        };
        assert_eq!(no_factory.pack().initCode, Bytes::default());
    }

    #[test]
    fn test_pack_paymaster_and_data() {
        let packed = demo_op().pack();
        let data = &packed.paymasterAndData;
        assert_eq!(
            &data[..20],
            address!("0123456789abcdef0123456789abcdef01234567").as_slice()
        );
        assert_eq!(
            u128::from_be_bytes(data[20..36].try_into().unwrap()),
            20_000
        );
        assert_eq!(
            u128::from_be_bytes(data[36..52].try_into().unwrap()),
            30_000
        );
        assert_eq!(&data[52..], bytes!("cafe").as_ref());

        let no_paymaster = UserOperation {
            paymaster: None,
            ..demo_op()
        };
        assert_eq!(no_paymaster.pack().paymasterAndData, Bytes::default());
        assert_eq!(no_paymaster.paymaster(), None);
    }

    #[test]
    fn test_hash_depends_on_entry_point_and_chain() {
        let op = demo_op();
        let ep_a = address!("0000000071727de22e5e9d8baf0edac6f37da032");
        let ep_b = address!("66a15edcc3b50a663e72f1457ffd49b9ae284ddc");

        assert_eq!(op.hash(ep_a, 1), op.hash(ep_a, 1));
        assert_ne!(op.hash(ep_a, 1), op.hash(ep_b, 1));
        assert_ne!(op.hash(ep_a, 1), op.hash(ep_a, 1337));
    }
}
