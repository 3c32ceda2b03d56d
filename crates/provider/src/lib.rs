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

//! Chain access for the validation pipeline: a narrow JSON-RPC facade and
//! version-aware EntryPoint simulation adapters.

mod traits;
pub use traits::*;

mod alloy;
pub use alloy::{
    decode_simulate_handle_op_revert, decode_simulate_validation_revert, decode_simulations_revert,
    new_alloy_provider, AlloyEvmProvider, EntryPointV0_6, EntryPointV0_7, SimulationConfig,
};

// Re-exported for downstream signatures.
pub use alloy_rpc_types_eth::{
    state::StateOverride, Block, BlockId, BlockNumberOrTag, FeeHistory, TransactionRequest,
};
