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

use alloy_primitives::Bytes;
use alloy_transport::TransportError;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by the chain client facade.
///
/// The facade owns transport and ABI concerns only; a revert carries its
/// raw payload so callers can run their own typed decoders over it.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The RPC transport failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// A response did not decode against the expected ABI
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The call reverted on chain; the raw revert payload is preserved
    #[error("call reverted: {0}")]
    Revert(Bytes),
    /// Anything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
