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

//! ABI bindings for the ERC-4337 EntryPoint contracts.
//!
//! The bindings are bit-exact against the published v0.6 and v0.7
//! interfaces. Only the surface the validation pipeline drives is bound:
//! `simulateValidation`, `simulateHandleOp`, and the custom errors those
//! calls revert with.

pub mod v0_6;
pub mod v0_7;
