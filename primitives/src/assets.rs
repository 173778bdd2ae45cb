//! Asset identifiers shared by the liquidity network and protocol token pallets.
//!
//! Fungible balances live in `pallet-assets` and are addressed by `u32` ids.

// 32-bit ID Structure:
// [ 4 bits: Type ] [ 28 bits: Index/ID ]
//
// Types:
// 0x1... -> Protocol Tokens (legacy and migrated)
// 0x2... -> Stablecoins
// 0x3... -> Wrapped native of the settlement chain

pub const MASK_TYPE: u32 = 0xF000_0000;
pub const MASK_INDEX: u32 = 0x0FFF_FFFF;

pub const TYPE_PROTOCOL: u32 = 0x1000_0000;
pub const TYPE_STABLE: u32 = 0x2000_0000;
pub const TYPE_WRAPPED: u32 = 0x3000_0000;

/// Helper to construct compile-time IDs
const fn make_id(type_mask: u32, index: u32) -> u32 {
  type_mask | (index & MASK_INDEX)
}

/// Well-known asset constants serving as system defaults
pub mod well_known {
  use super::*;

  /// Legacy protocol token that is burned on migration (RIC)
  pub const RIC: u32 = make_id(TYPE_PROTOCOL, 1);
  /// Protocol token minted on migration (REX)
  pub const REX: u32 = make_id(TYPE_PROTOCOL, 2);

  pub const USDC: u32 = make_id(TYPE_STABLE, 1);

  pub const WMATIC: u32 = make_id(TYPE_WRAPPED, 1);
}
