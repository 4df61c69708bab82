//! Exit codes of the `galaxy` command

/// Success - every selected environment was planned
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - unreadable or invalid `.galaxy.yaml`, unknown environment or namespace
pub const CONFIG_ERROR: i32 = 2;

/// Inventory error - missing namespace directory or unrecognized file
pub const INVENTORY_ERROR: i32 = 3;

/// Planning error - file name or interpolation failure
pub const PLAN_ERROR: i32 = 4;
