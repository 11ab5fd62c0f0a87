//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - every selected target was delivered or skipped
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid herald.yml, missing setting or credential
pub const CONFIG_ERROR: i32 = 2;

/// Template error - a field or manifest template failed to render
pub const TEMPLATE_ERROR: i32 = 3;

/// Delivery error - an announcement service rejected or never received a message
pub const DELIVERY_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
