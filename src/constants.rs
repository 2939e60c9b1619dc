//! Application-wide constants for roomchat.
//!
//! Magic numbers live here, grouped by domain.
//!
//! # Categories
//!
//! - **Relay**: default endpoint
//! - **Notifications**: toast duration hints per event
//! - **UI**: frame pacing and toast stacking

use std::time::Duration;

// ============================================================================
// Relay
// ============================================================================

/// Relay endpoint used when neither config nor CLI names one.
pub const DEFAULT_RELAY_URL: &str = "ws://localhost:8080";

// ============================================================================
// Notifications
// ============================================================================

/// How long the "Joined Room" toast stays up.
pub const JOINED_ROOM_TOAST: Duration = Duration::from_millis(2000);

/// How long validation and relay error toasts stay up.
pub const ERROR_TOAST: Duration = Duration::from_millis(3000);

/// How long the "has joined the Room" toast stays up.
///
/// Longer than the others; arrivals are the one thing worth noticing late.
pub const USER_JOINED_TOAST: Duration = Duration::from_millis(5000);

/// How long the "has left the Room" toast stays up.
pub const USER_LEFT_TOAST: Duration = Duration::from_millis(3000);

// ============================================================================
// UI
// ============================================================================

/// TUI frame delay (approximately 60fps).
///
/// Also the headless loop's idle sleep between stdin and signal polls.
pub const FRAME_DELAY: Duration = Duration::from_millis(16);

/// Upper bound on how long the TUI blocks waiting for a key.
pub const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Toasts visible at once per anchor; older ones wait their turn.
pub const MAX_VISIBLE_TOASTS: usize = 3;

/// Capacity of the session update broadcast channel.
///
/// Lagging subscribers miss intermediate updates but always see the latest
/// state through the session accessors.
pub const SESSION_UPDATE_CAPACITY: usize = 64;
