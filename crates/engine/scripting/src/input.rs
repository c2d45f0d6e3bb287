//! Frame-stable input state exposed to scripts
//!
//! The snapshot is fully populated: every recognized key is always present
//! as a boolean, so scripts can index any of them without a nil check. Key
//! names are normalized to lowercase on the way in; the pointer delta is
//! accumulated over a frame and reset at frame end.

use glam::Vec2;
use std::collections::HashMap;

/// Keys scripts may rely on being present in every snapshot
pub const RECOGNIZED_KEYS: &[&str] = &[
    "w",
    "a",
    "s",
    "d",
    "arrowup",
    "arrowdown",
    "arrowleft",
    "arrowright",
    " ",
    "shift",
    "control",
    "escape",
    "enter",
];

/// Keyboard and pointer state for one frame
#[derive(Debug, Clone)]
pub struct InputSnapshot {
    keys: HashMap<String, bool>,
    mouse_delta: Vec2,
}

impl InputSnapshot {
    /// Create a snapshot with every recognized key present and false
    pub fn new() -> Self {
        let keys = RECOGNIZED_KEYS
            .iter()
            .map(|k| (k.to_string(), false))
            .collect();
        Self {
            keys,
            mouse_delta: Vec2::ZERO,
        }
    }

    /// Record a key press. The name is normalized to lowercase so `"W"` and
    /// `"w"` are the same key; the un-normalized name is never stored.
    pub fn key_down(&mut self, key: &str) {
        self.keys.insert(key.to_lowercase(), true);
    }

    /// Record a key release
    pub fn key_up(&mut self, key: &str) {
        self.keys.insert(key.to_lowercase(), false);
    }

    /// Whether the exact key name is currently held
    pub fn is_down(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Whether the exact key name exists in the snapshot
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Iterate over all tracked keys and their states
    pub fn keys(&self) -> impl Iterator<Item = (&str, bool)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Accumulate pointer movement for this frame
    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    /// Pointer movement accumulated so far this frame
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Clear the pointer delta at the end of a frame; key states persist
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
    }

    /// Return to the initial all-false state (scene teardown)
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_keys_always_present() {
        let mut input = InputSnapshot::new();
        for key in RECOGNIZED_KEYS {
            assert!(input.contains(key), "key {:?} missing before events", key);
            assert!(!input.is_down(key));
        }

        input.key_down("w");
        input.key_up("w");

        for key in RECOGNIZED_KEYS {
            assert!(input.contains(key), "key {:?} missing after events", key);
        }
    }

    #[test]
    fn test_press_and_release() {
        let mut input = InputSnapshot::new();
        input.key_down("arrowleft");
        assert!(input.is_down("arrowleft"));
        input.key_up("arrowleft");
        assert!(!input.is_down("arrowleft"));
    }

    #[test]
    fn test_uppercase_normalized() {
        let mut input = InputSnapshot::new();
        input.key_down("W");
        assert!(input.is_down("w"));
        assert!(!input.contains("W"));
    }

    #[test]
    fn test_space_key() {
        let mut input = InputSnapshot::new();
        input.key_down(" ");
        assert!(input.is_down(" "));
    }

    #[test]
    fn test_mouse_delta_accumulates_and_resets() {
        let mut input = InputSnapshot::new();
        input.add_mouse_delta(2.0, -1.0);
        input.add_mouse_delta(0.5, 0.5);
        assert_eq!(input.mouse_delta(), Vec2::new(2.5, -0.5));

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        // Key states survive frame boundaries
        input.key_down("d");
        input.end_frame();
        assert!(input.is_down("d"));
    }

    #[test]
    fn test_reset() {
        let mut input = InputSnapshot::new();
        input.key_down("w");
        input.add_mouse_delta(1.0, 1.0);
        input.reset();
        assert!(!input.is_down("w"));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
