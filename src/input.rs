//! Keyboard input to game intents
//!
//! Key handlers never touch the simulation. They only queue intents, and
//! the app drains the queue at the start of the next frame, when it knows
//! which seat (if any) the viewer holds.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::PADDLE_SPEED;
use crate::error::SettingsError;
use crate::sim::Side;

/// Game action a physical key is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    MoveUp,
    MoveDown,
    ClaimLeft,
    ClaimRight,
    Release,
}

impl Key {
    pub fn as_str(self) -> &'static str {
        match self {
            Key::MoveUp => "move up",
            Key::MoveDown => "move down",
            Key::ClaimLeft => "claim left",
            Key::ClaimRight => "claim right",
            Key::Release => "release seat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// What the local viewer wants to happen next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Set the owned paddle's velocity
    Move(f32),
    Claim(Side),
    Release,
}

impl KeyEvent {
    /// Paddle keys act on press and release; seat keys act on release
    pub fn intent(self) -> Option<Intent> {
        match self {
            KeyEvent::Down(Key::MoveUp) => Some(Intent::Move(-PADDLE_SPEED)),
            KeyEvent::Down(Key::MoveDown) => Some(Intent::Move(PADDLE_SPEED)),
            KeyEvent::Up(Key::MoveUp | Key::MoveDown) => Some(Intent::Move(0.0)),
            KeyEvent::Up(Key::ClaimLeft) => Some(Intent::Claim(Side::Left)),
            KeyEvent::Up(Key::ClaimRight) => Some(Intent::Claim(Side::Right)),
            KeyEvent::Up(Key::Release) => Some(Intent::Release),
            KeyEvent::Down(_) => None,
        }
    }
}

/// Pending intents, consumed once per frame
#[derive(Debug, Default)]
pub struct InputQueue {
    intents: VecDeque<Intent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: KeyEvent) {
        if let Some(intent) = event.intent() {
            self.intents.push_back(intent);
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Intent> + '_ {
        self.intents.drain(..)
    }

    pub fn clear(&mut self) {
        self.intents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Host key names (DOM `KeyboardEvent.key` style) bound to each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub move_up: String,
    pub move_down: String,
    pub claim_left: String,
    pub claim_right: String,
    pub release: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: "ArrowUp".into(),
            move_down: "ArrowDown".into(),
            claim_left: "ArrowLeft".into(),
            claim_right: "ArrowRight".into(),
            release: "x".into(),
        }
    }
}

impl KeyBindings {
    fn entries(&self) -> [(Key, &str); 5] {
        [
            (Key::MoveUp, self.move_up.as_str()),
            (Key::MoveDown, self.move_down.as_str()),
            (Key::ClaimLeft, self.claim_left.as_str()),
            (Key::ClaimRight, self.claim_right.as_str()),
            (Key::Release, self.release.as_str()),
        ]
    }

    /// Action bound to a host key name, if any
    pub fn resolve(&self, name: &str) -> Option<Key> {
        self.entries()
            .into_iter()
            .find(|(_, bound)| *bound == name)
            .map(|(key, _)| key)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let entries = self.entries();
        for (i, (key, name)) in entries.iter().enumerate() {
            if name.is_empty() {
                return Err(SettingsError::UnboundAction(key.as_str()));
            }
            if let Some((other, _)) = entries[..i].iter().find(|(_, n)| n == name) {
                return Err(SettingsError::DuplicateBinding {
                    key: name.to_string(),
                    first: other.as_str(),
                    second: key.as_str(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paddle_keys_map_to_velocity() {
        assert_eq!(
            KeyEvent::Down(Key::MoveUp).intent(),
            Some(Intent::Move(-PADDLE_SPEED))
        );
        assert_eq!(
            KeyEvent::Down(Key::MoveDown).intent(),
            Some(Intent::Move(PADDLE_SPEED))
        );
        assert_eq!(KeyEvent::Up(Key::MoveDown).intent(), Some(Intent::Move(0.0)));
    }

    #[test]
    fn test_seat_keys_act_on_release() {
        assert_eq!(KeyEvent::Down(Key::ClaimLeft).intent(), None);
        assert_eq!(
            KeyEvent::Up(Key::ClaimRight).intent(),
            Some(Intent::Claim(Side::Right))
        );
        assert_eq!(KeyEvent::Up(Key::Release).intent(), Some(Intent::Release));
    }

    #[test]
    fn test_queue_preserves_order() {
        let mut queue = InputQueue::new();
        queue.push(KeyEvent::Up(Key::ClaimLeft));
        queue.push(KeyEvent::Down(Key::Release));
        queue.push(KeyEvent::Down(Key::MoveUp));

        let intents: Vec<_> = queue.drain().collect();
        assert_eq!(
            intents,
            vec![Intent::Claim(Side::Left), Intent::Move(-PADDLE_SPEED)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_default_bindings_resolve() {
        let keys = KeyBindings::default();
        assert_eq!(keys.resolve("ArrowLeft"), Some(Key::ClaimLeft));
        assert_eq!(keys.resolve("x"), Some(Key::Release));
        assert_eq!(keys.resolve("Enter"), None);
        assert!(keys.validate().is_ok());
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let keys = KeyBindings {
            release: "ArrowUp".into(),
            ..Default::default()
        };
        assert!(matches!(
            keys.validate(),
            Err(SettingsError::DuplicateBinding { first: "move up", .. })
        ));
    }
}
