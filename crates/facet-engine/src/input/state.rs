use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton};

/// Current input state for a single window.
///
/// Holds "is down" information and the last known pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels.
    pub pointer_pos: (f32, f32),

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds an event into the held-state sets.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::MouseDown { button, x, y } => {
                self.pointer_pos = (*x, *y);
                self.buttons_down.insert(*button);
            }
            InputEvent::MouseUp { button } => {
                self.buttons_down.remove(button);
            }
            InputEvent::MouseMove { x, y } => {
                self.pointer_pos = (*x, *y);
            }
            InputEvent::KeyDown(key) => {
                self.keys_down.insert(*key);
            }
            InputEvent::KeyUp(key) => {
                self.keys_down.remove(key);
            }
            InputEvent::FocusLost => {
                // Avoids stuck keys/buttons when focus changes mid-press.
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            InputEvent::Quit | InputEvent::Resize { .. } => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::KeyDown(Key::W));
        assert!(s.key_down(Key::W));
        s.apply_event(&InputEvent::KeyUp(Key::W));
        assert!(!s.key_down(Key::W));
    }

    #[test]
    fn mouse_down_updates_pointer() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::MouseDown { button: MouseButton::Left, x: 4.0, y: 9.0 });
        assert!(s.buttons_down.contains(&MouseButton::Left));
        assert_eq!(s.pointer_pos, (4.0, 9.0));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::KeyDown(Key::Space));
        s.apply_event(&InputEvent::MouseDown { button: MouseButton::Right, x: 0.0, y: 0.0 });
        s.apply_event(&InputEvent::FocusLost);
        assert!(s.keys_down.is_empty());
        assert!(s.buttons_down.is_empty());
    }
}
