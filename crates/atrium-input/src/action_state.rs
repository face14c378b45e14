//! Per-frame action resolution with edge detection.
//!
//! [`ActionState`] is recomputed once per frame from the binding table plus
//! the current keyboard and mouse state, and answers whether each action is
//! held, was activated this frame, or was released this frame.

use std::collections::HashMap;

use crate::bindings::{Action, Binding, BindingTable};
use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// Resolved digital action values for the current and previous frame.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    active: HashMap<Action, bool>,
    prev: HashMap<Action, bool>,
}

impl ActionState {
    /// Create an empty action state (everything inactive).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute all actions from current input state.
    ///
    /// Call once per frame, after input events have been applied and before
    /// either controller updates.
    pub fn resolve(&mut self, table: &BindingTable, keyboard: &KeyboardState, mouse: &MouseState) {
        std::mem::swap(&mut self.prev, &mut self.active);
        self.active.clear();
        for action in Action::ALL {
            let live = match table.binding(action) {
                Binding::Key(code) => keyboard.is_pressed(code),
                Binding::Mouse(btn) => mouse.is_button_pressed(btn.to_winit()),
            };
            self.active.insert(action, live);
        }
    }

    /// Whether the action's binding is currently held.
    #[must_use]
    pub fn is_active(&self, action: Action) -> bool {
        self.active.get(&action).copied().unwrap_or(false)
    }

    /// True only on the frame the action transitioned from inactive to active.
    #[must_use]
    pub fn just_activated(&self, action: Action) -> bool {
        self.is_active(action) && !self.prev.get(&action).copied().unwrap_or(false)
    }

    /// True only on the frame the action transitioned from active to inactive.
    #[must_use]
    pub fn just_deactivated(&self, action: Action) -> bool {
        !self.is_active(action) && self.prev.get(&action).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseButton};
    use winit::keyboard::KeyCode;

    fn press_key(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(crate::keyboard::RawKeyEvent {
            key: code,
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn release_key(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(crate::keyboard::RawKeyEvent {
            key: code,
            state: ElementState::Released,
            repeat: false,
        });
    }

    #[test]
    fn test_bound_key_activates_action() {
        let table = BindingTable::with_defaults();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::KeyW);
        state.resolve(&table, &kb, &mouse);
        assert!(state.is_active(Action::MoveForward));
        assert!(!state.is_active(Action::MoveBack));
    }

    #[test]
    fn test_mouse_binding_activates_action() {
        let table = BindingTable::with_defaults();
        let kb = KeyboardState::new();
        let mut mouse = MouseState::new();
        let mut state = ActionState::new();

        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        state.resolve(&table, &kb, &mouse);
        assert!(state.is_active(Action::RotateHeld));
        assert!(!state.is_active(Action::Throw));
    }

    #[test]
    fn test_just_activated_edge() {
        let table = BindingTable::with_defaults();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::Space);
        state.resolve(&table, &kb, &mouse);
        assert!(state.just_activated(Action::Jump));

        // Held on the next frame: active but no longer just-activated.
        state.resolve(&table, &kb, &mouse);
        assert!(state.is_active(Action::Jump));
        assert!(!state.just_activated(Action::Jump));
    }

    #[test]
    fn test_just_deactivated_edge() {
        let table = BindingTable::with_defaults();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::Space);
        state.resolve(&table, &kb, &mouse);
        release_key(&mut kb, KeyCode::Space);
        state.resolve(&table, &kb, &mouse);
        assert!(state.just_deactivated(Action::Jump));

        state.resolve(&table, &kb, &mouse);
        assert!(!state.just_deactivated(Action::Jump));
    }

    #[test]
    fn test_rebind_takes_effect_next_resolve() {
        let mut table = BindingTable::with_defaults();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        table.rebind_action(Action::Jump, crate::Binding::Key(KeyCode::KeyJ));

        press_key(&mut kb, KeyCode::Space);
        state.resolve(&table, &kb, &mouse);
        assert!(!state.is_active(Action::Jump));

        release_key(&mut kb, KeyCode::Space);
        press_key(&mut kb, KeyCode::KeyJ);
        state.resolve(&table, &kb, &mouse);
        assert!(state.is_active(Action::Jump));
    }
}
