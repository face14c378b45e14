//! Canonical action table: alias resolution, rebinding, and change broadcast.
//!
//! [`BindingTable`] maps each canonical [`Action`] to exactly one live
//! [`Binding`]. Historical alias spellings (case variants, `key_` and legacy
//! row-prefixed forms) resolve to the same canonical entry. Every successful
//! rebind notifies an explicit observer registry so key-hint UI stays in
//! sync, and is forwarded to an attached [`BindingStore`] for persistence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::store::BindingStore;

/// Semantic actions the locomotion and carry controllers consume.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Move the avatar forward.
    MoveForward,
    /// Move the avatar backward.
    MoveBack,
    /// Strafe left.
    MoveLeft,
    /// Strafe right.
    MoveRight,
    /// Sprint while held.
    Sprint,
    /// Crouch while held.
    Crouch,
    /// Jump.
    Jump,
    /// Lean the camera rig while held.
    Lean,
    /// Generic interaction (doors, switches).
    Interact,
    /// Pick up or release the aimed body.
    PickUp,
    /// Rotate the held body while held.
    RotateHeld,
    /// Throw the held body.
    Throw,
}

impl Action {
    /// Every canonical action, in broadcast order.
    pub const ALL: [Action; 12] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Sprint,
        Action::Crouch,
        Action::Jump,
        Action::Lean,
        Action::Interact,
        Action::PickUp,
        Action::RotateHeld,
        Action::Throw,
    ];

    /// The single normalized identifier for this action.
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        match self {
            Action::MoveForward => "move_forward",
            Action::MoveBack => "move_back",
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Sprint => "sprint",
            Action::Crouch => "crouch",
            Action::Jump => "jump",
            Action::Lean => "lean",
            Action::Interact => "interact",
            Action::PickUp => "pick_up",
            Action::RotateHeld => "rotate_held",
            Action::Throw => "throw",
        }
    }

    /// Resolve a canonical name or any historical alias to an action.
    ///
    /// Matching is case-insensitive, ignores surrounding whitespace, and
    /// accepts an optional `key_` prefix. The legacy row-prefixed spellings
    /// (including the misspelled `row_crought` and `row_naklon`) are kept so
    /// old settings files keep resolving.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Action> {
        let lowered = name.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix("key_").unwrap_or(&lowered);
        Some(match name {
            "move_forward" | "forward" | "up" | "row_up" => Action::MoveForward,
            "move_back" | "back" | "down" | "row_down" => Action::MoveBack,
            "move_left" | "left" | "row_left" => Action::MoveLeft,
            "move_right" | "right" | "row_right" => Action::MoveRight,
            "sprint" | "run" | "row_sprint" => Action::Sprint,
            "crouch" | "row_crouch" | "row_crought" => Action::Crouch,
            "jump" | "row_jump" => Action::Jump,
            "lean" | "naklon" | "row_naklon" => Action::Lean,
            "interact" | "action" | "row_action" => Action::Interact,
            "pick_up" | "pickup" | "grab" | "row_pickup" => Action::PickUp,
            "rotate_held" | "rotate" | "turn" | "row_rotate" => Action::RotateHeld,
            "throw" | "row_throw" => Action::Throw,
            _ => return None,
        })
    }
}

/// Stable (code, debug-name, key) table for the keys a binding may use.
///
/// Codes are what the persisted settings store records (`key_<action> -> code`).
/// Names match the `Debug` output of [`KeyCode`] for serde round-trips.
const KEY_TABLE: &[(u16, &str, KeyCode)] = &[
    (1, "Space", KeyCode::Space),
    (2, "Enter", KeyCode::Enter),
    (3, "Escape", KeyCode::Escape),
    (4, "Tab", KeyCode::Tab),
    (5, "ShiftLeft", KeyCode::ShiftLeft),
    (6, "ShiftRight", KeyCode::ShiftRight),
    (7, "ControlLeft", KeyCode::ControlLeft),
    (8, "ControlRight", KeyCode::ControlRight),
    (9, "AltLeft", KeyCode::AltLeft),
    (10, "AltRight", KeyCode::AltRight),
    (11, "Backspace", KeyCode::Backspace),
    (12, "CapsLock", KeyCode::CapsLock),
    (20, "KeyA", KeyCode::KeyA),
    (21, "KeyB", KeyCode::KeyB),
    (22, "KeyC", KeyCode::KeyC),
    (23, "KeyD", KeyCode::KeyD),
    (24, "KeyE", KeyCode::KeyE),
    (25, "KeyF", KeyCode::KeyF),
    (26, "KeyG", KeyCode::KeyG),
    (27, "KeyH", KeyCode::KeyH),
    (28, "KeyI", KeyCode::KeyI),
    (29, "KeyJ", KeyCode::KeyJ),
    (30, "KeyK", KeyCode::KeyK),
    (31, "KeyL", KeyCode::KeyL),
    (32, "KeyM", KeyCode::KeyM),
    (33, "KeyN", KeyCode::KeyN),
    (34, "KeyO", KeyCode::KeyO),
    (35, "KeyP", KeyCode::KeyP),
    (36, "KeyQ", KeyCode::KeyQ),
    (37, "KeyR", KeyCode::KeyR),
    (38, "KeyS", KeyCode::KeyS),
    (39, "KeyT", KeyCode::KeyT),
    (40, "KeyU", KeyCode::KeyU),
    (41, "KeyV", KeyCode::KeyV),
    (42, "KeyW", KeyCode::KeyW),
    (43, "KeyX", KeyCode::KeyX),
    (44, "KeyY", KeyCode::KeyY),
    (45, "KeyZ", KeyCode::KeyZ),
    (50, "Digit0", KeyCode::Digit0),
    (51, "Digit1", KeyCode::Digit1),
    (52, "Digit2", KeyCode::Digit2),
    (53, "Digit3", KeyCode::Digit3),
    (54, "Digit4", KeyCode::Digit4),
    (55, "Digit5", KeyCode::Digit5),
    (56, "Digit6", KeyCode::Digit6),
    (57, "Digit7", KeyCode::Digit7),
    (58, "Digit8", KeyCode::Digit8),
    (59, "Digit9", KeyCode::Digit9),
    (70, "ArrowUp", KeyCode::ArrowUp),
    (71, "ArrowDown", KeyCode::ArrowDown),
    (72, "ArrowLeft", KeyCode::ArrowLeft),
    (73, "ArrowRight", KeyCode::ArrowRight),
    (80, "F1", KeyCode::F1),
    (81, "F2", KeyCode::F2),
    (82, "F3", KeyCode::F3),
    (83, "F4", KeyCode::F4),
    (84, "F5", KeyCode::F5),
    (85, "F6", KeyCode::F6),
    (86, "F7", KeyCode::F7),
    (87, "F8", KeyCode::F8),
    (88, "F9", KeyCode::F9),
    (89, "F10", KeyCode::F10),
    (90, "F11", KeyCode::F11),
    (91, "F12", KeyCode::F12),
];

/// Integer-code offset for mouse buttons in the persisted store.
const MOUSE_CODE_BASE: u16 = 1000;

/// Serde helper module for [`KeyCode`], which doesn't implement serde natively.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    /// Serialize a [`KeyCode`] as its debug string (e.g., `"KeyW"`).
    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    /// Deserialize a [`KeyCode`] from its debug string.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        super::KEY_TABLE
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(_, _, k)| *k)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

/// Wrapper for [`winit::event::MouseButton`] that supports serde and stable codes.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButtonBinding {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
}

impl MouseButtonBinding {
    /// Convert to the winit [`MouseButton`] type.
    #[must_use]
    pub fn to_winit(self) -> MouseButton {
        match self {
            Self::Left => MouseButton::Left,
            Self::Right => MouseButton::Right,
            Self::Middle => MouseButton::Middle,
        }
    }
}

/// A physical input source bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    /// A keyboard key (physical scan code).
    Key(#[serde(with = "keycode_serde")] KeyCode),
    /// A mouse button.
    Mouse(MouseButtonBinding),
}

impl Binding {
    /// The stable integer input code for the persisted settings store.
    ///
    /// Returns `None` for keys outside the supported table.
    #[must_use]
    pub fn code(self) -> Option<u16> {
        match self {
            Binding::Key(key) => KEY_TABLE
                .iter()
                .find(|(_, _, k)| *k == key)
                .map(|(c, _, _)| *c),
            Binding::Mouse(MouseButtonBinding::Left) => Some(MOUSE_CODE_BASE),
            Binding::Mouse(MouseButtonBinding::Right) => Some(MOUSE_CODE_BASE + 1),
            Binding::Mouse(MouseButtonBinding::Middle) => Some(MOUSE_CODE_BASE + 2),
        }
    }

    /// Decode a stable integer input code back into a binding.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Binding> {
        match code {
            c if c == MOUSE_CODE_BASE => Some(Binding::Mouse(MouseButtonBinding::Left)),
            c if c == MOUSE_CODE_BASE + 1 => Some(Binding::Mouse(MouseButtonBinding::Right)),
            c if c == MOUSE_CODE_BASE + 2 => Some(Binding::Mouse(MouseButtonBinding::Middle)),
            c => KEY_TABLE
                .iter()
                .find(|(code, _, _)| *code == c)
                .map(|(_, _, k)| Binding::Key(*k)),
        }
    }
}

/// Handle returned by [`BindingTable::subscribe`] for later removal.
pub type ListenerId = u64;

type ChangeListener = Box<dyn FnMut(Action, Binding)>;

/// Mapping of canonical action → live input binding with change broadcast.
///
/// Exactly one binding is live per action, though the same binding may be
/// shared across actions; duplicate detection is a caller responsibility
/// via [`is_bound`](Self::is_bound). Each entry is replaced wholesale on
/// rebind, so a reader between mutations always observes a complete binding.
pub struct BindingTable {
    bindings: HashMap<Action, Binding>,
    observers: Vec<(ListenerId, ChangeListener)>,
    next_listener: ListenerId,
    store: Option<Box<dyn BindingStore>>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BindingTable {
    /// The built-in default binding for an action (WASD layout).
    #[must_use]
    pub fn default_binding(action: Action) -> Binding {
        match action {
            Action::MoveForward => Binding::Key(KeyCode::KeyW),
            Action::MoveBack => Binding::Key(KeyCode::KeyS),
            Action::MoveLeft => Binding::Key(KeyCode::KeyA),
            Action::MoveRight => Binding::Key(KeyCode::KeyD),
            Action::Sprint => Binding::Key(KeyCode::ShiftLeft),
            Action::Crouch => Binding::Key(KeyCode::ControlLeft),
            Action::Jump => Binding::Key(KeyCode::Space),
            Action::Lean => Binding::Key(KeyCode::KeyQ),
            Action::Interact => Binding::Key(KeyCode::KeyE),
            Action::PickUp => Binding::Key(KeyCode::KeyF),
            Action::RotateHeld => Binding::Mouse(MouseButtonBinding::Left),
            Action::Throw => Binding::Mouse(MouseButtonBinding::Right),
        }
    }

    /// Create a table populated with the default bindings and no store.
    #[must_use]
    pub fn with_defaults() -> Self {
        let bindings = Action::ALL
            .iter()
            .map(|&a| (a, Self::default_binding(a)))
            .collect();
        Self {
            bindings,
            observers: Vec::new(),
            next_listener: 0,
            store: None,
        }
    }

    /// Create a table populated from a persisted store, falling back to the
    /// default binding wherever the store has no (or an unknown) code.
    ///
    /// Mutations are forwarded back to the store for the table's lifetime.
    #[must_use]
    pub fn from_store(store: Box<dyn BindingStore>) -> Self {
        let mut table = Self::with_defaults();
        for action in Action::ALL {
            if let Some(code) = store.binding_code(action) {
                match Binding::from_code(code) {
                    Some(binding) => {
                        table.bindings.insert(action, binding);
                    }
                    None => warn!(
                        "Unknown input code {code} stored for {}; keeping default",
                        action.canonical_name()
                    ),
                }
            }
        }
        table.store = Some(store);
        table
    }

    /// The live binding for an action.
    #[must_use]
    pub fn binding(&self, action: Action) -> Binding {
        self.bindings
            .get(&action)
            .copied()
            .unwrap_or_else(|| Self::default_binding(action))
    }

    /// Resolve a canonical action name or alias to its live binding.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        Action::from_name(name).map(|a| self.binding(a))
    }

    /// Rebind by canonical name or alias.
    ///
    /// Unknown names are rejected with a warning and no event; returns
    /// whether the rebind was applied.
    pub fn rebind(&mut self, name: &str, binding: Binding) -> bool {
        match Action::from_name(name) {
            Some(action) => {
                self.rebind_action(action, binding);
                true
            }
            None => {
                warn!("Rebind rejected: unknown action '{name}'");
                false
            }
        }
    }

    /// Overwrite the binding for an action, notify all subscribers, and
    /// forward the change to the attached store.
    pub fn rebind_action(&mut self, action: Action, binding: Binding) {
        self.bindings.insert(action, binding);
        if let Some(store) = self.store.as_deref_mut() {
            match binding.code() {
                Some(code) => store.set_binding_code(action, code),
                None => warn!(
                    "Binding for {} has no stable code; not persisted",
                    action.canonical_name()
                ),
            }
        }
        self.notify(action, binding);
    }

    /// Whether `binding` is live for any action other than `excluding`.
    ///
    /// Exists so an external rebinding UI can warn about duplicates; the
    /// table itself never prevents shared bindings.
    #[must_use]
    pub fn is_bound(&self, binding: Binding, excluding: Option<Action>) -> bool {
        self.bindings
            .iter()
            .any(|(&a, &b)| b == binding && Some(a) != excluding)
    }

    /// Register a change listener. Fired with `(action, new binding)` on
    /// every rebind and during [`broadcast_all`](Self::broadcast_all).
    pub fn subscribe(&mut self, listener: impl FnMut(Action, Binding) + 'static) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.observers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(lid, _)| *lid != id);
        self.observers.len() != before
    }

    /// Re-announce every binding to all subscribers.
    ///
    /// Call once after startup population so key-hint listeners sync.
    pub fn broadcast_all(&mut self) {
        for action in Action::ALL {
            let binding = self.binding(action);
            self.notify(action, binding);
        }
    }

    fn notify(&mut self, action: Action, binding: Binding) {
        for (_, listener) in &mut self.observers {
            listener(action, binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_alias_forms_resolve_to_same_action() {
        for name in ["move_forward", "Move_Forward", "up", "Row_up", "key_row_up", " up "] {
            assert_eq!(Action::from_name(name), Some(Action::MoveForward), "{name}");
        }
        for name in ["crouch", "Row_crouch", "Row_crought", "KEY_CROUCH"] {
            assert_eq!(Action::from_name(name), Some(Action::Crouch), "{name}");
        }
        assert_eq!(Action::from_name("naklon"), Some(Action::Lean));
        assert_eq!(Action::from_name("grab"), Some(Action::PickUp));
        assert_eq!(Action::from_name("turn"), Some(Action::RotateHeld));
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        assert_eq!(Action::from_name("teleport"), None);
        assert_eq!(Action::from_name(""), None);
    }

    #[test]
    fn test_rebind_then_resolve_all_aliases() {
        let mut table = BindingTable::with_defaults();
        let new = Binding::Key(KeyCode::ArrowUp);
        assert!(table.rebind("Row_up", new));

        for alias in ["move_forward", "up", "row_up", "forward"] {
            assert_eq!(table.resolve(alias), Some(new), "{alias}");
        }
        // Unrelated action unaffected.
        assert_eq!(
            table.resolve("move_back"),
            Some(Binding::Key(KeyCode::KeyS))
        );
    }

    #[test]
    fn test_rebind_unknown_action_rejected_without_event() {
        let mut table = BindingTable::with_defaults();
        let fired = Rc::new(RefCell::new(0u32));
        let fired_clone = Rc::clone(&fired);
        table.subscribe(move |_, _| *fired_clone.borrow_mut() += 1);

        assert!(!table.rebind("warp_drive", Binding::Key(KeyCode::KeyZ)));
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_rebind_fires_change_event_with_canonical_action() {
        let mut table = BindingTable::with_defaults();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        table.subscribe(move |action, binding| seen_clone.borrow_mut().push((action, binding)));

        let new = Binding::Key(KeyCode::KeyK);
        // Rebind via a legacy alias; event carries the canonical action.
        assert!(table.rebind("Row_jump", new));
        assert_eq!(seen.borrow().as_slice(), &[(Action::Jump, new)]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut table = BindingTable::with_defaults();
        let count = Rc::new(RefCell::new(0u32));
        let count_clone = Rc::clone(&count);
        let id = table.subscribe(move |_, _| *count_clone.borrow_mut() += 1);

        table.rebind_action(Action::Jump, Binding::Key(KeyCode::KeyJ));
        assert_eq!(*count.borrow(), 1);

        assert!(table.unsubscribe(id));
        table.rebind_action(Action::Jump, Binding::Key(KeyCode::KeyK));
        assert_eq!(*count.borrow(), 1);
        assert!(!table.unsubscribe(id));
    }

    #[test]
    fn test_broadcast_all_announces_every_action() {
        let mut table = BindingTable::with_defaults();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        table.subscribe(move |action, _| seen_clone.borrow_mut().push(action));

        table.broadcast_all();
        assert_eq!(seen.borrow().as_slice(), &Action::ALL);
    }

    #[test]
    fn test_is_bound_with_exclusion() {
        let mut table = BindingTable::with_defaults();
        let space = Binding::Key(KeyCode::Space);
        assert!(table.is_bound(space, None));
        assert!(!table.is_bound(space, Some(Action::Jump)));

        // Shared bindings are permitted; is_bound reports them for UI.
        table.rebind_action(Action::Sprint, space);
        assert!(table.is_bound(space, Some(Action::Jump)));
    }

    #[test]
    fn test_binding_code_roundtrip() {
        let bindings = [
            Binding::Key(KeyCode::KeyW),
            Binding::Key(KeyCode::Space),
            Binding::Key(KeyCode::F12),
            Binding::Mouse(MouseButtonBinding::Left),
            Binding::Mouse(MouseButtonBinding::Middle),
        ];
        for b in bindings {
            let code = b.code().expect("supported binding has a code");
            assert_eq!(Binding::from_code(code), Some(b));
        }
        assert_eq!(Binding::from_code(u16::MAX), None);
    }

    #[test]
    fn test_binding_serde_by_name() {
        let b = Binding::Key(KeyCode::KeyW);
        let ron_str = ron::to_string(&b).unwrap();
        assert!(ron_str.contains("KeyW"));
        let back: Binding = ron::from_str(&ron_str).unwrap();
        assert_eq!(back, b);
    }

    /// Test store that exposes its contents through a shared handle so the
    /// table's write-through behavior can be observed.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<crate::store::MemoryBindingStore>>);

    impl crate::store::BindingStore for SharedStore {
        fn binding_code(&self, action: Action) -> Option<u16> {
            self.0.borrow().binding_code(action)
        }
        fn set_binding_code(&mut self, action: Action, code: u16) {
            self.0.borrow_mut().set_binding_code(action, code);
        }
        fn mouse_sensitivity(&self) -> Option<f32> {
            self.0.borrow().mouse_sensitivity()
        }
        fn set_mouse_sensitivity(&mut self, value: f32) {
            self.0.borrow_mut().set_mouse_sensitivity(value);
        }
    }

    #[test]
    fn test_from_store_seeds_bindings_and_falls_back() {
        use crate::store::BindingStore;
        let store = SharedStore::default();
        let code = Binding::Key(KeyCode::KeyK).code().unwrap();
        store.0.borrow_mut().set_binding_code(Action::Jump, code);
        // An unknown code keeps the default.
        store.0.borrow_mut().set_binding_code(Action::Crouch, u16::MAX);

        let table = BindingTable::from_store(Box::new(store));
        assert_eq!(table.binding(Action::Jump), Binding::Key(KeyCode::KeyK));
        assert_eq!(
            table.binding(Action::Crouch),
            BindingTable::default_binding(Action::Crouch)
        );
        // Untouched actions keep defaults.
        assert_eq!(
            table.binding(Action::MoveLeft),
            Binding::Key(KeyCode::KeyA)
        );
    }

    #[test]
    fn test_rebind_forwards_to_store() {
        use crate::store::BindingStore;
        let store = SharedStore::default();
        let handle = store.clone();
        let mut table = BindingTable::from_store(Box::new(store));

        let new = Binding::Key(KeyCode::KeyJ);
        table.rebind_action(Action::Jump, new);
        assert_eq!(handle.binding_code(Action::Jump), new.code());
    }

    #[test]
    fn test_key_table_codes_unique() {
        let mut codes: Vec<u16> = KEY_TABLE.iter().map(|(c, _, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), KEY_TABLE.len());
    }
}
