//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Key releases are unreliable on Linux terminals, so held keys are
//! tracked by polling: a key with no repeat event inside a short window
//! counts as released.

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// State of one held repeatable key
#[derive(Debug, Clone)]
struct HeldKey {
    first_press: Instant,
    last_seen: Instant,
    das_fired: bool,
    last_repeat: Instant,
}

impl HeldKey {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_fired: false,
            last_repeat: now,
        }
    }

    fn refresh(&mut self, now: Instant) {
        self.last_seen = now;
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_seen) > KEY_TIMEOUT
    }

    /// Advance the DAS/ARR clock; true when a repeat should fire
    fn poll(&mut self, now: Instant, das: Duration, arr: Duration) -> bool {
        if now.duration_since(self.first_press) < das {
            return false;
        }
        if !self.das_fired {
            self.das_fired = true;
            self.last_repeat = now;
            return true;
        }
        if now.duration_since(self.last_repeat) >= arr {
            self.last_repeat = now;
            return true;
        }
        false
    }
}

/// The three actions that auto-repeat while held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeatable {
    Left,
    Right,
    Down,
}

impl Repeatable {
    fn action(self) -> Action {
        match self {
            Repeatable::Left => Action::MoveLeft,
            Repeatable::Right => Action::MoveRight,
            Repeatable::Down => Action::SoftDrop,
        }
    }
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            pause: Self::parse_keys(&settings.keys.pause),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// Which repeatable action, if any, a key is bound to
    fn repeatable(&self, code: KeyCode) -> Option<Repeatable> {
        if self.move_left.contains(&code) {
            Some(Repeatable::Left)
        } else if self.move_right.contains(&code) {
            Some(Repeatable::Right)
        } else if self.soft_drop.contains(&code) {
            Some(Repeatable::Down)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec![KeyCode::Left],
            move_right: vec![KeyCode::Right],
            soft_drop: vec![KeyCode::Down],
            hard_drop: vec![KeyCode::Char(' ')],
            rotate: vec![KeyCode::Up, KeyCode::Char('x')],
            pause: vec![KeyCode::Char('p'), KeyCode::Esc],
            quit: vec![KeyCode::Char('q')],
        }
    }
}

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Held state per repeatable action (indexed by `Repeatable`)
    held: [Option<HeldKey>; 3],
    bindings: KeyBindings,
    das: Duration,
    arr: Duration,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            held: [None, None, None],
            bindings: KeyBindings::default(),
            das: Duration::from_millis(170),
            arr: Duration::from_millis(50),
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            held: [None, None, None],
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    fn held_mut(&mut self, which: Repeatable) -> &mut Option<HeldKey> {
        &mut self.held[which as usize]
    }

    /// Handle a key press event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Action> {
        let now = Instant::now();

        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        let code = normalize_key(key.code);

        if let Some(which) = self.bindings.repeatable(code) {
            // Left and right cancel each other so a quick tap of the
            // opposite direction doesn't fight a held key
            match which {
                Repeatable::Left => *self.held_mut(Repeatable::Right) = None,
                Repeatable::Right => *self.held_mut(Repeatable::Left) = None,
                Repeatable::Down => {}
            }
            if let Some(state) = self.held_mut(which) {
                // Terminal auto-repeat of a key we're already tracking
                state.refresh(now);
                return vec![];
            }
            *self.held_mut(which) = Some(HeldKey::new(now));
            return vec![which.action()];
        }

        if self.bindings.hard_drop.contains(&code) {
            vec![Action::HardDrop]
        } else if self.bindings.rotate.contains(&code) {
            vec![Action::Rotate]
        } else if self.bindings.pause.contains(&code) {
            vec![Action::Pause]
        } else if self.bindings.quit.contains(&code) {
            vec![Action::Quit]
        } else {
            vec![]
        }
    }

    /// Handle a key release event (may not be delivered on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);
        if let Some(which) = self.bindings.repeatable(code) {
            *self.held_mut(which) = None;
        }
    }

    /// Update held keys and return repeat actions (call every frame)
    pub fn update(&mut self) -> Vec<Action> {
        let now = Instant::now();
        let (das, arr) = (self.das, self.arr);
        let mut actions = Vec::new();

        for which in [Repeatable::Left, Repeatable::Right, Repeatable::Down] {
            if self.held[which as usize]
                .as_ref()
                .is_some_and(|state| state.expired(now))
            {
                self.held[which as usize] = None;
                continue;
            }
            if let Some(state) = self.held_mut(which) {
                if state.poll(now, das, arr) {
                    actions.push(which.action());
                }
            }
        }

        actions
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.held = [None, None, None];
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_immediate_action_on_press() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
        assert_eq!(
            input.key_down(press(KeyCode::Char(' '))),
            vec![Action::HardDrop]
        );
        assert_eq!(input.key_down(press(KeyCode::Up)), vec![Action::Rotate]);
        assert_eq!(input.key_down(press(KeyCode::Char('p'))), vec![Action::Pause]);
    }

    #[test]
    fn test_repeat_press_does_not_double_fire() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
        // Terminal auto-repeat delivers another press while held
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![]);
    }

    #[test]
    fn test_opposite_direction_cancels_held_key() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Left));
        assert_eq!(
            input.key_down(press(KeyCode::Right)),
            vec![Action::MoveRight]
        );
        assert!(input.held[Repeatable::Left as usize].is_none());
    }

    #[test]
    fn test_uppercase_binding_matches() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Char('X'))), vec![Action::Rotate]);
        assert_eq!(input.key_down(press(KeyCode::Char('Q'))), vec![Action::Quit]);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = InputHandler::new();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.key_down(event), vec![Action::Quit]);
    }

    #[test]
    fn test_unbound_key_does_nothing() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Char('m'))), vec![]);
    }

    #[test]
    fn test_no_repeat_before_das_window() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Left));
        // Immediately after the press the DAS window hasn't elapsed
        assert_eq!(input.update(), vec![]);
    }

    #[test]
    fn test_repeat_fires_after_das() {
        let mut input = InputHandler::new();
        input.das = Duration::ZERO;
        input.key_down(press(KeyCode::Down));
        assert_eq!(input.update(), vec![Action::SoftDrop]);
    }

    #[test]
    fn test_clear_drops_held_keys() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Left));
        input.key_down(press(KeyCode::Down));
        input.clear();
        assert!(input.held.iter().all(Option::is_none));
    }
}
