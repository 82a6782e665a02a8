/// Raw device state → intent translation.
///
/// Priority (first match wins):
///   action + Up held      →  raise_green_stardust
///   action + Down held    →  place_or_destroy_down
///   action                →  place_or_destroy
///   direct-bound key      →  its intent (x = down variant, c = raise)
///   Left held             →  move_left
///   Right held            →  move_right
///
/// Action presses are edge-triggered; the host holds them pending until
/// the session accepts one. Movement is level-triggered and re-sampled
/// every tick.

use crossterm::event::KeyCode;

use stardust::config::KeyConfig;
use stardust::Intent;

use super::gamepad::GamepadState;
use super::input::{keys_from_names, InputState};

/// One frame of device state, already merged across keyboard and gamepad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Action key went down this frame.
    pub action: bool,
    /// A key bound straight to a non-movement intent went down this frame.
    pub direct: Option<Intent>,
}

/// Edge-triggered part: the action key and its modifiers, or a direct binding.
pub fn action_intent(s: &Signals) -> Option<Intent> {
    if s.action {
        Some(if s.up {
            Intent::RaiseGreenStardust
        } else if s.down {
            Intent::PlaceOrDestroyDown
        } else {
            Intent::PlaceOrDestroy
        })
    } else {
        s.direct
    }
}

/// Level-triggered part: held direction. Left wins when both are held.
pub fn move_intent(s: &Signals) -> Option<Intent> {
    if s.left {
        Some(Intent::MoveLeft)
    } else if s.right {
        Some(Intent::MoveRight)
    } else {
        None
    }
}

pub fn translate(s: &Signals) -> Option<Intent> {
    action_intent(s).or_else(|| move_intent(s))
}

/// Key codes resolved from `KeyConfig`.
pub struct Controls {
    left: Vec<KeyCode>,
    right: Vec<KeyCode>,
    action: Vec<KeyCode>,
    direct: Vec<(Intent, Vec<KeyCode>)>,
    up: Vec<KeyCode>,
    down: Vec<KeyCode>,
}

impl Controls {
    pub fn from_config(cfg: &KeyConfig) -> Self {
        let mut controls = Controls {
            left: Vec::new(),
            right: Vec::new(),
            action: Vec::new(),
            direct: Vec::new(),
            up: keys_from_names(&cfg.modifier_up),
            down: keys_from_names(&cfg.modifier_down),
        };
        for (intent, names) in &cfg.bindings {
            let keys = keys_from_names(names);
            match intent {
                Intent::MoveLeft => controls.left.extend(keys),
                Intent::MoveRight => controls.right.extend(keys),
                Intent::PlaceOrDestroy => controls.action.extend(keys),
                other => controls.direct.push((*other, keys)),
            }
        }
        controls
    }

    pub fn sample(&self, kb: &InputState, gp: &GamepadState) -> Signals {
        let held = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
        Signals {
            left: held(&self.left[..]) || gp.left_held(),
            right: held(&self.right[..]) || gp.right_held(),
            up: held(&self.up[..]) || gp.up_held(),
            down: held(&self.down[..]) || gp.down_held(),
            action: kb.any_pressed(&self.action) || gp.action_pressed(),
            direct: self
                .direct
                .iter()
                .find(|(_, keys)| kb.any_pressed(keys))
                .map(|(intent, _)| *intent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_none() {
        assert_eq!(translate(&Signals::default()), None);
    }

    #[test]
    fn action_modifiers_pick_variant() {
        let base = Signals { action: true, ..Signals::default() };
        assert_eq!(translate(&base), Some(Intent::PlaceOrDestroy));
        assert_eq!(
            translate(&Signals { down: true, ..base }),
            Some(Intent::PlaceOrDestroyDown)
        );
        assert_eq!(
            translate(&Signals { up: true, ..base }),
            Some(Intent::RaiseGreenStardust)
        );
        // Up outranks Down.
        assert_eq!(
            translate(&Signals { up: true, down: true, ..base }),
            Some(Intent::RaiseGreenStardust)
        );
    }

    #[test]
    fn action_outranks_movement() {
        let s = Signals { action: true, left: true, ..Signals::default() };
        assert_eq!(translate(&s), Some(Intent::PlaceOrDestroy));
        assert_eq!(move_intent(&s), Some(Intent::MoveLeft));
    }

    #[test]
    fn direct_binding_without_action() {
        let s = Signals {
            direct: Some(Intent::RaiseGreenStardust),
            right: true,
            ..Signals::default()
        };
        assert_eq!(translate(&s), Some(Intent::RaiseGreenStardust));
    }

    #[test]
    fn modifiers_alone_do_nothing() {
        let s = Signals { up: true, down: true, ..Signals::default() };
        assert_eq!(translate(&s), None);
    }

    #[test]
    fn left_wins_over_right() {
        let s = Signals { left: true, right: true, ..Signals::default() };
        assert_eq!(translate(&s), Some(Intent::MoveLeft));
    }

    #[test]
    fn default_bindings_split_by_role() {
        let controls = Controls::from_config(&stardust::GameConfig::default().keys);
        assert!(controls.left.contains(&KeyCode::Left));
        assert!(controls.right.contains(&KeyCode::Char('d')));
        assert!(controls.action.contains(&KeyCode::Char(' ')));
        assert!(controls.up.contains(&KeyCode::Up));
        assert!(controls.down.contains(&KeyCode::Down));
        let raise = controls
            .direct
            .iter()
            .find(|(i, _)| *i == Intent::RaiseGreenStardust)
            .map(|(_, k)| k.clone());
        assert_eq!(raise, Some(vec![KeyCode::Char('c'), KeyCode::Char('C')]));
    }
}
