#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Reset,
    MainMenu,
    Hint,
    Confirm,
    Quit,
}

const ACTION_COUNT: usize = 5;

/// Held state plus press edges for every action.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Records a key transition. A press edge is raised only on up->down.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::Reset => 0,
            InputAction::MainMenu => 1,
            InputAction::Hint => 2,
            InputAction::Confirm => 3,
            InputAction::Quit => 4,
        }
    }
}
