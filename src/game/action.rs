/// Action that can be taken each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move to the left lane (no effect if already there)
    MoveLeft,
    /// Keep the current lane
    Stay,
    /// Move to the right lane (no effect if already there)
    MoveRight,
}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 3;

    /// Convert a discrete action index to an Action
    ///
    /// - 0 → MoveLeft
    /// - 1 → Stay
    /// - 2 → MoveRight
    /// - other → Stay (default for out-of-range policy outputs)
    pub fn from_index(idx: usize) -> Action {
        match idx {
            0 => Action::MoveLeft,
            1 => Action::Stay,
            2 => Action::MoveRight,
            _ => Action::Stay,
        }
    }

    /// The discrete index of this action
    pub fn index(&self) -> usize {
        match self {
            Action::MoveLeft => 0,
            Action::Stay => 1,
            Action::MoveRight => 2,
        }
    }
}
