/// One of the two fixed horizontal positions a car may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Left,
    Right,
}

impl Lane {
    /// The other lane
    pub fn opposite(&self) -> Lane {
        match self {
            Lane::Left => Lane::Right,
            Lane::Right => Lane::Left,
        }
    }

    /// Observation bit for this lane (Left = 0, Right = 1)
    pub fn bit(&self) -> f32 {
        match self {
            Lane::Left => 0.0,
            Lane::Right => 1.0,
        }
    }
}

/// Axis-aligned rectangle identified by its center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.height / 2.0
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.width / 2.0
    }

    /// Strict AABB overlap test; rectangles that merely touch do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// A car pinned to one of the two lanes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Car {
    pub lane: Lane,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Car {
    pub fn new(lane: Lane, center_y: f32, size: (f32, f32)) -> Self {
        Self {
            lane,
            center_y,
            width: size.0,
            height: size.1,
        }
    }

    /// Bounding rectangle given the lane center x-coordinate
    pub fn rect(&self, lane_x: f32) -> Rect {
        Rect::new(lane_x, self.center_y, self.width, self.height)
    }
}

/// Complete simulation state, mutated once per step
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Player car (vertical position never changes)
    pub player: Car,
    /// Opponent car scrolling down the screen
    pub opponent: Car,
    /// Current opponent speed in pixels per step; never decreases
    pub speed: f32,
    /// Number of successful dodges
    pub score: u32,
    /// Difficulty tier, coupled to score
    pub level: u32,
    /// Cyclic offset for the scrolling lane dashes; cosmetic only
    pub line_offset: f32,
    /// False once the player has collided
    pub is_alive: bool,
}

impl GameState {
    pub fn new(player: Car, opponent: Car, initial_speed: f32) -> Self {
        Self {
            player,
            opponent,
            speed: initial_speed,
            score: 0,
            level: 0,
            line_offset: 0.0,
            is_alive: true,
        }
    }
}
