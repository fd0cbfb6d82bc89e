use crate::config::Glyphs;
use crate::Coords;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit `(row, col)` step for one move in this direction.
    pub fn offset(self) -> Coords {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// The border rectangle the snake lives in. Border cells themselves are lethal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Playfield {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Playfield {
    /// Rows above this hold the scoreboard.
    pub const TOP: i32 = 3;

    pub fn for_grid(rows: usize, cols: usize) -> Self {
        Playfield { top: Self::TOP, bottom: rows as i32 - 1, left: 0, right: cols as i32 - 1 }
    }

    pub fn is_interior(&self, pos: Coords) -> bool {
        pos.0 > self.top && pos.0 < self.bottom && pos.1 > self.left && pos.1 < self.right
    }

    pub fn interior_cells(&self) -> usize {
        ((self.bottom - self.top - 1) * (self.right - self.left - 1)).max(0) as usize
    }

    pub fn interior_center(&self) -> Coords {
        ((self.top + self.bottom) / 2, (self.left + self.right) / 2)
    }
}

pub struct Snake {
    body: Vec<Coords>,
    direction: Direction,
    prev_tail: Coords,
}

impl Snake {
    /// Builds a straight snake with its head at `pos`, trailing `size - 1` segments behind it.
    pub fn new(pos: Coords, size: u16, direction: Direction) -> Self {
        let diff = direction.offset();
        let body: Vec<Coords> = (0..size.max(1) as i32)
            .map(|i| (pos.0 - diff.0 * i, pos.1 - diff.1 * i))
            .collect();
        let prev_tail = body[body.len() - 1];

        Snake { body, direction, prev_tail }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Where the tail sat before the last move; the renderer blanks this cell.
    pub fn prev_tail(&self) -> Coords {
        self.prev_tail
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    /// Turning straight back into the neck is ignored.
    pub fn set_direction(&mut self, new_direction: Direction) {
        if new_direction != self.direction.opposite() {
            self.direction = new_direction;
        }
    }

    pub fn move_step(&mut self) {
        self.prev_tail = self.body[self.body.len() - 1];

        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }

        let diff = self.direction.offset();
        let head = &mut self.body[0];
        head.0 += diff.0;
        head.1 += diff.1;
    }

    /// Appends a segment behind the tail, on the side facing away from the heading.
    pub fn grow(&mut self) {
        let tail = self.body[self.body.len() - 1];
        let diff = self.direction.offset();
        self.body.push((tail.0 - diff.0, tail.1 - diff.1));
    }

    pub fn hits_self(&self, enabled: bool) -> bool {
        enabled && self.body[1..].contains(&self.head())
    }

    pub fn hits_boundary(&self, field: &Playfield) -> bool {
        let (row, col) = self.head();
        row <= field.top || row >= field.bottom || col <= field.left || col >= field.right
    }

    pub fn head_char(&self, glyphs: &Glyphs) -> char {
        match self.direction {
            Up => glyphs.head_up,
            Down => glyphs.head_down,
            Left => glyphs.head_left,
            Right => glyphs.head_right,
        }
    }
}
