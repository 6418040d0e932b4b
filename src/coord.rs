use std::ops::{Add, AddAssign, Neg, Sub};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const EAST: Coord = Coord { x: 1, y: 0 };
    pub const WEST: Coord = Coord { x: -1, y: 0 };
    pub const NORTH: Coord = Coord { x: 0, y: 1 };
    pub const SOUTH: Coord = Coord { x: 0, y: -1 };
    pub const CARDINALS: [Coord; 4] = [Coord::EAST, Coord::WEST, Coord::NORTH, Coord::SOUTH];

    pub const fn new(x: i32, y: i32) -> Coord {
        Coord { x, y }
    }

    pub fn random_facing<R: Rng + ?Sized>(rng: &mut R) -> Coord {
        *Coord::CARDINALS.choose(rng).unwrap_or(&Coord::EAST)
    }

    /// Each component in {-1, 0, 1}.
    pub fn random_step<R: Rng + ?Sized>(rng: &mut R) -> Coord {
        Coord::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1))
    }

    pub fn clamp_unit(self) -> Coord {
        Coord::new(self.x.clamp(-1, 1), self.y.clamp(-1, 1))
    }

    pub fn rotate_left(self) -> Coord {
        Coord::new(-self.y, self.x)
    }

    pub fn rotate_right(self) -> Coord {
        Coord::new(self.y, -self.x)
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;

    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}
