//! Integer points, square cells, and circle intersection tests.

/// A point in the integer coordinate plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// One of the four subdivisions of a square cell. North is the low-y
/// half, West the low-x half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// All quadrants in canonical (wire) order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Position of this quadrant in the canonical order.
    pub fn index(self) -> usize {
        match self {
            Quadrant::NorthWest => 0,
            Quadrant::NorthEast => 1,
            Quadrant::SouthWest => 2,
            Quadrant::SouthEast => 3,
        }
    }
}

/// An axis-aligned cell with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl Square {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Square { xmin, ymin, xmax, ymax }
    }

    fn mid_x(&self) -> i32 {
        (self.xmin + self.xmax) / 2
    }

    fn mid_y(&self) -> i32 {
        (self.ymin + self.ymax) / 2
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Which quadrant of this cell `p` falls in. Points on a midline go
    /// west/north.
    pub fn quadrant_of(&self, p: Point) -> Quadrant {
        let east = p.x > self.mid_x();
        let south = p.y > self.mid_y();
        match (east, south) {
            (false, false) => Quadrant::NorthWest,
            (true, false) => Quadrant::NorthEast,
            (false, true) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }

    /// The sub-cell covering `q`. West keeps the midline column, east
    /// starts one past it; likewise north/south for rows.
    pub fn quadrant(&self, q: Quadrant) -> Square {
        let mx = self.mid_x();
        let my = self.mid_y();
        match q {
            Quadrant::NorthWest => Square::new(self.xmin, self.ymin, mx, my),
            Quadrant::NorthEast => Square::new(mx + 1, self.ymin, self.xmax, my),
            Quadrant::SouthWest => Square::new(self.xmin, my + 1, mx, self.ymax),
            Quadrant::SouthEast => Square::new(mx + 1, my + 1, self.xmax, self.ymax),
        }
    }

    /// Whether any part of the circle at `center` with `radius` touches
    /// this cell: the nearest cell point to the center (the center
    /// itself when inside, else the clamped edge or corner point) must
    /// lie within the radius.
    pub fn intersects_circle(&self, center: Point, radius: i32) -> bool {
        let nearest = Point::new(
            center.x.max(self.xmin).min(self.xmax),
            center.y.max(self.ymin).min(self.ymax),
        );
        distance(center, nearest) <= radius as f64
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    ((dx * dx + dy * dy) as f64).sqrt()
}
