
//! Simple math utilities.

/// Simple two-dimensional vector of any numerical type.
/// Supports only few mathematical operations
/// as this is used mainly as data struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vec2<T> (pub T, pub T);

impl<T> Vec2<T> {

    /// Maps all components of this vector to a new type, yielding a vector of that new type.
    pub fn map<B>(self, map: impl Fn(T) -> B) -> Vec2<B> {
        Vec2(map(self.0), map(self.1))
    }
}

impl<T: Copy> Vec2<T> {

    /// The first component of this 2D vector.
    pub fn x(self) -> T { self.0 }

    /// The second component of this 2D vector.
    pub fn y(self) -> T { self.1 }

    /// The first component of this 2D vector, seen as a size.
    pub fn width(self) -> T { self.0 }

    /// The second component of this 2D vector, seen as a size.
    pub fn height(self) -> T { self.1 }
}

/// Computes `floor(log(x)/log(2))`. Returns 0 where argument is 0.
pub(crate) fn floor_log_2(mut number: u32) -> u32 {
    let mut log = 0;

    while number > 1 {
        log += 1;
        number >>= 1;
    }

    log
}

/// Computes `ceil(log(x)/log(2))`. Returns 0 where argument is 0.
pub(crate) fn ceil_log_2(mut number: u32) -> u32 {
    let mut log = 0;
    let mut round_up = 0;

    while number > 1 {
        if number & 1 != 0 {
            round_up = 1;
        }

        log += 1;
        number >>= 1;
    }

    log + round_up
}


/// Round up or down in specific calculations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RoundingMode {

    /// Round down.
    Down,

    /// Round up.
    Up,
}

impl RoundingMode {

    pub(crate) fn log2(self, number: usize) -> usize {
        match self {
            RoundingMode::Down => self::floor_log_2(number as u32) as usize,
            RoundingMode::Up => self::ceil_log_2(number as u32) as usize,
        }
    }

    pub(crate) fn divide(self, dividend: usize, divisor: usize) -> usize {
        match self {
            RoundingMode::Up => (dividend + divisor - 1) / divisor, // only works for positive numbers
            RoundingMode::Down => dividend / divisor,
        }
    }
}
