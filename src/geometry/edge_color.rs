use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Set of output channels an edge contributes to, as an RGB bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeColor(u8);

impl EdgeColor {
    pub const BLACK: Self = Self(0);
    pub const RED: Self = Self(1);
    pub const GREEN: Self = Self(2);
    pub const YELLOW: Self = Self(3);
    pub const BLUE: Self = Self(4);
    pub const MAGENTA: Self = Self(5);
    pub const CYAN: Self = Self(6);
    pub const WHITE: Self = Self(7);

    /// Creates a color from the low three bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 7)
    }

    /// Returns the raw bit mask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every channel of `other` is present in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if at most one channel is set.
    #[must_use]
    pub const fn is_single_channel(self) -> bool {
        self.0 & self.0.wrapping_sub(1) == 0
    }

    /// Returns `true` if the red channel is set.
    #[must_use]
    pub const fn has_red(self) -> bool {
        self.0 & 1 != 0
    }

    /// Returns `true` if the green channel is set.
    #[must_use]
    pub const fn has_green(self) -> bool {
        self.0 & 2 != 0
    }

    /// Returns `true` if the blue channel is set.
    #[must_use]
    pub const fn has_blue(self) -> bool {
        self.0 & 4 != 0
    }
}

impl BitAnd for EdgeColor {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for EdgeColor {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for EdgeColor {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for EdgeColor {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & 7)
    }
}
