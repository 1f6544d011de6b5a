//! Cell classification.

/// Cell classification for the pressure solve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    Solid,
    Fluid,
    #[default]
    Air,
}

impl CellType {
    #[inline]
    pub fn is_fluid(self) -> bool {
        self == CellType::Fluid
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self == CellType::Solid
    }
}
