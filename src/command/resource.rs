//! Exclusive-access resources.
//!
//! Each physical subsystem is a slot in a small fixed arena, addressed by
//! [`ResourceId`].  Commands never hold references to subsystems; they
//! declare a [`ResourceSet`] bitmask and the scheduler arbitrates.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResourceId {
    Drivetrain = 0,
    Shooter = 1,
    Intake = 2,
    Climber = 3,
}

impl ResourceId {
    /// Number of resources; sizes the scheduler's arena.
    pub const COUNT: usize = 4;

    pub const ALL: [ResourceId; Self::COUNT] =
        [Self::Drivetrain, Self::Shooter, Self::Intake, Self::Climber];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Drivetrain => "drivetrain",
            Self::Shooter => "shooter",
            Self::Intake => "intake",
            Self::Climber => "climber",
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of resources, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResourceSet(u8);

impl ResourceSet {
    pub const EMPTY: ResourceSet = ResourceSet(0);

    pub const fn of(id: ResourceId) -> Self {
        Self(id.mask())
    }

    #[must_use]
    pub const fn with(self, id: ResourceId) -> Self {
        Self(self.0 | id.mask())
    }

    #[must_use]
    pub const fn union(self, other: ResourceSet) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: ResourceSet) -> Self {
        Self(self.0 & other.0)
    }

    /// Members of `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: ResourceSet) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn contains(self, id: ResourceId) -> bool {
        self.0 & id.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ResourceId> {
        ResourceId::ALL.into_iter().filter(move |id| self.contains(*id))
    }
}

impl FromIterator<ResourceId> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, ResourceSet::with)
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(id.name())?;
        }
        f.write_str("}")
    }
}
