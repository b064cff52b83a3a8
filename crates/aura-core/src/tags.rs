//! Spell tags.
//!
//! Tags are a closed vocabulary stored as bits, so tag queries are a single
//! mask comparison.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A category a spell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Beneficial effect
    Buff,
    /// Harmful effect
    Debuff,
    /// Damage mitigation
    Shield,
    /// Fire element
    Fire,
    /// Ice element
    Ice,
    /// Water element
    Water,
    /// Earth element
    Earth,
    /// Air element
    Air,
    /// Light element
    Light,
    /// Dark element
    Dark,
    /// Lightning element
    Lightning,
    /// Time element
    Time,
    /// Gravity element
    Gravity,
}

impl Tag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Buff,
        Self::Debuff,
        Self::Shield,
        Self::Fire,
        Self::Ice,
        Self::Water,
        Self::Earth,
        Self::Air,
        Self::Light,
        Self::Dark,
        Self::Lightning,
        Self::Time,
        Self::Gravity,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buff => "buff",
            Self::Debuff => "debuff",
            Self::Shield => "shield",
            Self::Fire => "fire",
            Self::Ice => "ice",
            Self::Water => "water",
            Self::Earth => "earth",
            Self::Air => "air",
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Lightning => "lightning",
            Self::Time => "time",
            Self::Gravity => "gravity",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`Tag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagSet(u16);

impl TagSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a slice.
    #[must_use]
    pub const fn of(tags: &[Tag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < tags.len() {
            bits |= tags[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Add a tag.
    pub fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    /// Remove a tag.
    pub fn remove(&mut self, tag: Tag) {
        self.0 &= !tag.bit();
    }

    /// Check membership of a single tag.
    #[must_use]
    pub const fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Check that every tag of `other` is present.
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of tags in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate tags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }
}

impl From<Tag> for TagSet {
    fn from(tag: Tag) -> Self {
        Self(tag.bit())
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl BitOr for TagSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Tag> for TagSet {
    type Output = Self;

    fn bitor(self, rhs: Tag) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOrAssign<Tag> for TagSet {
    fn bitor_assign(&mut self, rhs: Tag) {
        self.insert(rhs);
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        f.write_str("[")?;
        for tag in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(tag.name())?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bits_are_distinct() {
        let all: TagSet = Tag::ALL.into_iter().collect();
        assert_eq!(all.len(), Tag::ALL.len());
    }

    #[test]
    fn test_contains_all() {
        let set = TagSet::of(&[Tag::Debuff, Tag::Water]);
        assert!(set.contains(Tag::Water));
        assert!(set.contains_all(TagSet::of(&[Tag::Water, Tag::Debuff])));
        assert!(!set.contains_all(TagSet::of(&[Tag::Ice, Tag::Debuff])));
        assert!(set.contains_all(TagSet::EMPTY));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = TagSet::from(Tag::Buff);
        set |= Tag::Shield;
        assert_eq!(set, TagSet::of(&[Tag::Shield, Tag::Buff]));
        set.remove(Tag::Buff);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Tag::Shield]);
    }

    #[test]
    fn test_display() {
        let set = TagSet::of(&[Tag::Fire, Tag::Debuff]);
        assert_eq!(set.to_string(), "[debuff, fire]");
    }
}
