use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the two participants in a game
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::A => write!(f, "Team A"),
            Self::B => write!(f, "Team B"),
        }
    }
}

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamBundle<T> {
    pub a: T,
    pub b: T,
}

impl<T> TeamBundle<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        self.into_iter()
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> TeamBundle<U> {
        TeamBundle {
            a: f(self.a),
            b: f(self.b),
        }
    }
}

impl<T> Index<Side> for TeamBundle<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

impl<T> IndexMut<Side> for TeamBundle<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}

impl<T: Display> Display for TeamBundle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "A: {}, B: {}", self.a, self.b)
    }
}

pub struct TeamBundleIterator<'a, T> {
    bundle: &'a TeamBundle<T>,
    index: usize,
}

impl<'a, T> Iterator for TeamBundleIterator<'a, T> {
    type Item = (Side, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let value = match self.index {
            0 => (Side::A, &self.bundle.a),
            1 => (Side::B, &self.bundle.b),
            _ => return None,
        };

        self.index += 1;
        Some(value)
    }
}

impl<'a, T> IntoIterator for &'a TeamBundle<T> {
    type Item = (Side, &'a T);
    type IntoIter = TeamBundleIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        TeamBundleIterator {
            bundle: self,
            index: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index_by_side() {
        let mut scores = TeamBundle::new(3u32, 7);
        assert_eq!(scores[Side::A], 3);
        assert_eq!(scores[Side::B], 7);

        scores[Side::B] += 3;
        assert_eq!(scores, TeamBundle { a: 3, b: 10 });
        assert_eq!(format!("{scores}"), "A: 3, B: 10");
    }

    #[test]
    fn test_iter_order() {
        let names = TeamBundle::new("NightOwl", "CozyBear");
        let collected: Vec<_> = names.iter().collect();
        assert_eq!(
            collected,
            vec![(Side::A, &"NightOwl"), (Side::B, &"CozyBear")]
        );
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }
}
