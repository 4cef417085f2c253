//! Planned sequence of waypoints.

use std::collections::VecDeque;
use thicket_core::Coord;

/// Waypoints from just after the start up to and including the goal.
///
/// An empty route means "nowhere to go": the goal was reached, was the
/// start, or is unreachable. Iteration does not consume the route, so it
/// can be walked any number of times; [`pop_front`](Self::pop_front)
/// consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    waypoints: VecDeque<Coord>,
}

impl Route {
    /// A route with no waypoints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of waypoints left.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether no waypoints are left.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The next waypoint.
    pub fn front(&self) -> Option<&Coord> {
        self.waypoints.front()
    }

    /// The final waypoint.
    pub fn goal(&self) -> Option<&Coord> {
        self.waypoints.back()
    }

    /// Remove and return the next waypoint.
    pub fn pop_front(&mut self) -> Option<Coord> {
        self.waypoints.pop_front()
    }

    /// Iterate over the remaining waypoints without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Coord> + '_ {
        self.waypoints.iter()
    }
}

impl FromIterator<Coord> for Route {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self {
            waypoints: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Coord;
    type IntoIter = std::collections::vec_deque::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

impl IntoIterator for Route {
    type Item = Coord;
    type IntoIter = std::collections::vec_deque::IntoIter<Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.into_iter()
    }
}
