//! Extension's to Smithay's geometry module.

use std::cmp;

use smithay::utils::{Point, Rectangle, Size};

pub trait Vector: Sized {
    /// Compare and return the smaller of each individual dimensions.
    fn min(&self, other: impl Into<Self>) -> Self;

    /// Compare and return the bigger of each individual dimensions.
    fn max(&self, other: impl Into<Self>) -> Self;
}

/// Helper trait for converting into a 2D vector.
pub trait IntoVector {
    fn as_vector(&self) -> (i32, i32);
}

impl<K> IntoVector for Point<i32, K> {
    fn as_vector(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl<K> IntoVector for Size<i32, K> {
    fn as_vector(&self) -> (i32, i32) {
        (self.w, self.h)
    }
}

impl<T> Vector for T
where
    T: IntoVector,
    T: From<(i32, i32)>,
{
    fn min(&self, other: impl Into<Self>) -> Self {
        let tuple = self.as_vector();
        let other = other.into().as_vector();
        Self::from((cmp::min(tuple.0, other.0), cmp::min(tuple.1, other.1)))
    }

    fn max(&self, other: impl Into<Self>) -> Self {
        let tuple = self.as_vector();
        let other = other.into().as_vector();
        Self::from((cmp::max(tuple.0, other.0), cmp::max(tuple.1, other.1)))
    }
}

/// Edge manipulation for floating point rectangles.
///
/// Moving an edge keeps the opposite edge in place, so the size changes
/// by the distance the edge was moved.
pub trait RectangleEdges {
    fn center(&self) -> (f64, f64);
    fn set_top(&mut self, top: f64);
    fn set_bottom(&mut self, bottom: f64);
    fn set_left(&mut self, left: f64);
    fn set_right(&mut self, right: f64);
}

impl<K> RectangleEdges for Rectangle<f64, K> {
    fn center(&self) -> (f64, f64) {
        (self.loc.x + self.size.w / 2., self.loc.y + self.size.h / 2.)
    }

    fn set_top(&mut self, top: f64) {
        self.size.h += self.loc.y - top;
        self.loc.y = top;
    }

    fn set_bottom(&mut self, bottom: f64) {
        self.size.h = bottom - self.loc.y;
    }

    fn set_left(&mut self, left: f64) {
        self.size.w += self.loc.x - left;
        self.loc.x = left;
    }

    fn set_right(&mut self, right: f64) {
        self.size.w = right - self.loc.x;
    }
}
