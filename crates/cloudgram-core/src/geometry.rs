//! Geometric primitives for diagram layout and positioning.
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Cloudgram uses the SVG coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use cloudgram_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(p1.sub_point(p2).y(), 15.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Euclidean length of the vector from the origin to this point.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Treats the point as the center of a box of the given size.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Component-wise maximum of two sizes.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Stacks `other` below `self`: heights add up, widths take the maximum.
    pub fn merge_vertical(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height + other.height,
        }
    }
}

/// A rectangular bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Grows the bounds outward by the given insets.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left,
            min_y: self.min_y - insets.top,
            max_x: self.max_x + insets.right,
            max_y: self.max_y + insets.bottom,
        }
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }
}

/// Padding values for the four sides of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

/// Finds where the ray from `a` towards `b` leaves a rectangle of `a_size`
/// centered at `a`.
///
/// Returns `b` when the two points coincide.
pub fn rectangle_intersection(a: Point, b: Point, a_size: Size) -> Point {
    let half_width = a_size.width() / 2.0;
    let half_height = a_size.height() / 2.0;

    let dist = b.sub_point(a);
    let length = dist.hypot();
    if length < 0.001 {
        return b;
    }

    let dx_norm = dist.x() / length;
    let dy_norm = dist.y() / length;

    // Distance along the ray to the first horizontal and vertical edge hit
    let t_horizontal = if dy_norm.abs() > f32::EPSILON {
        half_height / dy_norm.abs()
    } else {
        f32::MAX
    };
    let t_vertical = if dx_norm.abs() > f32::EPSILON {
        half_width / dx_norm.abs()
    } else {
        f32::MAX
    };

    let t = t_horizontal.min(t_vertical);
    Point::new(dx_norm.mul_add(t, a.x()), dy_norm.mul_add(t, a.y()))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_to_bounds() {
        let bounds = Point::new(10.0, 20.0).to_bounds(Size::new(6.0, 8.0));
        assert_eq!(bounds.min_x(), 7.0);
        assert_eq!(bounds.min_y(), 16.0);
        assert_eq!(bounds.max_x(), 13.0);
        assert_eq!(bounds.max_y(), 24.0);
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Bounds::new_from_top_left(Point::new(20.0, -5.0), Size::new(5.0, 5.0));
        let merged = a.merge(&b);
        assert_eq!(merged.min_x(), 0.0);
        assert_eq!(merged.min_y(), -5.0);
        assert_eq!(merged.max_x(), 25.0);
        assert_eq!(merged.max_y(), 10.0);
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
    }

    #[test]
    fn test_bounds_add_padding() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(10.0, 10.0))
            .add_padding(Insets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(bounds.min_x(), 6.0);
        assert_eq!(bounds.min_y(), 9.0);
        assert_eq!(bounds.max_x(), 22.0);
        assert_eq!(bounds.max_y(), 23.0);
    }

    #[test]
    fn test_bounds_to_size_max() {
        let bounds = Bounds::new_from_top_left(Point::new(5.0, 5.0), Size::new(30.0, 10.0));
        let widest = bounds.to_size().max(Size::new(40.0, 2.0));
        assert_eq!(widest, Size::new(40.0, 10.0));
    }

    #[test]
    fn test_size_merge_vertical() {
        let merged = Size::new(10.0, 5.0).merge_vertical(Size::new(20.0, 7.0));
        assert_eq!(merged, Size::new(20.0, 12.0));
    }

    #[test]
    fn test_rectangle_intersection_horizontal() {
        let hit = rectangle_intersection(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Size::new(20.0, 10.0),
        );
        assert_approx_eq!(f32, hit.x(), 10.0);
        assert_approx_eq!(f32, hit.y(), 0.0);
    }

    #[test]
    fn test_rectangle_intersection_diagonal_hits_top_edge() {
        let hit = rectangle_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, -100.0),
            Size::new(40.0, 20.0),
        );
        assert_approx_eq!(f32, hit.y(), -10.0, epsilon = 0.001);
        assert!(hit.x() > 0.0 && hit.x() < 20.0);
    }

    #[test]
    fn test_rectangle_intersection_same_point() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(rectangle_intersection(p, p, Size::new(10.0, 10.0)), p);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn bounds_merge_is_commutative(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            prop_assert_eq!(b1.merge(&b2), b2.merge(&b1));
        }

        #[test]
        fn intersection_lies_on_rectangle_boundary(
            a in point_strategy(),
            b in point_strategy(),
            w in 1.0f32..200.0,
            h in 1.0f32..200.0,
        ) {
            prop_assume!(b.sub_point(a).hypot() > 1.0);
            let hit = rectangle_intersection(a, b, Size::new(w, h));
            let dx = (hit.x() - a.x()).abs();
            let dy = (hit.y() - a.y()).abs();
            let on_vertical_edge = (dx - w / 2.0).abs() < 0.05 && dy <= h / 2.0 + 0.05;
            let on_horizontal_edge = (dy - h / 2.0).abs() < 0.05 && dx <= w / 2.0 + 0.05;
            prop_assert!(on_vertical_edge || on_horizontal_edge);
        }
    }
}
