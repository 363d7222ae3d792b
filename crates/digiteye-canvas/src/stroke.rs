//! The transient state of one pointer-down-to-pointer-up gesture.

use crate::geometry::Point;

/// An in-progress stroke. Exists only while the pointer is down.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSession {
    path: Vec<Point>,
}

impl StrokeSession {
    pub fn begin(at: Point) -> Self {
        Self { path: vec![at] }
    }

    /// The most recent point of the path.
    pub fn last(&self) -> Point {
        // `path` is never empty: it starts with the begin point and only grows.
        self.path[self.path.len() - 1]
    }

    /// Append `to`, returning the segment that must be rendered.
    pub fn extend(&mut self, to: Point) -> (Point, Point) {
        let from = self.last();
        self.path.push(to);
        (from, to)
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn segment_count(&self) -> usize {
        self.path.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_accumulates_path() {
        let mut session = StrokeSession::begin(Point::new(1.0, 2.0));
        assert_eq!(session.segment_count(), 0);

        let seg = session.extend(Point::new(5.0, 6.0));
        assert_eq!(seg, (Point::new(1.0, 2.0), Point::new(5.0, 6.0)));

        let seg = session.extend(Point::new(9.0, 9.0));
        assert_eq!(seg.0, Point::new(5.0, 6.0));
        assert_eq!(session.last(), Point::new(9.0, 9.0));
        assert_eq!(session.path().len(), 3);
        assert_eq!(session.segment_count(), 2);
    }
}
