// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar query bounds
//!
//! Axis-aligned rectangles in map coordinates, used both for query regions and
//! for tile extents. The buffer operation widens a query region so tiles near
//! its edges are picked up as well.

use crate::error::{Error, Result};

/// Axis-aligned rectangle (xmin, ymin, xmax, ymax)
///
/// Fields are public so tile tables can be loaded without per-row checks;
/// [`BoundingBox::new`] and [`BoundingBox::validate`] enforce ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Create an ordered bounding box
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        let bbox = Self {
            xmin,
            ymin,
            xmax,
            ymax,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Build from two arbitrary corner points, ordering the coordinates
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Result<Self> {
        Self::new(a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1))
    }

    /// Check that all values are finite and min <= max on both axes
    pub fn validate(&self) -> Result<()> {
        if ![self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::InvalidBoundingBox(format!(
                "non-finite coordinate in {:?}",
                self
            )));
        }
        if self.xmin > self.xmax {
            return Err(Error::InvalidBoundingBox(format!(
                "xmin {} > xmax {}",
                self.xmin, self.xmax
            )));
        }
        if self.ymin > self.ymax {
            return Err(Error::InvalidBoundingBox(format!(
                "ymin {} > ymax {}",
                self.ymin, self.ymax
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Center of the rectangle
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// Closed containment test (edges count as inside)
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Strict overlap test
    ///
    /// Boxes that only share an edge or a corner do not overlap.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    /// Expand the box by a proportional margin on each axis
    ///
    /// The half-extent along x is scaled by `margin` and moved outwards on both
    /// sides, and likewise along y. A margin of 0 returns the box unchanged.
    ///
    /// # Errors
    /// `InvalidMargin` for negative or non-finite margins, `InvalidBoundingBox`
    /// when `self` is not ordered.
    pub fn buffered(&self, margin: f64) -> Result<BoundingBox> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::InvalidMargin(margin));
        }
        self.validate()?;

        let dx = self.width() / 2.0 * margin;
        let dy = self.height() / 2.0 * margin;

        Ok(BoundingBox {
            xmin: self.xmin - dx,
            ymin: self.ymin - dy,
            xmax: self.xmax + dx,
            ymax: self.ymax + dy,
        })
    }

    /// Counter-clockwise ring of the four corners, starting at (xmin, ymin)
    pub fn to_polygon(&self) -> [(f64, f64); 4] {
        [
            (self.xmin, self.ymin),
            (self.xmax, self.ymin),
            (self.xmax, self.ymax),
            (self.xmin, self.ymax),
        ]
    }
}
