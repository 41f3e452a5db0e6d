//! Edge contact detection
//!
//! Decides whether two widgets sit edge-to-edge closely enough to be
//! attached. The attachment graph itself never looks at geometry; this is
//! the helper callers use before calling `attach`.

use std::cmp::Ordering;

use super::types::{BoundingBox, WidgetId};

/// Side of the reference widget a neighbour touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// A neighbour whose edge lies within tolerance of the reference widget
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: WidgetId,
    pub side: Side,
    /// Absolute distance between the facing edges
    pub distance: f64,
}

/// Closest facing edge pair between `a` and `b`, if within `tolerance`.
///
/// The boxes must overlap on the perpendicular axis; corner-to-corner
/// proximity does not count. Slight overlaps (up to `tolerance`) still
/// count as contact since dragged widgets rarely land exactly.
pub fn contact(a: &BoundingBox, b: &BoundingBox, tolerance: f64) -> Option<(Side, f64)> {
    let overlap_y = a.y < b.bottom() && b.y < a.bottom();
    let overlap_x = a.x < b.right() && b.x < a.right();

    let mut candidates = Vec::with_capacity(4);
    if overlap_y {
        candidates.push((Side::Right, (b.x - a.right()).abs()));
        candidates.push((Side::Left, (a.x - b.right()).abs()));
    }
    if overlap_x {
        candidates.push((Side::Bottom, (b.y - a.bottom()).abs()));
        candidates.push((Side::Top, (a.y - b.bottom()).abs()));
    }

    candidates
        .into_iter()
        .filter(|(_, distance)| *distance <= tolerance)
        .min_by(|x, y| x.1.total_cmp(&y.1))
}

/// Every candidate touching `target`, nearest first (ties by id)
pub fn find_contacts<'a, I>(target: &BoundingBox, candidates: I, tolerance: f64) -> Vec<Contact>
where
    I: IntoIterator<Item = (&'a WidgetId, BoundingBox)>,
{
    let mut contacts: Vec<Contact> = candidates
        .into_iter()
        .filter_map(|(id, bounds)| {
            contact(target, &bounds, tolerance).map(|(side, distance)| Contact {
                id: id.clone(),
                side,
                distance,
            })
        })
        .collect();

    contacts.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_right_neighbor() {
        let a = BoundingBox::new(0.0, 0.0, 200.0, 120.0);
        let b = BoundingBox::new(200.0, 20.0, 100.0, 50.0);
        assert_eq!(contact(&a, &b, 15.0), Some((Side::Right, 0.0)));
        assert_eq!(contact(&b, &a, 15.0), Some((Side::Left, 0.0)));
    }

    #[test]
    fn test_gap_within_tolerance() {
        let a = BoundingBox::new(0.0, 0.0, 200.0, 120.0);
        let below = BoundingBox::new(50.0, 130.0, 100.0, 50.0);
        assert_eq!(contact(&a, &below, 15.0), Some((Side::Bottom, 10.0)));
        assert_eq!(contact(&a, &below, 5.0), None);
    }

    #[test]
    fn test_corner_proximity_is_not_contact() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let diagonal = BoundingBox::new(105.0, 105.0, 100.0, 100.0);
        assert_eq!(contact(&a, &diagonal, 15.0), None);
    }

    #[test]
    fn test_deep_overlap_is_not_contact() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let inside = BoundingBox::new(30.0, 30.0, 40.0, 40.0);
        assert_eq!(contact(&a, &inside, 15.0), None);
    }

    #[test]
    fn test_find_contacts_sorted_by_distance() {
        let target = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let near = WidgetId::new("near");
        let far = WidgetId::new("far");
        let away = WidgetId::new("away");
        let candidates = vec![
            (&far, BoundingBox::new(112.0, 0.0, 50.0, 50.0)),
            (&near, BoundingBox::new(0.0, 102.0, 50.0, 50.0)),
            (&away, BoundingBox::new(500.0, 0.0, 50.0, 50.0)),
        ];

        let contacts = find_contacts(&target, candidates, 15.0);
        let ids: Vec<&str> = contacts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert_eq!(contacts[0].side, Side::Bottom);
    }
}
