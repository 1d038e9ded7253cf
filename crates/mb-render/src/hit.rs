//! Hit testing: scene point / rectangle → canvas items.
//!
//! Items are passed in z-order, back to front. The topmost hit is the last
//! item in that order whose geometry contains the point.

use kurbo::{Point, Rect};
use mb_core::id::CanvasItemId;
use mb_core::item::CanvasItem;

/// Find the topmost item at `pt`. `None` means the background was hit.
pub fn hit_test<'a, I>(items: I, pt: Point) -> Option<CanvasItemId>
where
    I: IntoIterator<Item = &'a CanvasItem>,
    I::IntoIter: DoubleEndedIterator,
{
    // Last painted = topmost
    items
        .into_iter()
        .rev()
        .find(|item| item.contains(pt))
        .map(|item| item.id)
}

/// All items whose bounds intersect `rect`, in z-order.
/// Used for rubber-band selection.
pub fn hit_test_rect<'a>(
    items: impl IntoIterator<Item = &'a CanvasItem>,
    rect: Rect,
) -> Vec<CanvasItemId> {
    items
        .into_iter()
        .filter(|item| item.intersects(rect))
        .map(|item| item.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use mb_core::config::CanvasSettings;
    use mb_core::measure::FixedSizer;
    use mb_core::model::{CanvasItemRecord, Node};

    fn item_at(x: f64, y: f64) -> CanvasItem {
        let sizer = FixedSizer::new(Size::new(100.0, 100.0), &CanvasSettings::default());
        let node = Node::image("/tmp/hit.png");
        let record = CanvasItemRecord::new(node.id, Point::new(x, y), 1.0);
        CanvasItem::from_record(&record, &node, &sizer).unwrap()
    }

    #[test]
    fn topmost_wins_on_overlap() {
        let back = item_at(0.0, 0.0);
        let front = item_at(50.0, 50.0);
        let items = [back.clone(), front.clone()];

        assert_eq!(hit_test(&items, Point::new(75.0, 75.0)), Some(front.id));
        assert_eq!(hit_test(&items, Point::new(10.0, 10.0)), Some(back.id));
        assert_eq!(hit_test(&items, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn rect_collects_intersecting_in_order() {
        let a = item_at(0.0, 0.0);
        let b = item_at(200.0, 0.0);
        let c = item_at(400.0, 400.0);
        let items = [a.clone(), b.clone(), c];

        let hits = hit_test_rect(&items, Rect::new(50.0, 50.0, 250.0, 60.0));
        assert_eq!(hits, vec![a.id, b.id]);
        assert!(hit_test_rect(&items, Rect::new(600.0, 0.0, 700.0, 10.0)).is_empty());
    }
}
