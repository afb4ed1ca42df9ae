//! Selection engine.
//!
//! Selection is a set of item ids held apart from the items themselves.
//! The marquee is tracked in screen pixels and converted to world space
//! only when it completes, so panning mid-gesture can't skew it.

use std::collections::BTreeSet;
use wb_core::model::Item;
use wb_core::{ItemId, Point, Rect, ViewTransform};
use wb_render::hit_test_rect;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Marquee {
    start: Point,
    end: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<ItemId>,
    marquee: Option<Marquee>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `id`. Without `multi` the rest of the selection is dropped
    /// first, so a plain click always leaves exactly `id` selected.
    pub fn select_item(&mut self, id: ItemId, multi: bool) {
        if !multi {
            self.ids.clear();
        }
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Replace the selection.
    pub fn select_items(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn select_all(&mut self, items: &[Item]) {
        self.select_items(items.iter().map(|i| i.id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<ItemId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected items in `items` order.
    pub fn selected_items<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|i| self.ids.contains(&i.id)).collect()
    }

    /// Selected ids in `items` order.
    pub fn selected_ids(&self, items: &[Item]) -> Vec<ItemId> {
        self.selected_items(items).into_iter().map(|i| i.id).collect()
    }

    /// Forget ids no longer present in `items`.
    pub fn retain_existing(&mut self, items: &[Item]) {
        self.ids.retain(|id| items.iter().any(|i| i.id == *id));
    }

    // ─── Marquee ─────────────────────────────────────────────────────────

    pub fn start_box(&mut self, screen: Point) {
        self.marquee = Some(Marquee {
            start: screen,
            end: screen,
        });
    }

    pub fn update_box(&mut self, screen: Point) {
        if let Some(m) = &mut self.marquee {
            m.end = screen;
        }
    }

    /// Finish the marquee: select every item whose bounds intersect it.
    /// Returns the new selection, or `None` when no marquee was active.
    pub fn end_box(&mut self, items: &[Item], view: &ViewTransform) -> Option<Vec<ItemId>> {
        let m = self.marquee.take()?;
        let world = Rect::from_points(view.to_world(m.start), view.to_world(m.end));
        let hits = hit_test_rect(items, world);
        self.select_items(hits.iter().copied());
        log::trace!("box selected {} item(s)", hits.len());
        Some(hits)
    }

    pub fn cancel_box(&mut self) {
        self.marquee = None;
    }

    pub fn is_box_selecting(&self) -> bool {
        self.marquee.is_some()
    }

    /// Normalized screen-space marquee.
    pub fn box_rect(&self) -> Option<Rect> {
        self.marquee.map(|m| Rect::from_points(m.start, m.end))
    }
}
