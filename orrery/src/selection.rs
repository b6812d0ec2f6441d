//! Selection channel between clickable bodies and the camera controller
//!
//! Bodies publish `select` when clicked; the overlay and the controller
//! publish `clear`. The channel holds the single current selection and
//! queues the events so the controller can react to every change exactly
//! once, on its next update.

use glam::Vec3;
use std::collections::VecDeque;

use crate::registry::BodyId;

/// The currently focused body. Carries no position: the live position is
/// always looked up through [`LivePositions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub body: BodyId,
    pub visual_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    Selected(Selection),
    Cleared,
}

/// Read access to the current-frame position of any body.
pub trait LivePositions {
    fn live_position(&self, body: BodyId) -> Option<Vec3>;
}

#[derive(Debug, Default)]
pub struct SelectionChannel {
    current: Option<Selection>,
    pending: VecDeque<SelectionEvent>,
}

impl SelectionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `body`, replacing any previous selection.
    pub fn select(&mut self, body: BodyId, visual_radius: f32) {
        let selection = Selection { body, visual_radius };
        log::debug!("Selected {body}");
        self.current = Some(selection);
        self.pending.push_back(SelectionEvent::Selected(selection));
    }

    /// Empty the slot. Clearing an empty channel publishes nothing.
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            log::debug!("Cleared selection of {}", previous.body);
            self.pending.push_back(SelectionEvent::Cleared);
        }
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Take every event published since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = SelectionEvent> + '_ {
        self.pending.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EARTH, MARS};

    #[test]
    fn select_replaces_previous_selection() {
        let mut channel = SelectionChannel::new();
        channel.select(EARTH, 1.5);
        channel.select(MARS, 1.0);

        assert_eq!(channel.current().map(|s| s.body), Some(MARS));
        let events: Vec<_> = channel.drain_events().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SelectionEvent::Selected(s) if s.body == MARS));
    }

    #[test]
    fn clear_on_empty_channel_is_silent() {
        let mut channel = SelectionChannel::new();
        channel.clear();
        assert!(channel.is_empty());
        assert_eq!(channel.drain_events().count(), 0);
    }

    #[test]
    fn drain_empties_queue_but_keeps_slot() {
        let mut channel = SelectionChannel::new();
        channel.select(EARTH, 1.5);
        assert_eq!(channel.drain_events().count(), 1);
        assert_eq!(channel.drain_events().count(), 0);
        assert!(!channel.is_empty());

        channel.clear();
        let events: Vec<_> = channel.drain_events().collect();
        assert_eq!(events, vec![SelectionEvent::Cleared]);
    }
}
