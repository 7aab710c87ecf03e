//! Notification Service
//!
//! Append-only broadcast feed per society. Read marks are a set-valued
//! relation keyed by (notification_id, member_id) so membership checks
//! and updates stay O(1) instead of scanning an array on each message.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::types::{Notification, NotificationView};

const FEED_LIMIT: usize = 100;

#[derive(Clone)]
pub struct NotificationService {
    feed: Arc<DashMap<Uuid, Notification>>,
    /// (notification_id, member_id) -> read-at instant
    read_marks: Arc<DashMap<(Uuid, Uuid), DateTime<Utc>>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            feed: Arc::new(DashMap::new()),
            read_marks: Arc::new(DashMap::new()),
        }
    }

    /// Broadcast a message to a society.
    pub fn broadcast(&self, society_id: Uuid, created_by: Uuid, message: &str) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            society_id,
            message: message.to_string(),
            created_by,
            created_at: Utc::now(),
        };
        self.feed.insert(notification.id, notification.clone());

        info!(society_id = %society_id, notification_id = %notification.id, "Notification broadcast");
        notification
    }

    /// Society feed, newest first, with the member's read flags resolved.
    pub fn feed_for(&self, society_id: Uuid, member_id: Uuid) -> Vec<NotificationView> {
        let mut items: Vec<Notification> = self
            .feed
            .iter()
            .filter(|n| n.value().society_id == society_id)
            .map(|n| n.value().clone())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(FEED_LIMIT);

        items
            .into_iter()
            .map(|notification| {
                let read = self
                    .read_marks
                    .contains_key(&(notification.id, member_id));
                NotificationView { notification, read }
            })
            .collect()
    }

    /// Record read marks for the member. Unknown ids are ignored.
    pub fn mark_read(&self, member_id: Uuid, notification_ids: &[Uuid]) {
        let now = Utc::now();
        for id in notification_ids {
            if self.feed.contains_key(id) {
                self.read_marks.insert((*id, member_id), now);
            }
        }
    }

    /// Unread notifications in the member's society feed.
    pub fn unread_count(&self, society_id: Uuid, member_id: Uuid) -> usize {
        self.feed
            .iter()
            .filter(|n| n.value().society_id == society_id)
            .filter(|n| !self.read_marks.contains_key(&(n.value().id, member_id)))
            .count()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
