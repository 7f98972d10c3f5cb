//! Toast-style notices shown to the operator.
//!
//! Most notices are posted immediately. A notice can also be scheduled for a
//! later instant; it stays pending until the board is ticked at or after its
//! due time.

use chrono::{DateTime, Duration, Local};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_at: DateTime<Local>,
    notice: Notice,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    visible: Vec<Notice>,
    scheduled: Vec<Scheduled>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, notice: Notice) {
        debug!(title = %notice.title, "notice posted");
        self.visible.push(notice);
    }

    /// Deliver `notice` once `delay` has passed since `now`.
    ///
    /// A due time past the end of the representable range is delivered on the
    /// next tick.
    pub fn post_after(&mut self, notice: Notice, now: DateTime<Local>, delay: Duration) {
        self.scheduled.push(Scheduled {
            due_at: now.checked_add_signed(delay).unwrap_or(now),
            notice,
        });
    }

    /// Move every scheduled notice due at `now` onto the board, in due order.
    ///
    /// Returns how many were delivered.
    pub fn tick(&mut self, now: DateTime<Local>) -> usize {
        let (mut due, waiting): (Vec<Scheduled>, Vec<Scheduled>) = self
            .scheduled
            .drain(..)
            .partition(|s| s.due_at <= now);
        self.scheduled = waiting;
        due.sort_by_key(|s| s.due_at);

        let delivered = due.len();
        for scheduled in due {
            self.post(scheduled.notice);
        }
        delivered
    }

    pub fn visible(&self) -> &[Notice] {
        &self.visible
    }

    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }

    /// Take every visible notice, leaving the board empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_notice_waits_for_its_due_time() {
        let now = crate::seed::fixed_now();
        let mut board = NoticeBoard::new();
        board.post(Notice::new("Calling patient", "Calling Ana"));
        board.post_after(Notice::new("Patient contacted", "Ana confirmed"), now, Duration::seconds(2));

        assert_eq!(board.visible().len(), 1);
        assert_eq!(board.tick(now + Duration::seconds(1)), 0);
        assert_eq!(board.pending(), 1);

        assert_eq!(board.tick(now + Duration::seconds(2)), 1);
        assert_eq!(board.pending(), 0);
        let titles: Vec<String> = board.drain().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Calling patient", "Patient contacted"]);
        assert!(board.visible().is_empty());
    }

    #[test]
    fn unrepresentable_due_time_does_not_panic() {
        let now = crate::seed::fixed_now();
        let mut board = NoticeBoard::new();
        board.post_after(Notice::new("late", ""), now, Duration::days(365_000_000));

        assert_eq!(board.pending(), 1);
        assert_eq!(board.tick(now), 1);
    }

    #[test]
    fn due_notices_are_delivered_in_due_order() {
        let now = crate::seed::fixed_now();
        let mut board = NoticeBoard::new();
        board.post_after(Notice::new("second", ""), now, Duration::seconds(3));
        board.post_after(Notice::new("first", ""), now, Duration::seconds(1));

        assert_eq!(board.tick(now + Duration::seconds(5)), 2);
        assert_eq!(board.visible()[0].title, "first");
        assert_eq!(board.visible()[1].title, "second");
    }
}
