use crate::types::{Appointment, AppointmentId};
use chrono::Utc;

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Next free id: the current time in milliseconds, bumped past every id
/// already in the list so two creations in the same millisecond can't clash.
pub fn fresh_id(now_millis: i64, existing: &[Appointment]) -> AppointmentId {
    let floor = existing.iter().map(|a| a.id.0.saturating_add(1)).max();
    AppointmentId(floor.map_or(now_millis, |floor| floor.max(now_millis)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::appointment;

    #[test]
    fn test_fresh_id_uses_clock_on_empty_list() {
        assert_eq!(fresh_id(1_700_000_000_000, &[]), AppointmentId(1_700_000_000_000));
    }

    #[test]
    fn test_fresh_id_never_collides() {
        let existing = vec![appointment(1_700_000_000_000)];
        assert_eq!(
            fresh_id(1_700_000_000_000, &existing),
            AppointmentId(1_700_000_000_001)
        );
        assert_eq!(
            fresh_id(1_600_000_000_000, &existing),
            AppointmentId(1_700_000_000_001)
        );
        assert_eq!(
            fresh_id(1_800_000_000_000, &existing),
            AppointmentId(1_800_000_000_000)
        );
    }
}
