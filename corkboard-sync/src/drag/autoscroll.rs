//! Edge auto-scroll while a drag is in flight.
//!
//! While the pointer sits inside the edge zone of a scrollable container,
//! the container scrolls continuously, speeding up the longer the pointer
//! dwells there, capped at a maximum rate. The instant the pointer leaves
//! the zone (or the session ends) scrolling halts.
//!
//! Pure computation over caller-supplied instants: the embedder calls
//! [`AutoScroll::velocity`] from its frame tick and applies the returned
//! scroll delta itself.

use std::time::Instant;

/// Distance from a viewport edge that activates scrolling
pub const EDGE_ZONE_PX: f64 = 48.0;

/// Scroll speed on entering the zone, in px per tick
pub const BASE_SCROLL_SPEED: f64 = 4.0;

/// Speed gained per second of dwell in the zone, in px per tick
pub const SCROLL_ACCEL_PER_SEC: f64 = 16.0;

/// Speed cap, in px per tick
pub const MAX_SCROLL_SPEED: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// Toward the container start (up / left)
    Start,
    /// Toward the container end (down / right)
    End,
}

/// Dwell tracker for one scrollable container
#[derive(Debug, Default)]
pub struct AutoScroll {
    dwell: Option<(Zone, Instant)>,
}

impl AutoScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll velocity for this tick, in px (negative scrolls toward the
    /// container start).
    ///
    /// `offset` is the pointer coordinate along the scroll axis relative to
    /// the viewport start; `extent` is the viewport length on that axis.
    pub fn velocity(&mut self, offset: f64, extent: f64, now: Instant) -> f64 {
        let zone = if offset < EDGE_ZONE_PX {
            Some(Zone::Start)
        } else if offset > extent - EDGE_ZONE_PX {
            Some(Zone::End)
        } else {
            None
        };

        let Some(zone) = zone else {
            self.dwell = None;
            return 0.0;
        };

        // Switching edges restarts the ramp.
        let since = match self.dwell {
            Some((current, since)) if current == zone => since,
            _ => {
                self.dwell = Some((zone, now));
                now
            }
        };

        let dwell_secs = now.saturating_duration_since(since).as_secs_f64();
        let speed = (BASE_SCROLL_SPEED + dwell_secs * SCROLL_ACCEL_PER_SEC).min(MAX_SCROLL_SPEED);
        match zone {
            Zone::Start => -speed,
            Zone::End => speed,
        }
    }

    /// Halt immediately (pointer left the container, session ended).
    pub fn reset(&mut self) {
        self.dwell = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_idle_outside_edge_zones() {
        let mut scroll = AutoScroll::new();
        assert_eq!(scroll.velocity(300.0, 600.0, Instant::now()), 0.0);
    }

    #[test]
    fn test_base_speed_on_entry() {
        let mut scroll = AutoScroll::new();
        let now = Instant::now();
        assert_eq!(scroll.velocity(10.0, 600.0, now), -BASE_SCROLL_SPEED);
        assert_eq!(scroll.velocity(590.0, 600.0, now), BASE_SCROLL_SPEED);
    }

    #[test]
    fn test_accelerates_with_dwell_up_to_cap() {
        let mut scroll = AutoScroll::new();
        let start = Instant::now();
        let slow = scroll.velocity(590.0, 600.0, start);
        let faster = scroll.velocity(590.0, 600.0, start + Duration::from_millis(500));
        assert!(faster > slow);

        let capped = scroll.velocity(590.0, 600.0, start + Duration::from_secs(60));
        assert_eq!(capped, MAX_SCROLL_SPEED);
    }

    #[test]
    fn test_halts_the_tick_the_pointer_leaves() {
        let mut scroll = AutoScroll::new();
        let start = Instant::now();
        scroll.velocity(10.0, 600.0, start);
        assert_eq!(
            scroll.velocity(300.0, 600.0, start + Duration::from_secs(2)),
            0.0
        );

        // Re-entering starts the ramp over.
        let back = scroll.velocity(10.0, 600.0, start + Duration::from_secs(3));
        assert_eq!(back, -BASE_SCROLL_SPEED);
    }

    #[test]
    fn test_switching_edges_restarts_ramp() {
        let mut scroll = AutoScroll::new();
        let start = Instant::now();
        scroll.velocity(10.0, 600.0, start);
        let switched = scroll.velocity(590.0, 600.0, start + Duration::from_secs(5));
        assert_eq!(switched, BASE_SCROLL_SPEED);
    }
}
