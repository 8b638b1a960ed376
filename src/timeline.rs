//! Role-occupancy queries over event and interval lists.
//!
//! Two kinds of role are supported:
//!
//! - Multi-term roles (presidents) whose terms are reconstructed from
//!   `TermBegins`/`TermEnds` events, see [`is_active_in_role`].
//! - Single-interval roles (monarchs) with an explicit `[start, end]`, see
//!   [`resolve_holder`].
//!
//! Both are pure; nothing here validates the input it is given.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{Country, EventType, Monarch, President, TimelineEvent};

/// A computed term window `[begin, end)`; `end == None` is open-ended.
///
/// `end` is already shifted one millisecond before the recorded term end, so
/// a successor whose term begins at the exact instant the predecessor's term
/// ends is the only holder at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWindow {
    pub begin: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TermWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.begin && self.end.map_or(true, |end| instant < end)
    }
}

/// Compute the term windows described by an event list.
///
/// Begins and ends are sorted independently and paired by position: the i-th
/// begin closes with the i-th end. A begin with no matching end opens a window
/// that never closes; surplus ends are ignored.
///
/// Pairing by position is fragile. A missing end in the middle of a history,
/// or events entered so that begins and ends do not alternate, produce
/// windows that silently disagree with what the operator meant. Nothing here
/// reports that.
pub fn term_windows(events: &[TimelineEvent]) -> Vec<TermWindow> {
    let mut begins = dates_of_kind(events, EventType::TermBegins);
    let mut ends = dates_of_kind(events, EventType::TermEnds);
    begins.sort();
    ends.sort();

    begins
        .into_iter()
        .enumerate()
        .map(|(i, begin)| TermWindow {
            begin,
            end: ends.get(i).map(|end| *end - Duration::milliseconds(1)),
        })
        .collect()
}

/// Whether any term reconstructed from `events` contains `instant`.
pub fn is_active_in_role(instant: DateTime<Utc>, events: &[TimelineEvent]) -> bool {
    term_windows(events)
        .iter()
        .any(|window| window.contains(instant))
}

/// A holder of a single-interval role.
pub trait Tenure {
    fn tenure_start(&self) -> NaiveDate;

    /// `None` means the tenure is ongoing.
    fn tenure_end(&self) -> Option<NaiveDate>;

    /// Inclusive at both ends.
    fn holds_on(&self, date: NaiveDate) -> bool {
        date >= self.tenure_start() && self.tenure_end().map_or(true, |end| date <= end)
    }
}

impl Tenure for Monarch {
    fn tenure_start(&self) -> NaiveDate {
        self.start_reign
    }

    fn tenure_end(&self) -> Option<NaiveDate> {
        self.end_reign
    }
}

/// First holder, in list order, whose tenure contains `date`.
///
/// List order is authoritative. With overlapping tenures the earliest entry
/// in the list wins, even when a later entry's interval is tighter or more
/// recent, so callers must keep holder lists chronologically entered.
pub fn resolve_holder<H: Tenure>(date: NaiveDate, holders: &[H]) -> Option<&H> {
    holders.iter().find(|holder| holder.holds_on(date))
}

/// First president, in list order, in office at `instant`.
pub fn president_at(instant: DateTime<Utc>, presidents: &[President]) -> Option<&President> {
    presidents
        .iter()
        .find(|president| is_active_in_role(instant, &president.events))
}

/// The monarch reigning on the calendar day of `instant`.
pub fn monarch_at(instant: DateTime<Utc>, monarchs: &[Monarch]) -> Option<&Monarch> {
    resolve_holder(instant.date_naive(), monarchs)
}

/// Role holders of `country` at `instant`.
pub fn holders_at(
    country: &Country,
    instant: DateTime<Utc>,
) -> (Option<&President>, Option<&Monarch>) {
    (
        president_at(instant, &country.presidents),
        monarch_at(instant, &country.monarchs),
    )
}

fn dates_of_kind(events: &[TimelineEvent], kind: EventType) -> Vec<DateTime<Utc>> {
    events
        .iter()
        .filter(|event| event.kind == Some(kind))
        .map(|event| event.date)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dates::parse_instant;

    fn at(value: &str) -> DateTime<Utc> {
        parse_instant(value).expect("test instant should parse")
    }

    fn day(value: &str) -> NaiveDate {
        crate::models::dates::parse_date(value).expect("test date should parse")
    }

    fn event(date: &str, kind: Option<EventType>) -> TimelineEvent {
        TimelineEvent::new(at(date), kind, "event")
    }

    fn begins(date: &str) -> TimelineEvent {
        event(date, Some(EventType::TermBegins))
    }

    fn ends(date: &str) -> TimelineEvent {
        event(date, Some(EventType::TermEnds))
    }

    fn monarch(name: &str, start: &str, end: Option<&str>) -> Monarch {
        Monarch {
            name: name.to_string(),
            birth: day("1850-01-01"),
            death: None,
            start_reign: day(start),
            end_reign: end.map(day),
            death_cause: None,
            notes: None,
            image_url: None,
        }
    }

    /// Straightforward restatement of the pairing rule used as an oracle.
    fn reference_active(instant: DateTime<Utc>, events: &[TimelineEvent]) -> bool {
        let mut begins: Vec<_> = events
            .iter()
            .filter(|e| e.kind == Some(EventType::TermBegins))
            .map(|e| e.date)
            .collect();
        let mut ends: Vec<_> = events
            .iter()
            .filter(|e| e.kind == Some(EventType::TermEnds))
            .map(|e| e.date)
            .collect();
        begins.sort();
        ends.sort();
        for i in 0..begins.len() {
            let inside = match ends.get(i) {
                Some(end) => begins[i] <= instant && instant < *end - Duration::milliseconds(1),
                None => begins[i] <= instant,
            };
            if inside {
                return true;
            }
        }
        false
    }

    #[test]
    fn single_term_is_half_open() {
        let events = vec![begins("2000-01-01"), ends("2005-01-01")];
        assert!(!is_active_in_role(at("1999-12-31T23:59:59Z"), &events));
        assert!(is_active_in_role(at("2000-01-01"), &events));
        assert!(is_active_in_role(at("2004-12-31T23:59:59Z"), &events));
        assert!(!is_active_in_role(at("2005-01-01"), &events));
    }

    #[test]
    fn successor_takes_precedence_at_shared_boundary() {
        let outgoing = vec![begins("2000-01-01"), ends("2005-01-01")];
        let incoming = vec![begins("2005-01-01"), ends("2010-01-01")];
        let boundary = at("2005-01-01");
        assert!(!is_active_in_role(boundary, &outgoing));
        assert!(is_active_in_role(boundary, &incoming));
    }

    #[test]
    fn window_closes_one_millisecond_before_recorded_end() {
        let events = vec![begins("2000-01-01"), ends("2005-01-01")];
        let last_milli = at("2004-12-31T23:59:59.999Z");
        let two_before = at("2004-12-31T23:59:59.998Z");
        assert!(!is_active_in_role(last_milli, &events));
        assert!(is_active_in_role(two_before, &events));
    }

    #[test]
    fn missing_end_leaves_the_term_open() {
        let events = vec![begins("2000-01-01")];
        assert!(is_active_in_role(at("2999-01-01"), &events));
    }

    #[test]
    fn untyped_and_death_events_are_ignored() {
        let events = vec![
            event("1990-01-01", None),
            event("1995-01-01", Some(EventType::Death)),
        ];
        assert!(term_windows(&events).is_empty());
        assert!(!is_active_in_role(at("1992-01-01"), &events));
    }

    #[test]
    fn events_are_sorted_before_pairing() {
        let events = vec![
            ends("2012-01-01"),
            begins("2008-01-01"),
            ends("2004-01-01"),
            begins("2000-01-01"),
        ];
        let windows = term_windows(&events);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].begin, at("2000-01-01"));
        assert_eq!(windows[1].begin, at("2008-01-01"));
        assert!(!is_active_in_role(at("2006-01-01"), &events));
    }

    #[test]
    fn positional_pairing_mispairs_a_missing_middle_end() {
        // Three terms entered with the middle end forgotten: the second begin
        // pairs with the third term's end and the last term stays open.
        let events = vec![
            begins("2000-01-01"),
            ends("2004-01-01"),
            begins("2008-01-01"),
            begins("2016-01-01"),
            ends("2020-01-01"),
        ];
        let windows = term_windows(&events);
        assert_eq!(windows[1].begin, at("2008-01-01"));
        assert_eq!(windows[1].end, Some(at("2020-01-01") - Duration::milliseconds(1)));
        assert_eq!(windows[2].end, None);
        assert!(is_active_in_role(at("2030-01-01"), &events));
    }

    #[test]
    fn agrees_with_reference_pairing_over_generated_histories() {
        let dates = [
            "1990-01-01",
            "1994-06-15",
            "1998-01-01",
            "2001-03-03",
            "2005-01-01",
            "2009-09-09",
        ];
        let kinds = [
            None,
            Some(EventType::TermBegins),
            Some(EventType::TermEnds),
            Some(EventType::Death),
        ];
        let instants: Vec<_> = dates
            .iter()
            .flat_map(|d| {
                let t = at(d);
                [
                    t - Duration::days(1),
                    t - Duration::milliseconds(1),
                    t,
                    t + Duration::milliseconds(1),
                    t + Duration::days(1),
                ]
            })
            .collect();

        // Every assignment of an event kind to each of the first four dates,
        // plus a fixed tail, enumerates 256 histories.
        for mask in 0..256usize {
            let mut events: Vec<TimelineEvent> = (0..4)
                .map(|slot| {
                    let kind = kinds[(mask >> (slot * 2)) & 0b11];
                    event(dates[slot], kind)
                })
                .collect();
            events.push(ends(dates[4]));
            events.push(begins(dates[5]));
            events.reverse();

            for instant in &instants {
                assert_eq!(
                    is_active_in_role(*instant, &events),
                    reference_active(*instant, &events),
                    "history mask {mask} at {instant}"
                );
            }
        }
    }

    #[test]
    fn resolve_holder_prefers_list_order_over_tighter_interval() {
        let monarchs = vec![
            monarch("Elder", "1900-01-01", Some("1950-12-31")),
            monarch("Younger", "1940-01-01", Some("1990-12-31")),
        ];
        let found = resolve_holder(day("1945-06-01"), &monarchs).unwrap();
        assert_eq!(found.name, "Elder");

        let reversed: Vec<_> = monarchs.into_iter().rev().collect();
        let found = resolve_holder(day("1945-06-01"), &reversed).unwrap();
        assert_eq!(found.name, "Younger");
    }

    #[test]
    fn resolve_holder_is_inclusive_and_supports_ongoing_reigns() {
        let monarchs = vec![
            monarch("First", "1900-01-01", Some("1920-01-01")),
            monarch("Current", "1920-01-02", None),
        ];
        assert_eq!(resolve_holder(day("1920-01-01"), &monarchs).unwrap().name, "First");
        assert_eq!(resolve_holder(day("1920-01-02"), &monarchs).unwrap().name, "Current");
        assert_eq!(resolve_holder(day("2500-01-01"), &monarchs).unwrap().name, "Current");
        assert!(resolve_holder(day("1899-12-31"), &monarchs).is_none());
    }

    #[test]
    fn president_at_returns_first_active_in_list_order() {
        let make = |name: &str, events: Vec<TimelineEvent>| President {
            name: name.to_string(),
            party: "Party".to_string(),
            birth: day("1940-01-01"),
            death: None,
            events,
            image_url: None,
        };
        let presidents = vec![
            make("A", vec![begins("2000-01-01"), ends("2005-01-01")]),
            make("B", vec![begins("2004-01-01"), ends("2010-01-01")]),
        ];
        assert_eq!(president_at(at("2004-06-01"), &presidents).unwrap().name, "A");
        assert_eq!(president_at(at("2006-06-01"), &presidents).unwrap().name, "B");
        assert!(president_at(at("2011-01-01"), &presidents).is_none());
    }
}
