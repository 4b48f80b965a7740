use time::{Date, OffsetDateTime};

use crate::types::Message;

/// Milliseconds since the Unix epoch, the unit every wire timestamp uses.
pub fn now_millis() -> i64 {
    to_millis(OffsetDateTime::now_utc())
}

/// Converts a datetime to epoch milliseconds.
pub fn to_millis(datetime: OffsetDateTime) -> i64 {
    (datetime.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Converts epoch milliseconds to a UTC datetime.
///
/// Out-of-range values clamp to the epoch.
pub fn from_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Formats a timestamp as `HH:MM`.
pub fn format_time(millis: i64) -> String {
    let datetime = from_millis(millis);
    format!("{:02}:{:02}", datetime.hour(), datetime.minute())
}

/// Formats a date as `MM/DD/YYYY`.
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        u8::from(date.month()),
        date.day(),
        date.year()
    )
}

/// Labels the day a timestamp falls on relative to `now`.
///
/// Returns `Today`, `Yesterday`, or the date as `MM/DD/YYYY`.
pub fn date_group_label(millis: i64, now: i64) -> String {
    let date = from_millis(millis).date();
    let today = from_millis(now).date();
    if date == today {
        "Today".to_string()
    } else if today.previous_day() == Some(date) {
        "Yesterday".to_string()
    } else {
        format_date(date)
    }
}

/// Folds consecutive messages that share a day label into groups.
///
/// Message order is preserved; a label can appear more than once if the log is not sorted.
pub fn group_messages_by_date(messages: &[Message], now: i64) -> Vec<(String, Vec<&Message>)> {
    let mut groups: Vec<(String, Vec<&Message>)> = Vec::new();
    for message in messages {
        let label = date_group_label(message.timestamp, now);
        match groups.last_mut() {
            Some((last, members)) if *last == label => members.push(message),
            _ => groups.push((label, vec![message])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-15 14:30 UTC);

    fn at(datetime: OffsetDateTime) -> i64 {
        to_millis(datetime)
    }

    #[test]
    fn time_is_zero_padded() {
        assert_eq!(format_time(at(datetime!(2024-03-15 09:05:59 UTC))), "09:05");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn labels() {
        let now = at(NOW);
        assert_eq!(date_group_label(at(datetime!(2024-03-15 00:00 UTC)), now), "Today");
        assert_eq!(date_group_label(at(datetime!(2024-03-14 23:59 UTC)), now), "Yesterday");
        assert_eq!(date_group_label(at(datetime!(2024-03-13 12:00 UTC)), now), "03/13/2024");
        assert_eq!(date_group_label(at(datetime!(2023-12-31 12:00 UTC)), now), "12/31/2023");
    }

    #[test]
    fn millis_round_trip_through_datetime() {
        assert_eq!(from_millis(at(NOW)), NOW);
        assert_eq!(from_millis(i64::MAX), OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn grouping_preserves_order() {
        let messages = vec![
            Message::user("a", at(datetime!(2024-03-14 10:00 UTC))),
            Message::user("b", at(datetime!(2024-03-14 11:00 UTC))),
            Message::user("c", at(datetime!(2024-03-15 08:00 UTC))),
        ];
        let groups = group_messages_by_date(&messages, at(NOW));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Yesterday");
        assert_eq!(
            groups[0].1.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(groups[1].0, "Today");
        assert_eq!(groups[1].1[0].content, "c");
    }

    #[test]
    fn grouping_empty_log() {
        assert!(group_messages_by_date(&[], at(NOW)).is_empty());
    }
}
