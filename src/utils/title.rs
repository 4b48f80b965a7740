use time::OffsetDateTime;

const MAX_EXCERPT: usize = 50;
const TRUNCATED_EXCERPT: usize = 47;

/// Builds the title a new session is registered under.
///
/// The first message is whitespace-collapsed and, past fifty characters, cut to forty-seven
/// plus an ellipsis.  A blank message yields a generic `Chat` title.
pub fn generate_session_title(first_message: &str, now: OffsetDateTime) -> String {
    let stamp = format!(
        "{:02}/{:02} {:02}:{:02}",
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute()
    );
    let collapsed = first_message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return format!("Chat {stamp}");
    }
    let excerpt = if collapsed.chars().count() > MAX_EXCERPT {
        let cut: String = collapsed.chars().take(TRUNCATED_EXCERPT).collect();
        format!("{cut}...")
    } else {
        collapsed
    };
    format!("Research on '{excerpt}' • {stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-05 09:07 UTC);

    #[test]
    fn short_message_is_quoted_whole() {
        assert_eq!(
            generate_session_title("What is the capital of France?", NOW),
            "Research on 'What is the capital of France?' • 03/05 09:07"
        );
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(
            generate_session_title("  fusion\n\n  energy\tnow ", NOW),
            "Research on 'fusion energy now' • 03/05 09:07"
        );
    }

    #[test]
    fn long_message_is_truncated() {
        let message = "a".repeat(51);
        let title = generate_session_title(&message, NOW);
        assert_eq!(title, format!("Research on '{}...' • 03/05 09:07", "a".repeat(47)));

        let exact = "b".repeat(50);
        assert_eq!(
            generate_session_title(&exact, NOW),
            format!("Research on '{exact}' • 03/05 09:07")
        );
    }

    #[test]
    fn truncation_counts_characters() {
        let message = "é".repeat(60);
        let title = generate_session_title(&message, NOW);
        assert!(title.starts_with(&format!("Research on '{}...'", "é".repeat(47))));
    }

    #[test]
    fn blank_message_gets_generic_title() {
        assert_eq!(generate_session_title(" \n ", NOW), "Chat 03/05 09:07");
    }
}
