//! Plain-text report sent when a file has few enough participants

use std::fmt::Write;

use crate::domain::entities::{ResultBundle, UserEntry};

const NONE_FOUND: &str = "- (none found)";

/// Render a report for one or more source files.
///
/// Participants are listed by display name, mentions by `@username`; both
/// lists are sorted case-insensitively. Channels are only counted.
pub fn format_report(file_names: &[&str], result: &ResultBundle) -> String {
    let mut participants: Vec<&UserEntry> = result.participants.iter().collect();
    let mut mentions: Vec<&UserEntry> = result.mentions.iter().collect();
    participants.sort_by_cached_key(|u| participant_key(u).to_lowercase());
    mentions.sort_by_cached_key(|u| mention_key(u).to_lowercase());

    let mut out = String::new();

    match file_names {
        [] => {}
        [single] => {
            let _ = writeln!(out, "File: {}", single);
        }
        many => {
            let _ = writeln!(out, "Files: {}", many.join(", "));
        }
    }

    let _ = writeln!(out, "Participants count: {}", participants.len());
    let _ = writeln!(out, "Mentions count: {}", mentions.len());

    out.push_str("\nParticipants:\n");
    push_list(&mut out, &participants, render_participant);

    out.push_str("\nMentions:\n");
    push_list(&mut out, &mentions, render_mention);

    if !result.channels.is_empty() {
        let _ = writeln!(
            out,
            "\nChannels/links: {} (listed on a separate sheet in the Excel report)",
            result.channels.len()
        );
    }

    out
}

fn push_list(out: &mut String, entries: &[&UserEntry], render: fn(&UserEntry) -> String) {
    if entries.is_empty() {
        out.push_str(NONE_FOUND);
        out.push('\n');
        return;
    }
    for entry in entries {
        let _ = writeln!(out, "- {}", render(entry));
    }
}

fn render_participant(u: &UserEntry) -> String {
    u.to_string()
}

fn render_mention(u: &UserEntry) -> String {
    if let Some(username) = u.username() {
        return format!("@{}", username);
    }
    u.display_name()
        .or_else(|| u.link())
        .unwrap_or("(unknown)")
        .to_string()
}

fn participant_key(u: &UserEntry) -> &str {
    u.display_name()
        .or_else(|| u.username())
        .or_else(|| u.link())
        .unwrap_or_default()
}

fn mention_key(u: &UserEntry) -> &str {
    u.username()
        .or_else(|| u.display_name())
        .or_else(|| u.link())
        .unwrap_or_default()
}
