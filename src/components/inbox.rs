use super::ews::{DistinguishedFolder, MessageSummary, Session};
use crate::error::{AppResult, Error};
use tracing::info;

/// Placeholder used when a message has no subject
pub const NO_SUBJECT: &str = "(No Subject)";

/// Fetch the subjects of the newest `limit` inbox messages, newest first
pub async fn probe_inbox(session: &Session, limit: usize) -> AppResult<Vec<String>> {
    let inbox = session
        .get_folder(DistinguishedFolder::Inbox)
        .await
        .map_err(Error::from_probe)?;
    info!(
        "Accessed inbox folder: '{}'",
        inbox.display_name.as_deref().unwrap_or(inbox.id.as_str())
    );

    info!("Fetching latest {limit} emails...");
    let items = session
        .find_items(&inbox, limit)
        .await
        .map_err(Error::from_probe)?;

    let subjects = subject_lines(items, limit);
    info!("Successfully fetched {} email subjects.", subjects.len());
    Ok(subjects)
}

/// Subjects in fetch order, blanks replaced by the placeholder
pub fn subject_lines(items: Vec<MessageSummary>, limit: usize) -> Vec<String> {
    items
        .into_iter()
        .take(limit)
        .map(|item| match item.subject {
            Some(subject) if !subject.is_empty() => subject,
            _ => NO_SUBJECT.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: Option<&str>) -> MessageSummary {
        MessageSummary {
            subject: subject.map(str::to_string),
            received: None,
        }
    }

    #[test]
    fn test_subject_lines() {
        let items = vec![
            message(Some("Newest")),
            message(None),
            message(Some("")),
            message(Some("  ")),
            message(Some("Oldest")),
        ];

        assert_eq!(
            subject_lines(items, 5),
            vec!["Newest", NO_SUBJECT, NO_SUBJECT, "  ", "Oldest"]
        );
    }

    #[test]
    fn test_subject_lines_respects_limit() {
        let items = (0..8).map(|i| message(Some(&format!("m{i}")))).collect();
        assert_eq!(subject_lines(items, 5), vec!["m0", "m1", "m2", "m3", "m4"]);
        assert!(subject_lines(Vec::new(), 5).is_empty());
    }
}
