use serde::Serialize;
use std::sync::Arc;

use crate::config::MailConfig;
use crate::models::{courses, feedback, users};

/// An email waiting to be dispatched.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn enrolled(student: &users::Model, course: &courses::Model) -> Self {
        Self {
            to: student.email.clone(),
            subject: format!("Enrolled: {}", course.name),
            body: format!(
                "Hello {},\n\nyou are enrolled in \"{}\" ({:?}). Classes start on {} and end on {}.",
                greeting_name(student),
                course.name,
                course.level,
                course.start_date,
                course.end_date,
            ),
        }
    }

    pub fn completed(student: &users::Model, course: &courses::Model) -> Self {
        Self {
            to: student.email.clone(),
            subject: format!("Course completed: {}", course.name),
            body: format!(
                "Congratulations {}!\n\nyou have completed \"{}\". Thank you for studying with us.",
                greeting_name(student),
                course.name,
            ),
        }
    }

    pub fn feedback_received(record: &feedback::Model) -> Option<Self> {
        if record.email.trim().is_empty() {
            return None;
        }
        Some(Self {
            to: record.email.clone(),
            subject: format!("We received your feedback: {}", record.subject),
            body: format!(
                "Thank you for your feedback.\n\nYour answers scored {} of {} ({}%).",
                record.total_score,
                record.max_possible_score,
                record.score_percentage(),
            ),
        })
    }
}

fn greeting_name(user: &users::Model) -> &str {
    user.display_name.as_deref().unwrap_or(&user.email)
}

/// Fire-and-forget email dispatch. Implementations must not block the
/// caller and must swallow delivery failures after logging them.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: Notification);
}

pub type NotifierData = Arc<dyn Notifier>;

/// Logs notifications instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: Notification) {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "notification (not delivered, no mail relay configured)"
        );
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

/// Posts notifications as JSON to an HTTP mail relay.
#[derive(Clone)]
pub struct RelayNotifier {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

impl RelayNotifier {
    pub fn new(relay_url: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: relay_url.to_string(),
            from: from.to_string(),
        }
    }
}

impl Notifier for RelayNotifier {
    fn send(&self, notification: Notification) {
        let client = self.client.clone();
        let url = self.relay_url.clone();
        let from = self.from.clone();

        tokio::spawn(async move {
            let payload = RelayPayload {
                from: &from,
                notification: &notification,
            };
            match client.post(&url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(to = %notification.to, "notification delivered");
                }
                Ok(response) => {
                    tracing::warn!(
                        to = %notification.to,
                        status = %response.status(),
                        "mail relay rejected notification"
                    );
                }
                Err(e) => {
                    tracing::warn!(to = %notification.to, "failed to reach mail relay: {e}");
                }
            }
        });
    }
}

/// Pick the notifier for the configured mail settings.
pub fn from_config(mail: &MailConfig) -> NotifierData {
    match &mail.relay_url {
        Some(url) => Arc::new(RelayNotifier::new(url, &mail.from)),
        None => Arc::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::Level;
    use crate::models::users::Roles;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn student(display_name: Option<&str>) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            display_name: display_name.map(str::to_string),
            role: Roles::Student,
            level: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn course() -> courses::Model {
        courses::Model {
            id: Uuid::new_v4(),
            name: "Business English".to_string(),
            description: String::new(),
            level: Level::B2,
            price: 120.0,
            teacher_id: None,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 30).unwrap(),
            max_seats: 10,
            occupied_seats: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn enrollment_mail_greets_by_display_name() {
        let mail = Notification::enrolled(&student(Some("Ana")), &course());
        assert_eq!(mail.to, "ana@example.com");
        assert_eq!(mail.subject, "Enrolled: Business English");
        assert!(mail.body.starts_with("Hello Ana,"));
        assert!(mail.body.contains("(B2)"));
        assert!(mail.body.contains("2026-01-12"));
    }

    #[test]
    fn completion_mail_falls_back_to_email() {
        let mail = Notification::completed(&student(None), &course());
        assert!(mail.body.starts_with("Congratulations ana@example.com!"));
    }
}
