//! Notifications for the display layer.
//!
//! The controller never renders anything. It pushes [`Notification`]s into
//! an unbounded queue and whatever sits on the other end (a GUI, the console
//! sink of `kioskd`, a test) consumes them at its own pace.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use kiosk_core::{Credits, UserId};

/// Session-change events delivered to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A user logged in.
    NewUser {
        user_id: UserId,
        credits: Credits,
        is_admin: bool,
    },

    /// A deposit batch was committed.
    MoneyAdded { amount: Credits, new_credits: Credits },

    /// The session ended; clear the screen.
    Logout,

    /// Human-readable message for the on-screen log.
    AppendLog { message: String },
}

impl Notification {
    pub fn append_log(message: impl Into<String>) -> Self {
        Self::AppendLog {
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewUser {
                user_id,
                credits,
                is_admin,
            } => {
                let role = if *is_admin { " (drink admin)" } else { "" };
                write!(f, "Welcome {user_id}{role}, you have {credits} drink credits")
            }
            Self::MoneyAdded {
                amount,
                new_credits,
            } => write!(f, "Added {amount} drink credits, new balance {new_credits}"),
            Self::Logout => write!(f, "Logged out"),
            Self::AppendLog { message } => write!(f, "{message}"),
        }
    }
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiver the sink reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver a notification. A missing sink is not an error.
    pub fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            debug!(notification = %e.0, "Notification sink gone, dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_arrive_in_order() {
        let (notifier, mut rx) = Notifier::channel();

        notifier.notify(Notification::MoneyAdded {
            amount: 50,
            new_credits: 100,
        });
        notifier.notify(Notification::Logout);

        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::MoneyAdded {
                amount: 50,
                new_credits: 100
            }
        );
        assert_eq!(rx.try_recv().unwrap(), Notification::Logout);
    }

    #[test]
    fn test_notify_without_sink_does_not_panic() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.notify(Notification::Logout);
    }

    #[test]
    fn test_notification_serialization() {
        let notification = Notification::NewUser {
            user_id: UserId::new("alice").unwrap(),
            credits: 50,
            is_admin: false,
        };
        let json = serde_json::to_string(&notification).unwrap();
        assert_eq!(
            json,
            r#"{"type":"new_user","user_id":"alice","credits":50,"is_admin":false}"#
        );

        let json = serde_json::to_string(&Notification::Logout).unwrap();
        assert_eq!(json, r#"{"type":"logout"}"#);
    }

    #[test]
    fn test_notification_display() {
        let notification = Notification::append_log("Could not authenticate user");
        assert_eq!(notification.to_string(), "Could not authenticate user");

        let notification = Notification::MoneyAdded {
            amount: 25,
            new_credits: 75,
        };
        assert_eq!(
            notification.to_string(),
            "Added 25 drink credits, new balance 75"
        );
    }
}
