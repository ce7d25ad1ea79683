//! User-visible notifications.
//!
//! Components report outcomes through a [`Notifier`]; whoever renders the
//! interface drains the receiving end and dismisses a notice by consuming
//! it.

use log::debug;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A dismissable notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: &str, text: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}

/// Sending half of the notice channel
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    /// Create a notifier and the receiver notices are delivered to
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// A notifier that drops everything
    pub fn silent() -> Self {
        Self { sender: None }
    }

    pub fn notify(&self, notice: Notice) {
        match &self.sender {
            Some(sender) => {
                if sender.send(notice).is_err() {
                    debug!("Notice receiver dropped");
                }
            }
            None => debug!("Notice discarded: {}", notice.title),
        }
    }

    pub fn success(&self, title: &str, text: &str) {
        self.notify(Notice::new(NoticeKind::Success, title, text));
    }

    pub fn info(&self, title: &str, text: &str) {
        self.notify(Notice::new(NoticeKind::Info, title, text));
    }

    pub fn warning(&self, title: &str, text: &str) {
        self.notify(Notice::new(NoticeKind::Warning, title, text));
    }

    pub fn error(&self, title: &str, text: &str) {
        self.notify(Notice::new(NoticeKind::Error, title, text));
    }

    /// The prompt shown when an anonymous user attempts a guarded action
    pub fn login_required(&self, action: &str) {
        self.info(
            "Please Login",
            &format!("You need to be logged in to {}", action),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notices_are_delivered_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.success("Liked!", "You have liked this tip");
        notifier.login_required("comment");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, NoticeKind::Success);
        assert_eq!(first.title, "Liked!");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, NoticeKind::Info);
        assert_eq!(second.text, "You need to be logged in to comment");
    }

    #[test]
    fn silent_and_closed_notifiers_do_not_panic() {
        Notifier::silent().error("Error", "ignored");

        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.warning("Warning", "nobody is listening");
    }
}
