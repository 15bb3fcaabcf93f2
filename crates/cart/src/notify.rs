//! User-facing notifications.
//!
//! The cart store never surfaces failures by panicking or by returning early
//! to a UI callback; it hands a [`Notification`] to the configured
//! [`Notifier`] (toast, log line, test queue) and carries on.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rocketshoes_core::{CurrencyCode, ProductId};

/// Language used for notification messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

impl Locale {
    /// Message shown for `kind`.
    #[must_use]
    pub const fn message(&self, kind: NotificationKind) -> &'static str {
        match (self, kind) {
            (Self::En, NotificationKind::OutOfStock) => "Requested quantity out of stock",
            (Self::En, NotificationKind::AddFailed) => "Error adding product",
            (Self::En, NotificationKind::RemoveFailed) => "Error removing product",
            (Self::En, NotificationKind::UpdateFailed) => "Error updating product quantity",
            (Self::PtBr, NotificationKind::OutOfStock) => "Quantidade solicitada fora de estoque",
            (Self::PtBr, NotificationKind::AddFailed) => "Erro na adição do produto",
            (Self::PtBr, NotificationKind::RemoveFailed) => "Erro na remoção do produto",
            (Self::PtBr, NotificationKind::UpdateFailed) => {
                "Erro na alteração de quantidade do produto"
            }
        }
    }

    /// Currency used when formatting cart totals.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        match self {
            Self::En => CurrencyCode::USD,
            Self::PtBr => CurrencyCode::BRL,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            "pt" | "pt-br" => Ok(Self::PtBr),
            other => Err(format!("unsupported locale '{other}' (expected en or pt-BR)")),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The requested quantity exceeds available stock.
    OutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub product_id: ProductId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification with the localized message for `kind`.
    #[must_use]
    pub fn new(kind: NotificationKind, product_id: ProductId, locale: Locale) -> Self {
        Self {
            kind,
            product_id,
            message: locale.message(kind).to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::warn!(
            kind = ?notification.kind,
            product_id = %notification.product_id,
            "{}",
            notification.message
        );
    }
}

/// Buffers notifications until the UI drains them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<Vec<Notification>>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: &Notification) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_localized_messages() {
        let en = Notification::new(NotificationKind::OutOfStock, ProductId::new(1), Locale::En);
        assert_eq!(en.message, "Requested quantity out of stock");

        let pt = Notification::new(NotificationKind::OutOfStock, ProductId::new(1), Locale::PtBr);
        assert_eq!(pt.message, "Quantidade solicitada fora de estoque");

        assert_eq!(
            Locale::PtBr.message(NotificationKind::UpdateFailed),
            "Erro na alteração de quantidade do produto"
        );
    }

    #[test]
    fn test_queue_drains_in_order() {
        let queue = NotificationQueue::new();
        queue.notify(&Notification::new(
            NotificationKind::AddFailed,
            ProductId::new(1),
            Locale::En,
        ));
        queue.notify(&Notification::new(
            NotificationKind::RemoveFailed,
            ProductId::new(2),
            Locale::En,
        ));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].kind, NotificationKind::AddFailed);
        assert_eq!(drained[1].kind, NotificationKind::RemoveFailed);
        assert!(queue.is_empty());
    }
}
