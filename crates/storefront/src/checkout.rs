//! Checkout by messaging handoff.
//!
//! There is no payment step. The cart and a confirmed delivery address are
//! rendered into a plain-text order message, and the shopper is sent to a
//! chat deep link (`https://wa.me/<phone>?text=<message>`) to finish the
//! order with the store by hand.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use shapeshift_core::{Address, Price, PriceFormatter};
use url::Url;

use crate::address::AddressBook;
use crate::cart::{CartLineItem, CartStore};

/// Default chat deep-link endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://wa.me";

/// Default store phone number (international format, digits only).
pub const DEFAULT_PHONE: &str = "918975944936";

/// Default store name used in the message header.
pub const DEFAULT_STORE_NAME: &str = "ShapeShift Store";

/// Errors that can occur during checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty!")]
    EmptyCart,

    /// The configured endpoint and phone do not form a valid URL.
    #[error("invalid handoff URL: {0}")]
    InvalidHandoffUrl(#[from] url::ParseError),
}

/// Where and how order messages are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Shown in the message header.
    pub store_name: String,
    /// Deep-link base, e.g. `https://wa.me`.
    pub endpoint: String,
    /// Store phone number the chat is opened with.
    pub phone: String,
    /// Channel name used in the success notification.
    pub channel_name: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            phone: DEFAULT_PHONE.to_owned(),
            channel_name: "WhatsApp".to_owned(),
        }
    }
}

/// A composed order message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderMessage {
    text: String,
}

impl OrderMessage {
    /// The message as the recipient will read it.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Percent-encoded form, safe for a query parameter.
    #[must_use]
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.text).into_owned()
    }

    /// `<endpoint>/<phone>?text=<encoded message>`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidHandoffUrl`] if the result does not parse.
    pub fn handoff_url(&self, endpoint: &str, phone: &str) -> Result<Url, CheckoutError> {
        let endpoint = endpoint.trim_end_matches('/');
        let raw = format!("{endpoint}/{phone}?text={}", self.encoded());
        Ok(Url::parse(&raw)?)
    }
}

/// Renders cart contents and an address into an [`OrderMessage`].
#[derive(Clone)]
pub struct CheckoutComposer {
    settings: CheckoutSettings,
    formatter: Arc<dyn PriceFormatter>,
}

impl std::fmt::Debug for CheckoutComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutComposer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CheckoutComposer {
    pub fn new(settings: CheckoutSettings, formatter: Arc<dyn PriceFormatter>) -> Self {
        Self {
            settings,
            formatter,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// One line per item in the given order, then the total and the address
    /// block.
    #[must_use]
    pub fn compose<'a>(
        &self,
        items: impl IntoIterator<Item = &'a CartLineItem>,
        address: &Address,
    ) -> OrderMessage {
        let items: Vec<&CartLineItem> = items.into_iter().collect();
        let total: Price = items.iter().map(|item| item.line_total()).sum();
        let lines: Vec<String> = items
            .iter()
            .map(|item| {
                format!(
                    "• {} ({}) x{} - {}",
                    item.product.name,
                    item.product.variant_label(),
                    item.quantity,
                    self.formatter.format(item.line_total()),
                )
            })
            .collect();

        let text = format!(
            "🛒 *New Order from {store}*\n\n\
             *Order Details:*\n{lines}\n\n\
             *Total Amount:* {total}\n\n\
             *Delivery Address:*\n{block}\n\n\
             Please confirm my order. Thank you!",
            store = self.settings.store_name,
            lines = lines.join("\n"),
            total = self.formatter.format(total),
            block = address.block(),
        );
        OrderMessage { text }
    }

    /// Compose and build the handoff URL with the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidHandoffUrl`] for a bad endpoint.
    pub fn handoff_url<'a>(
        &self,
        items: impl IntoIterator<Item = &'a CartLineItem>,
        address: &Address,
    ) -> Result<Url, CheckoutError> {
        self.compose(items, address)
            .handoff_url(&self.settings.endpoint, &self.settings.phone)
    }
}

// =============================================================================
// Side-effect seams
// =============================================================================

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// A user-facing notification (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

/// Shows notifications to the shopper.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Opens the handoff URL. Dispatch is fire-and-forget.
pub trait HandoffChannel: Send + Sync {
    fn dispatch(&self, url: &Url);
}

/// A [`Notifier`] that collects notifications in memory.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        tracing::debug!(level = ?notification.level, message = %notification.message, "Notification");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// A [`HandoffChannel`] that records URLs instead of opening them.
#[derive(Debug, Default)]
pub struct RecordedHandoff {
    urls: Mutex<Vec<Url>>,
}

impl RecordedHandoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently dispatched URL.
    pub fn last(&self) -> Option<Url> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of dispatches so far.
    pub fn count(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl HandoffChannel for RecordedHandoff {
    fn dispatch(&self, url: &Url) {
        tracing::info!(url = %url, "Dispatching order handoff");
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
    }
}

/// A [`HandoffChannel`] for servers: the shopper's client opens the URL, so
/// dispatch only logs it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggedHandoff;

impl HandoffChannel for LoggedHandoff {
    fn dispatch(&self, url: &Url) {
        tracing::info!(host = url.host_str().unwrap_or_default(), "Order handoff ready");
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Drives the checkout flow across the cart and address book.
#[derive(Debug, Clone)]
pub struct Checkout {
    composer: CheckoutComposer,
}

impl Checkout {
    #[must_use]
    pub const fn new(composer: CheckoutComposer) -> Self {
        Self { composer }
    }

    #[must_use]
    pub const fn composer(&self) -> &CheckoutComposer {
        &self.composer
    }

    /// Start checkout: open the address dialog for a non-empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] after an error notification when
    /// the cart is empty. The dialog is not opened.
    pub fn begin(
        &self,
        cart: &CartStore,
        book: &mut AddressBook,
        notifier: &dyn Notifier,
    ) -> Result<(), CheckoutError> {
        if cart.is_empty() {
            notifier.notify(Notification::error(CheckoutError::EmptyCart.to_string()));
            return Err(CheckoutError::EmptyCart);
        }
        book.open();
        notifier.notify(Notification::info(
            "Please confirm your delivery address to continue.",
        ));
        Ok(())
    }

    /// Finish checkout with a confirmed address.
    ///
    /// In order: dispatch the handoff, notify success, clear the cart, close
    /// the cart panel. Returns the dispatched URL.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart emptied since
    /// [`begin`](Self::begin), or [`CheckoutError::InvalidHandoffUrl`]. The
    /// cart is untouched in both cases.
    pub fn complete(
        &self,
        cart: &mut CartStore,
        address: &Address,
        channel: &dyn HandoffChannel,
        notifier: &dyn Notifier,
    ) -> Result<Url, CheckoutError> {
        if cart.is_empty() {
            notifier.notify(Notification::error(CheckoutError::EmptyCart.to_string()));
            return Err(CheckoutError::EmptyCart);
        }

        let url = self.composer.handoff_url(cart.items(), address)?;

        channel.dispatch(&url);
        notifier.notify(Notification::success(format!(
            "Opening {} to complete your order!",
            self.composer.settings.channel_name
        )));
        cart.clear_cart();
        cart.set_cart_open(false);

        tracing::info!(address_id = %address.id, "Checkout handed off");
        Ok(url)
    }
}
