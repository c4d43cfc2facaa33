//! Checkout and address dialog handlers.
//!
//! Checkout starts with `POST /checkout`, which opens the address dialog.
//! The dialog is then driven through `/checkout/address/*` until the shopper
//! saves a new address or confirms the selected one; either completes the
//! checkout and responds with the handoff URL for the client to open.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use shapeshift_core::{Address, AddressError, AddressForm, AddressId};
use tracing::instrument;

use crate::address::AddressBook;
use crate::cart::CartStore;
use crate::checkout::{CheckoutError, Notification, NotificationLog};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Address dialog display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDialog {
    pub open: bool,
    pub addresses: Vec<Address>,
    pub selected_id: Option<AddressId>,
    /// Set while an existing address is being edited.
    pub editing_id: Option<AddressId>,
    pub form: AddressForm,
}

impl From<&AddressBook> for AddressDialog {
    fn from(book: &AddressBook) -> Self {
        Self {
            open: book.is_open(),
            addresses: book.addresses().cloned().collect(),
            selected_id: book.selected().map(|a| a.id.clone()),
            editing_id: book.editing().cloned(),
            form: book.form().clone(),
        }
    }
}

/// Outcome of a checkout step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Deep link for the client to open; set once checkout completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub notifications: Vec<Notification>,
    pub dialog: AddressDialog,
}

type CheckoutReply = (StatusCode, Json<CheckoutResponse>);

/// A request naming one saved address.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub address_id: AddressId,
}

fn reply(
    status: StatusCode,
    book: &AddressBook,
    log: &NotificationLog,
    handoff_url: Option<String>,
    error: Option<String>,
) -> CheckoutReply {
    (
        status,
        Json(CheckoutResponse {
            handoff_url,
            error,
            notifications: log.take(),
            dialog: AddressDialog::from(book),
        }),
    )
}

fn dialog(state: &AppState) -> Json<AddressDialog> {
    Json(AddressDialog::from(&*state.addresses()))
}

/// Begin checkout: open the address dialog for a non-empty cart.
#[instrument(skip(state))]
pub async fn begin(State(state): State<AppState>) -> CheckoutReply {
    let log = NotificationLog::new();
    let cart = state.cart();
    let mut book = state.addresses();

    match state.checkout().begin(&cart, &mut book, &log) {
        Ok(()) => reply(StatusCode::OK, &book, &log, None, None),
        Err(e) => reply(StatusCode::BAD_REQUEST, &book, &log, None, Some(e.to_string())),
    }
}

/// Current address dialog state.
#[instrument(skip(state))]
pub async fn show_dialog(State(state): State<AppState>) -> Json<AddressDialog> {
    dialog(&state)
}

/// Select a saved address.
#[instrument(skip(state))]
pub async fn select(
    State(state): State<AppState>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<AddressDialog>> {
    state.addresses().select(&req.address_id)?;
    Ok(dialog(&state))
}

/// Switch the dialog to an empty form for a new address.
#[instrument(skip(state))]
pub async fn start_new(State(state): State<AppState>) -> Result<Json<AddressDialog>> {
    state.addresses().start_add_new()?;
    Ok(dialog(&state))
}

/// Switch the dialog to editing a saved address.
#[instrument(skip(state))]
pub async fn start_edit(
    State(state): State<AppState>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<AddressDialog>> {
    state.addresses().start_edit(&req.address_id)?;
    Ok(dialog(&state))
}

/// Save the submitted form and complete checkout with it.
///
/// A form missing a required field responds 400 and leaves the dialog open.
#[instrument(skip(state, form))]
pub async fn save(
    State(state): State<AppState>,
    Json(form): Json<AddressForm>,
) -> Result<CheckoutReply> {
    let log = NotificationLog::new();
    let mut cart = state.cart();
    let mut book = state.addresses();

    let address = match book.save(&form) {
        Ok(address) => address,
        Err(e) => {
            tracing::debug!(error = %e, "Address form rejected");
            return Ok(reply(
                StatusCode::BAD_REQUEST,
                &book,
                &log,
                None,
                Some(e.to_string()),
            ));
        }
    };

    complete(&state, &mut cart, &book, &address, &log)
}

/// Complete checkout with the selected address.
#[instrument(skip(state))]
pub async fn use_selected(State(state): State<AppState>) -> Result<CheckoutReply> {
    let log = NotificationLog::new();
    let mut cart = state.cart();
    let mut book = state.addresses();

    let Some(address) = book.use_selected() else {
        let error = if book.is_open() {
            "No address selected".to_string()
        } else {
            AddressError::DialogClosed.to_string()
        };
        return Ok(reply(StatusCode::BAD_REQUEST, &book, &log, None, Some(error)));
    };

    complete(&state, &mut cart, &book, &address, &log)
}

fn complete(
    state: &AppState,
    cart: &mut CartStore,
    book: &AddressBook,
    address: &Address,
    log: &NotificationLog,
) -> Result<CheckoutReply> {
    match state
        .checkout()
        .complete(cart, address, state.handoff(), log)
    {
        Ok(url) => {
            add_breadcrumb("checkout", "Order handed off", None);
            Ok(reply(StatusCode::OK, book, log, Some(url.into()), None))
        }
        Err(e @ CheckoutError::EmptyCart) => Ok(reply(
            StatusCode::BAD_REQUEST,
            book,
            log,
            None,
            Some(e.to_string()),
        )),
        Err(e) => Err(e.into()),
    }
}
