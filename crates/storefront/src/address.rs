//! Saved delivery addresses and the "choose or add address" dialog.
//!
//! The dialog is a small state machine:
//!
//! ```text
//! closed --open()--> choosing --start_add_new()/start_edit(id)--> editing
//!    ^                  |                                           |
//!    +--use_selected()--+                                           |
//!    +----------------------------save(form) Ok---------------------+
//! ```
//!
//! A rejected save leaves the dialog open and the list unchanged. While the
//! dialog is closed, every dialog action is refused with
//! [`AddressError::DialogClosed`].

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use rand::Rng;
use shapeshift_core::{Address, AddressError, AddressForm, AddressId};

use crate::storage::{KeyValueStore, keys, load_json, save_json};

const ID_SUFFIX_LEN: usize = 6;

/// Generate an address id: `<unix-millis>-<6 base36 chars>`.
#[must_use]
pub fn generate_address_id() -> AddressId {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();
    AddressId::new(format!("{}-{suffix}", Utc::now().timestamp_millis()))
}

/// The address book and its dialog state.
pub struct AddressBook {
    addresses: IndexMap<AddressId, Address>,
    selected: Option<AddressId>,
    editing: Option<AddressId>,
    form: AddressForm,
    open: bool,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressBook")
            .field("addresses", &self.addresses.len())
            .field("selected", &self.selected)
            .field("editing", &self.editing)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl AddressBook {
    /// An address book backed by `store`, loaded with the saved addresses.
    /// The dialog starts closed.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let addresses = load(store.as_ref());
        Self {
            selected: addresses.keys().next().cloned(),
            addresses,
            editing: None,
            form: AddressForm::default(),
            open: false,
            store,
        }
    }

    /// Open the dialog: reload saved addresses, select the first one and
    /// reset the form.
    pub fn open(&mut self) {
        self.addresses = load(self.store.as_ref());
        self.selected = self.addresses.keys().next().cloned();
        self.editing = None;
        self.form = AddressForm::default();
        self.open = true;
    }

    pub const fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Saved addresses in the order they were added.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// The currently selected address.
    #[must_use]
    pub fn selected(&self) -> Option<&Address> {
        self.selected.as_ref().and_then(|id| self.addresses.get(id))
    }

    /// Select a saved address. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DialogClosed`] when the dialog is closed.
    pub fn select(&mut self, id: &AddressId) -> Result<(), AddressError> {
        self.ensure_open()?;
        if self.addresses.contains_key(id) {
            self.selected = Some(id.clone());
        }
        Ok(())
    }

    /// Load a saved address into the form; the next save updates it in place.
    /// Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DialogClosed`] when the dialog is closed.
    pub fn start_edit(&mut self, id: &AddressId) -> Result<(), AddressError> {
        self.ensure_open()?;
        if let Some(address) = self.addresses.get(id) {
            self.form = AddressForm::from_address(address);
            self.editing = Some(id.clone());
        }
        Ok(())
    }

    /// Blank the form; the next save appends a new address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DialogClosed`] when the dialog is closed.
    pub fn start_add_new(&mut self) -> Result<(), AddressError> {
        self.ensure_open()?;
        self.form = AddressForm::default();
        self.editing = None;
        Ok(())
    }

    /// Current form contents.
    #[must_use]
    pub const fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Id of the address being edited, if any.
    #[must_use]
    pub const fn editing(&self) -> Option<&AddressId> {
        self.editing.as_ref()
    }

    /// Validate and save `form`, returning the confirmed address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DialogClosed`] when the dialog is closed, and
    /// [`AddressError::MissingField`] when a required field is blank after
    /// trimming. Nothing is changed in either case.
    pub fn save(&mut self, form: &AddressForm) -> Result<Address, AddressError> {
        self.ensure_open()?;
        let fields = form.validate()?;

        let editing = self
            .editing
            .take()
            .and_then(|id| self.addresses.get_mut(&id));
        let saved = if let Some(existing) = editing {
            existing.merge(fields);
            existing.clone()
        } else {
            let address = Address::from_fields(self.fresh_id(), fields);
            self.addresses.insert(address.id.clone(), address.clone());
            address
        };

        self.persist();
        self.selected = Some(saved.id.clone());
        self.form = AddressForm::default();
        self.open = false;

        tracing::debug!(address_id = %saved.id, "Saved delivery address");
        Ok(saved)
    }

    /// Confirm the selected address and close the dialog.
    ///
    /// Returns `None` when the dialog is closed, or when nothing is selected
    /// (the dialog then stays open).
    pub fn use_selected(&mut self) -> Option<Address> {
        if !self.open {
            return None;
        }
        let address = self.selected()?.clone();
        self.open = false;
        Some(address)
    }

    const fn ensure_open(&self) -> Result<(), AddressError> {
        if self.open {
            Ok(())
        } else {
            Err(AddressError::DialogClosed)
        }
    }

    fn fresh_id(&self) -> AddressId {
        loop {
            let id = generate_address_id();
            if !self.addresses.contains_key(&id) {
                return id;
            }
        }
    }

    fn persist(&self) {
        let list: Vec<&Address> = self.addresses.values().collect();
        save_json(self.store.as_ref(), keys::ADDRESSES, &list);
    }
}

fn load(store: &dyn KeyValueStore) -> IndexMap<AddressId, Address> {
    let saved: Vec<Address> = load_json(store, keys::ADDRESSES).unwrap_or_default();
    saved.into_iter().map(|a| (a.id.clone(), a)).collect()
}
