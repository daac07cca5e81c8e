//! Two-phase optimistic updates.
//!
//! A [`Tentative`] holds the state shown to the user before the server has
//! agreed to it, the last known-good state, and one confirmation slot per
//! outstanding request. Once every slot is filled, [`Tentative::settle`]
//! either commits the tentative state or asks the caller to resync.

use std::collections::BTreeMap;

#[derive(Debug)]
enum Confirmation<E> {
    Pending,
    Confirmed,
    Rejected(E),
}

#[derive(Debug)]
pub struct Tentative<S, E> {
    previous: S,
    tentative: S,
    confirmations: BTreeMap<String, Confirmation<E>>,
    rejection_order: Vec<String>,
}

/// Final outcome of a tentative change.
#[derive(Debug)]
pub enum Settlement<S, E> {
    /// Every request confirmed; the tentative state is authoritative.
    Committed(S),
    /// At least one request failed (or never answered). The caller must
    /// replace local state with an authoritative copy; `previous` is the
    /// fallback when that copy cannot be fetched.
    Resync {
        previous: S,
        failures: Vec<(String, E)>,
        unanswered: Vec<String>,
    },
}

impl<S, E> Tentative<S, E> {
    pub fn begin(previous: S, tentative: S, keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            previous,
            tentative,
            confirmations: keys
                .into_iter()
                .map(|key| (key, Confirmation::Pending))
                .collect(),
            rejection_order: Vec::new(),
        }
    }

    /// The state to render while confirmations are outstanding.
    pub fn state(&self) -> &S {
        &self.tentative
    }

    pub fn pending(&self) -> usize {
        self.confirmations
            .values()
            .filter(|slot| matches!(slot, Confirmation::Pending))
            .count()
    }

    pub fn confirm(&mut self, key: &str) {
        if let Some(slot) = self.confirmations.get_mut(key) {
            *slot = Confirmation::Confirmed;
        }
    }

    pub fn reject(&mut self, key: &str, error: E) {
        if let Some(slot) = self.confirmations.get_mut(key) {
            *slot = Confirmation::Rejected(error);
            self.rejection_order.push(key.to_string());
        }
    }

    pub fn record<T>(&mut self, key: &str, result: Result<T, E>) {
        match result {
            Ok(_) => self.confirm(key),
            Err(error) => self.reject(key, error),
        }
    }

    pub fn settle(self) -> Settlement<S, E> {
        let Self {
            previous,
            tentative,
            mut confirmations,
            rejection_order,
        } = self;

        let unanswered: Vec<String> = confirmations
            .iter()
            .filter(|(_, slot)| matches!(slot, Confirmation::Pending))
            .map(|(key, _)| key.clone())
            .collect();

        let mut failures = Vec::with_capacity(rejection_order.len());
        for key in rejection_order {
            if let Some(Confirmation::Rejected(error)) = confirmations.remove(&key) {
                failures.push((key, error));
            }
        }

        if failures.is_empty() && unanswered.is_empty() {
            Settlement::Committed(tentative)
        } else {
            Settlement::Resync {
                previous,
                failures,
                unanswered,
            }
        }
    }
}
