//! The lifecycle of the modal dialogs on each page.
//!
//! A page has at most one modal open. The form flow runs
//! `Idle → FormOpen → ConfirmOpen → Submitting → Idle`; the history and
//! delete confirmation modals open straight from `Idle`.

/// Whether a form creates a new record or changes an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Submitting creates a new record.
    Create,
    /// Submitting changes the record with this account number.
    Update {
        /// The account number of the record being changed.
        account_number: String,
    },
}

impl FormMode {
    /// [FormMode::Update] if an account number is given, [FormMode::Create]
    /// otherwise. A blank account number counts as none.
    pub fn from_account_number(account_number: Option<&str>) -> Self {
        match account_number.map(str::trim) {
            Some(account_number) if !account_number.is_empty() => FormMode::Update {
                account_number: account_number.to_owned(),
            },
            _ => FormMode::Create,
        }
    }

    /// The account number being changed, if any.
    pub fn account_number(&self) -> Option<&str> {
        match self {
            FormMode::Create => None,
            FormMode::Update { account_number } => Some(account_number),
        }
    }
}

/// What a delete confirmation would remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A single account.
    Account {
        /// The account number to close.
        account_number: String,
    },
    /// Every account of one kind held by a customer.
    AllOfCustomer {
        /// The customer whose accounts would be closed.
        customer_id: i64,
    },
}

/// The modal currently shown on a page, holding the form draft `D`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<D> {
    /// No modal is open.
    Idle,
    /// The form is open, possibly showing why the last attempt was rejected.
    FormOpen {
        /// Whether the form creates or updates.
        mode: FormMode,
        /// The values in the form.
        draft: D,
        /// The message shown above the form.
        error: Option<String>,
    },
    /// The validated values are shown for confirmation.
    ConfirmOpen {
        /// Whether the form creates or updates.
        mode: FormMode,
        /// The validated values.
        draft: D,
    },
    /// The confirmed values have been sent to the backend.
    Submitting {
        /// Whether the form creates or updates.
        mode: FormMode,
        /// The values that were sent.
        draft: D,
    },
    /// The transaction history of an account is shown.
    HistoryOpen {
        /// The account whose history is shown.
        account_number: String,
    },
    /// The user is asked to confirm a delete.
    DeleteConfirmOpen {
        /// What would be deleted.
        target: DeleteTarget,
    },
}

/// Something the user did, or a result from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalEvent<D> {
    /// The create or update action was chosen. The draft is empty for a
    /// create and holds the current values for an update.
    Open {
        /// Whether the form creates or updates.
        mode: FormMode,
        /// The values to put in the form.
        draft: D,
    },
    /// The form was submitted and passed validation.
    Validated(D),
    /// The form was submitted and failed validation.
    Rejected {
        /// The values as entered.
        draft: D,
        /// Why the values were rejected.
        message: String,
    },
    /// The user backed out of the confirmation to change the values.
    Back,
    /// The user confirmed and the request was sent.
    Confirm,
    /// The backend accepted the request.
    Succeeded,
    /// The backend rejected the request or could not be reached.
    Failed {
        /// The message to show above the form.
        message: String,
    },
    /// The user asked to see an account's transaction history.
    ShowHistory {
        /// The account whose history to show.
        account_number: String,
    },
    /// The user asked to delete something.
    AskDelete(DeleteTarget),
    /// The user dismissed the modal.
    Close,
}

impl<D> ModalState<D> {
    /// The state after `event`.
    ///
    /// Events that do not apply to the current state, such as confirming
    /// while the form is still open, leave the state unchanged.
    pub fn apply(self, event: ModalEvent<D>) -> Self {
        match (self, event) {
            (_, ModalEvent::Close) => ModalState::Idle,
            (ModalState::Idle, ModalEvent::Open { mode, draft }) => ModalState::FormOpen {
                mode,
                draft,
                error: None,
            },
            (ModalState::Idle, ModalEvent::ShowHistory { account_number }) => {
                ModalState::HistoryOpen { account_number }
            }
            (ModalState::Idle, ModalEvent::AskDelete(target)) => {
                ModalState::DeleteConfirmOpen { target }
            }
            (ModalState::FormOpen { mode, .. }, ModalEvent::Validated(draft)) => {
                ModalState::ConfirmOpen { mode, draft }
            }
            (ModalState::FormOpen { mode, .. }, ModalEvent::Rejected { draft, message }) => {
                ModalState::FormOpen {
                    mode,
                    draft,
                    error: Some(message),
                }
            }
            (ModalState::ConfirmOpen { mode, draft }, ModalEvent::Back) => ModalState::FormOpen {
                mode,
                draft,
                error: None,
            },
            (ModalState::ConfirmOpen { mode, draft }, ModalEvent::Confirm) => {
                ModalState::Submitting { mode, draft }
            }
            (ModalState::Submitting { .. }, ModalEvent::Succeeded) => ModalState::Idle,
            (ModalState::Submitting { mode, draft }, ModalEvent::Failed { message }) => {
                ModalState::FormOpen {
                    mode,
                    draft,
                    error: Some(message),
                }
            }
            (state, event) => {
                tracing::debug!(
                    "ignoring modal event {} in state {}",
                    event.name(),
                    state.name()
                );
                state
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ModalState::Idle => "Idle",
            ModalState::FormOpen { .. } => "FormOpen",
            ModalState::ConfirmOpen { .. } => "ConfirmOpen",
            ModalState::Submitting { .. } => "Submitting",
            ModalState::HistoryOpen { .. } => "HistoryOpen",
            ModalState::DeleteConfirmOpen { .. } => "DeleteConfirmOpen",
        }
    }
}

impl<D> ModalEvent<D> {
    fn name(&self) -> &'static str {
        match self {
            ModalEvent::Open { .. } => "Open",
            ModalEvent::Validated(_) => "Validated",
            ModalEvent::Rejected { .. } => "Rejected",
            ModalEvent::Back => "Back",
            ModalEvent::Confirm => "Confirm",
            ModalEvent::Succeeded => "Succeeded",
            ModalEvent::Failed { .. } => "Failed",
            ModalEvent::ShowHistory { .. } => "ShowHistory",
            ModalEvent::AskDelete(_) => "AskDelete",
            ModalEvent::Close => "Close",
        }
    }
}

#[cfg(test)]
mod modal_state_tests {
    use crate::{
        deposit_kind::DepositKind,
        validation::{DepositDraft, validate_deposit},
    };

    use super::{DeleteTarget, FormMode, ModalEvent, ModalState};

    fn draft(amount: &str) -> DepositDraft {
        DepositDraft {
            amount: amount.to_owned(),
            interest_rate: "7".to_owned(),
            tenure_months: "12".to_owned(),
        }
    }

    fn submit(
        state: ModalState<DepositDraft>,
        kind: DepositKind,
        draft: DepositDraft,
    ) -> ModalState<DepositDraft> {
        let event = match validate_deposit(kind, &draft) {
            Ok(_) => ModalEvent::Validated(draft),
            Err(error) => ModalEvent::Rejected {
                draft,
                message: error.to_string(),
            },
        };

        state.apply(event)
    }

    fn open_create() -> ModalState<DepositDraft> {
        ModalState::Idle.apply(ModalEvent::Open {
            mode: FormMode::Create,
            draft: DepositDraft::default(),
        })
    }

    #[test]
    fn successful_create_returns_to_idle() {
        let state = submit(open_create(), DepositKind::Fixed, draft("5000"));
        assert!(matches!(state, ModalState::ConfirmOpen { .. }));

        let state = state.apply(ModalEvent::Confirm);
        assert!(matches!(state, ModalState::Submitting { .. }));

        assert_eq!(state.apply(ModalEvent::Succeeded), ModalState::Idle);
    }

    #[test]
    fn small_recurring_deposit_stays_in_form() {
        let state = submit(open_create(), DepositKind::Recurring, draft("50"));

        assert_eq!(
            state,
            ModalState::FormOpen {
                mode: FormMode::Create,
                draft: draft("50"),
                error: Some("Deposit amount must be at least ₹100".to_owned()),
            }
        );
    }

    #[test]
    fn backing_out_of_confirmation_keeps_values() {
        let mode = FormMode::Update {
            account_number: "RD0007".to_owned(),
        };
        let state = ModalState::Idle.apply(ModalEvent::Open {
            mode: mode.clone(),
            draft: draft("500"),
        });
        let state = submit(state, DepositKind::Recurring, draft("800"));

        let state = state.apply(ModalEvent::Back);

        assert_eq!(
            state,
            ModalState::FormOpen {
                mode,
                draft: draft("800"),
                error: None,
            }
        );
    }

    #[test]
    fn failed_submission_reopens_form_with_values() {
        let state = submit(open_create(), DepositKind::Fixed, draft("5000"))
            .apply(ModalEvent::Confirm)
            .apply(ModalEvent::Failed {
                message: "Failed to create FD account: timeout".to_owned(),
            });

        assert_eq!(
            state,
            ModalState::FormOpen {
                mode: FormMode::Create,
                draft: draft("5000"),
                error: Some("Failed to create FD account: timeout".to_owned()),
            }
        );
    }

    #[test]
    fn confirm_is_ignored_while_form_is_open() {
        let state = open_create();

        assert_eq!(state.clone().apply(ModalEvent::Confirm), state);
    }

    #[test]
    fn history_and_delete_open_from_idle_only() {
        let history = ModalState::<DepositDraft>::Idle.apply(ModalEvent::ShowHistory {
            account_number: "SB001".to_owned(),
        });
        assert_eq!(
            history,
            ModalState::HistoryOpen {
                account_number: "SB001".to_owned()
            }
        );

        let target = DeleteTarget::AllOfCustomer { customer_id: 4 };
        assert_eq!(
            history.clone().apply(ModalEvent::AskDelete(target.clone())),
            history
        );
        assert_eq!(
            ModalState::<DepositDraft>::Idle.apply(ModalEvent::AskDelete(target.clone())),
            ModalState::DeleteConfirmOpen { target }
        );
    }

    #[test]
    fn close_always_returns_to_idle() {
        let state = submit(open_create(), DepositKind::Fixed, draft("5000"));

        assert_eq!(state.apply(ModalEvent::Close), ModalState::Idle);
    }

    #[test]
    fn blank_account_number_means_create() {
        assert_eq!(FormMode::from_account_number(Some("  ")), FormMode::Create);
        assert_eq!(FormMode::from_account_number(None), FormMode::Create);
        assert_eq!(
            FormMode::from_account_number(Some("FD1")).account_number(),
            Some("FD1")
        );
    }
}
