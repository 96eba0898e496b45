//! The shared form for creating and editing a transaction.

use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{
    account::Account,
    category::Category,
    group::Group,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, loading_spinner,
    },
    member::Member,
    period::{Period, PeriodId},
    transaction::core::{
        Recurrence, ResponsibleParty, Transaction, TransactionKind, TransactionStatus,
    },
};

pub(super) struct TransactionFormConfig<'a> {
    /// The URL the form submits to.
    pub action: &'a str,
    /// Submit with PUT (editing) instead of POST (creating).
    pub use_put: bool,
    /// Existing values when editing.
    pub transaction: Option<&'a Transaction>,
    pub accounts: &'a [Account],
    pub categories: &'a [Category],
    pub members: &'a [Member],
    pub groups: &'a [Group],
    pub periods: &'a [Period],
    /// Today in the user's timezone, the default transaction date.
    pub default_date: Date,
    /// The active period, preselected for new transactions.
    pub default_period_id: Option<PeriodId>,
}

pub(super) fn transaction_form(config: &TransactionFormConfig) -> Markup {
    let kind = config
        .transaction
        .map(|t| t.kind)
        .unwrap_or(TransactionKind::Expense);
    let is_transfer = kind == TransactionKind::Transfer;
    let status = config
        .transaction
        .map(|t| t.status)
        .unwrap_or(TransactionStatus::Completed);
    let recurrence = config
        .transaction
        .map(|t| t.recurrence)
        .unwrap_or(Recurrence::OneOff);
    let amount = config.transaction.map(|t| format!("{:.2}", t.amount));
    let date = config
        .transaction
        .map(|t| t.date)
        .unwrap_or(config.default_date);
    let description = config
        .transaction
        .map(|t| t.description.as_str())
        .unwrap_or_default();
    let category_id = config.transaction.and_then(|t| t.category_id);
    let account_id = config.transaction.map(|t| t.account_id);
    let counterpart_account_id = config.transaction.and_then(|t| t.counterpart_account_id);
    let responsible = config.transaction.and_then(|t| t.responsible);
    let period_id = config
        .transaction
        .map(|t| t.period_id)
        .unwrap_or(config.default_period_id);
    let submit_label = if config.use_put {
        "Save Transaction"
    } else {
        "Create Transaction"
    };

    html!(
        form
            hx-post=[(!config.use_put).then_some(config.action)]
            hx-put=[config.use_put.then_some(config.action)]
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class={(FORM_CONTAINER_STYLE) " space-y-4 w-full"}
        {
            div class="w-full"
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }
                select name="kind" id="kind" class=(FORM_SELECT_STYLE)
                {
                    @for option in [
                        TransactionKind::Expense,
                        TransactionKind::Income,
                        TransactionKind::Transfer,
                    ] {
                        option value=(option.as_str()) selected[kind == option]
                        {
                            (option.label())
                        }
                    }
                }
            }

            div class="w-full"
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                div class="input-wrapper w-full"
                {
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        step="0.01"
                        min="0.01"
                        value=[amount.as_deref()]
                        placeholder="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="w-full"
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input
                    type="date"
                    name="date"
                    id="date"
                    value=(date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-full"
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input
                    type="text"
                    name="description"
                    id="description"
                    value=(description)
                    placeholder="Description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-full"
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }
                select name="account_id" id="account_id" required class=(FORM_SELECT_STYLE)
                {
                    @if account_id.is_none() {
                        option value="" selected disabled { "Select an account" }
                    }

                    @for account in config.accounts {
                        option value=(account.id) selected[account_id == Some(account.id)]
                        {
                            (account.name)
                        }
                    }
                }
            }

            div class="w-full transfer-field" hidden[!is_transfer]
            {
                label for="counterpart_account_id" class=(FORM_LABEL_STYLE) { "To account" }
                select
                    name="counterpart_account_id"
                    id="counterpart_account_id"
                    class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[counterpart_account_id.is_none()]
                    {
                        "Select an account"
                    }

                    @for account in config.accounts {
                        option
                            value=(account.id)
                            selected[counterpart_account_id == Some(account.id)]
                        {
                            (account.name)
                        }
                    }
                }
            }

            div class="w-full non-transfer-field" hidden[is_transfer]
            {
                label for="status" class=(FORM_LABEL_STYLE) { "Status" }
                select name="status" id="status" class=(FORM_SELECT_STYLE)
                {
                    @for option in [TransactionStatus::Completed, TransactionStatus::Planned] {
                        option value=(option.as_str()) selected[status == option]
                        {
                            (option.label())
                        }
                    }
                }
            }

            div class="w-full"
            {
                label for="recurrence" class=(FORM_LABEL_STYLE) { "Repeats" }
                select name="recurrence" id="recurrence" class=(FORM_SELECT_STYLE)
                {
                    @for option in Recurrence::ALL {
                        option value=(option.as_str()) selected[recurrence == option]
                        {
                            (option.label())
                        }
                    }
                }
            }

            @if !config.categories.is_empty() {
                div class="w-full non-transfer-field" hidden[is_transfer]
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                    select name="category_id" id="category_id" class=(FORM_SELECT_STYLE)
                    {
                        option value="" selected[category_id.is_none()] { "No category" }

                        @for category in config.categories {
                            option
                                value=(category.id)
                                selected[category_id == Some(category.id)]
                            {
                                @if category.parent_id.is_some() {
                                    "\u{a0}\u{a0}"
                                }
                                (category.name)
                            }
                        }
                    }
                }
            }

            div class="w-full non-transfer-field" hidden[is_transfer]
            {
                label for="responsible" class=(FORM_LABEL_STYLE) { "Responsible" }
                select name="responsible" id="responsible" class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[responsible.is_none()] { "No one in particular" }

                    optgroup label="Members"
                    {
                        @for member in config.members {
                            @let value = ResponsibleParty::Member(member.id).form_value();
                            option
                                value=(value)
                                selected[responsible == Some(ResponsibleParty::Member(member.id))]
                            {
                                (member.name)
                            }
                        }
                    }

                    optgroup label="Groups"
                    {
                        @for group in config.groups {
                            @let value = ResponsibleParty::Group(group.id).form_value();
                            option
                                value=(value)
                                selected[responsible == Some(ResponsibleParty::Group(group.id))]
                            {
                                (group.name)
                            }
                        }
                    }
                }
            }

            @if !config.periods.is_empty() {
                div class="w-full"
                {
                    label for="period_id" class=(FORM_LABEL_STYLE) { "Period" }
                    select name="period_id" id="period_id" class=(FORM_SELECT_STYLE)
                    {
                        option value="" selected[period_id.is_none()] { "No period" }

                        @for period in config.periods {
                            option value=(period.id) selected[period_id == Some(period.id)]
                            {
                                (period.name)
                            }
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    )
}

/// Swaps the transfer-only and non-transfer fields in and out as the type
/// select changes.
pub(super) fn kind_toggle_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(
        r#"
        document.addEventListener('change', (event) => {
            if (event.target.id !== 'kind') return;
            const isTransfer = event.target.value === 'transfer';
            document.querySelectorAll('.transfer-field')
                .forEach((field) => { field.hidden = !isTransfer; });
            document.querySelectorAll('.non-transfer-field')
                .forEach((field) => { field.hidden = isTransfer; });
        });
        "#
        .to_owned(),
    ))
}

#[cfg(test)]
mod transaction_form_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{TransactionFormConfig, transaction_form};

    #[test]
    fn transfer_fields_start_hidden_for_new_transactions() {
        let markup = transaction_form(&TransactionFormConfig {
            action: "/api/transactions",
            use_put: false,
            transaction: None,
            accounts: &[],
            categories: &[],
            members: &[],
            groups: &[],
            periods: &[],
            default_date: date!(2025 - 01 - 10),
            default_period_id: None,
        });
        let html = Html::parse_fragment(&markup.into_string());

        let transfer_selector = Selector::parse(".transfer-field[hidden]").unwrap();
        assert_eq!(html.select(&transfer_selector).count(), 1);
        let visible_selector = Selector::parse(".non-transfer-field[hidden]").unwrap();
        assert_eq!(html.select(&visible_selector).count(), 0);
    }
}
