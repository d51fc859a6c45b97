//! Shared styles, page scaffolding and formatting helpers for the HTML views.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    endpoints,
    search::{SearchField, SearchSpec},
    timestamp::TIMESTAMP_SENTINEL,
};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const BUTTON_DANGER_STYLE: &str = "w-full px-4 py-2 bg-red-600 \
    hover:enabled:bg-red-700 disabled:bg-red-800 text-white rounded";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_ERROR_STYLE: &str = "text-red-500 text-base";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

pub const NEW_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-green-800 bg-green-100 rounded-full \
    dark:bg-green-900 dark:text-green-300";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// The ID of the element modals are swapped into.
pub const MODAL_CONTAINER_ID: &str = "modal-container";

/// Extra elements a page adds to the document head.
pub enum HeadElement {
    /// An inline stylesheet.
    Style(PreEscaped<String>),
    /// A script loaded from a URL.
    ScriptLink(String),
    /// An inline script.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Branch Desk" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::Style(text) => style { (text) }
                        HeadElement::ScriptLink(url) => script src=(url) {}
                        HeadElement::ScriptSource(text) => script { (text) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                div id=(MODAL_CONTAINER_ID) {}

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href=(endpoints::ROOT)
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

pub fn log_in_card(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            span class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                "Branch Desk"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

pub fn password_input(password: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="password"
                class=(FORM_LABEL_STYLE)
            {
                "Password"
            }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(password);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }

    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// CSS for putting a rupee sign in front of amount inputs wrapped in
/// `.input-wrapper`.
pub fn rupee_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: block;
        }
        .input-wrapper input {
            padding-left: 1.6rem;
        }
        .input-wrapper::before {
            content: '₹';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

/// Format an amount in rupees with two decimal places, e.g. "₹1,234.50".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = |prefix: &str| {
        Formatter::currency(prefix)
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    };

    if number == 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "₹0.00".to_owned();
    }

    let formatted_string = if number < 0.0 {
        NEGATIVE_FMT
            .get_or_init(|| formatter("-₹"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number.abs()))
    } else {
        POSITIVE_FMT
            .get_or_init(|| formatter("₹"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number))
    };

    let Some(mut formatted_string) = formatted_string else {
        return format!("₹{number:.2}");
    };

    // numfmt omits trailing zeros, so "12.30" comes out as "12.3" and "12.00" as "12".
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(dot) if formatted_string.len() - dot == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    formatted_string
}

/// Format a timestamp in the local timezone for display, e.g. "05 Mar 2024, 14:07".
pub fn format_timestamp(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    timestamp
        .to_offset(local_offset)
        .format(format_description!(
            "[day] [month repr:short] [year], [hour]:[minute]"
        ))
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Format the date part of a backend timestamp, e.g. "05 Mar 2024".
///
/// Timestamps that could not be parsed show as "Unknown".
pub fn format_date(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    if timestamp == TIMESTAMP_SENTINEL {
        return "Unknown".to_owned();
    }

    timestamp
        .to_offset(local_offset)
        .format(format_description!("[day] [month repr:short] [year]"))
        .unwrap_or_else(|_| timestamp.date().to_string())
}

/// A dialog rendered into the modal container, with a close button that
/// returns the page to idle.
pub fn modal(title: &str, content: &Markup) -> Markup {
    html! {
        div
            class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50 px-4"
            role="dialog"
            aria-modal="true"
        {
            div class="w-full max-w-lg max-h-[90vh] overflow-y-auto rounded-lg bg-white shadow dark:bg-gray-800 dark:text-white"
            {
                div class="flex items-center justify-between border-b p-4 dark:border-gray-700"
                {
                    h2 class="text-xl font-semibold" { (title) }

                    button
                        type="button"
                        aria-label="Close"
                        class="text-gray-500 hover:text-gray-900 dark:hover:text-white"
                        hx-get=(endpoints::MODAL_CLOSE)
                        hx-target={ "#" (MODAL_CONTAINER_ID) }
                    {
                        "×"
                    }
                }

                div class="p-4 space-y-4" { (content) }
            }
        }
    }
}

/// A search box with a field selector that reloads `target` from
/// `rows_endpoint` once typing has paused for `debounce_ms`.
pub fn search_controls(
    rows_endpoint: &str,
    target: &str,
    fields: &[SearchField],
    spec: &SearchSpec,
    debounce_ms: u128,
) -> Markup {
    html! {
        form
            class="flex flex-col sm:flex-row gap-2 w-full max-w-3xl mb-4"
            hx-get=(rows_endpoint)
            hx-target=(target)
            hx-target-error="#alert-container"
            hx-trigger={ "input changed delay:" (debounce_ms) "ms from:input, change from:select, submit" }
        {
            @if fields.len() > 1
            {
                select
                    name="field"
                    aria-label="Search by"
                    class={ (FORM_TEXT_INPUT_STYLE) " sm:w-48" }
                {
                    @for field in fields
                    {
                        option
                            value=(field.as_query_value())
                            selected[*field == spec.field()]
                        {
                            (field.label())
                        }
                    }
                }
            }
            @else if let Some(field) = fields.first()
            {
                input type="hidden" name="field" value=(field.as_query_value());
            }

            input
                type="search"
                name="q"
                placeholder="Search…"
                autocomplete="off"
                class=(FORM_TEXT_INPUT_STYLE)
                value=(spec.term());
        }
    }
}

/// A paragraph with an error message, shown in place of content that could not be loaded.
pub fn load_error(message: &str) -> Markup {
    html! {
        p class={ (FORM_ERROR_STYLE) " py-4" } role="alert" { (message) }
    }
}
