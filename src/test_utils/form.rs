use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Asserts that `form` sends its request to `endpoint` via the HTMX `attribute`, e.g. "hx-post".
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "form {attribute} should be \"{endpoint}\""
    );
}

/// Finds the input called `name` and checks that it is a required input of `type_`.
#[track_caller]
fn must_get_required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();
    let input = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input named \"{name}\""));

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "input {name} should have type \"{type_}\""
    );
    assert!(
        input.value().attr("required").is_some(),
        "input {name} should be required"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_required_input(form, name, type_);
}

/// Like [assert_form_input], and the input must also be filled with `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_required_input(form, name, type_);

    assert_eq!(
        input.value().attr("value"),
        Some(value),
        "input {name} should hold \"{value}\""
    );
}

/// Asserts the message of the form's `role="alert"` paragraph.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want: &str) {
    let selector = Selector::parse("p[role=\"alert\"]").unwrap();
    let message = form
        .select(&selector)
        .next()
        .expect("No form error found")
        .text()
        .collect::<String>();

    assert_eq!(message.trim(), want);
}
