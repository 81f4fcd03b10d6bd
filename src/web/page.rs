//! HTML rendering for the single-page form

use crate::form::{FieldKind, FieldSpec, CLIENT_FIELDS};
use crate::types::client::{AttributeValue, ClientRecord};
use crate::types::prediction::{Outcome, Prediction};

const TITLE: &str = "Bank Term Deposit Prediction";
const DESCRIPTION: &str = "Predict whether a client will subscribe to a term deposit based on provided features. \
Created by Ataberk Kılavuzcu, Bora Kutun, Can Mızraklı and Umut Ulaş Balcı.";

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.8rem;font-weight:600}\
input,select{width:100%;padding:.35rem;margin-top:.2rem}\
button{margin-top:1.2rem;padding:.5rem 1.4rem}\
.notice{padding:.8rem 1rem;border-radius:.3rem;margin:1rem 0}\
.success{background:#e3f5e1;color:#1e5b1a}\
.warning{background:#fff4d6;color:#6b4f00}\
.error{background:#fde2e2;color:#8a1c1c}\
.note{font-size:.9rem;color:#555}";

/// What to show above the form after a submission
#[derive(Debug)]
pub enum Notice<'a> {
    Prediction(&'a Prediction),
    Error(String),
}

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{TITLE}</h1>\n<p>{DESCRIPTION}</p>\n{body}</body>\n</html>\n"
    )
}

/// The page shown when the artifacts failed to load: the error, and no form
pub fn render_unavailable(message: &str) -> String {
    layout(&format!(
        "<div class=\"notice error\">{}</div>\n",
        escape(message)
    ))
}

/// The form pre-filled with `record`, with an optional result notice
pub fn render_form(record: &ClientRecord, notice: Option<&Notice<'_>>) -> String {
    let fields: String = CLIENT_FIELDS
        .iter()
        .map(|spec| render_field(spec, record))
        .collect();

    let notice = notice.map(render_notice).unwrap_or_default();

    layout(&format!(
        "<h2>Input Client Features</h2>\n<form method=\"post\" action=\"/\">\n{fields}\
         <button type=\"submit\">Predict</button>\n</form>\n{notice}"
    ))
}

fn render_field(spec: &FieldSpec, record: &ClientRecord) -> String {
    let label = format!(
        "<label for=\"{name}\">{label}</label>\n",
        name = spec.name,
        label = escape(spec.label)
    );

    let control = match (spec.kind, record.attribute(spec.name)) {
        (FieldKind::Number { min, max, default }, value) => {
            let value = match value {
                Some(AttributeValue::Number(v)) => v,
                _ => default,
            };
            format!(
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required>\n",
                name = spec.name
            )
        }
        (FieldKind::Choice { choices }, value) => {
            let selected = match value {
                Some(AttributeValue::Category(v)) => v,
                _ => choices[0],
            };
            let options: String = choices
                .iter()
                .map(|choice| {
                    let marker = if *choice == selected { " selected" } else { "" };
                    format!(
                        "<option value=\"{value}\"{marker}>{value}</option>",
                        value = escape(choice)
                    )
                })
                .collect();
            format!(
                "<select id=\"{name}\" name=\"{name}\">{options}</select>\n",
                name = spec.name
            )
        }
    };

    label + &control
}

fn render_notice(notice: &Notice<'_>) -> String {
    match notice {
        Notice::Prediction(prediction) => {
            let class = match prediction.outcome {
                Outcome::Likely => "success",
                Outcome::Unlikely => "warning",
            };
            let notes: String = prediction
                .unseen_categories
                .iter()
                .map(|unseen| format!("<p class=\"note\">Note: {}</p>\n", escape(&unseen.note())))
                .collect();
            format!(
                "<div class=\"notice {class}\">{message}</div>\n\
                 <p>Prediction probabilities: {probabilities}</p>\n{notes}",
                message = escape(&prediction.message),
                probabilities = escape(&prediction.probabilities_display()),
            )
        }
        Notice::Error(message) => {
            format!("<div class=\"notice error\">{}</div>\n", escape(message))
        }
    }
}
