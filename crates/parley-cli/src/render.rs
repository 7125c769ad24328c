//! Plain-text rendering of conversation and settings data.

use parley_chat::{Exchange, KeyStatus, ModelCatalog};
use parley_session::ServerErrors;

pub fn exchange(exchange: &Exchange) -> String {
    let reply = match &exchange.response_text {
        Some(text) => text.as_str(),
        None if exchange.is_pending() => "(waiting for reply)",
        None => "(no reply)",
    };
    format!("> {}\n{}\n", exchange.user_text, reply)
}

/// One line per general message, then one per field as `field: messages`.
pub fn server_errors(errors: &ServerErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors.general().to_vec();
    lines.extend(
        errors
            .fields()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" "))),
    );
    lines
}

pub fn key_status(status: &KeyStatus) -> String {
    match (status.has_key, &status.key_preview) {
        (true, Some(preview)) => format!("key: {preview}\nmodel: {}", status.selected_model),
        (true, None) => format!("key: saved\nmodel: {}", status.selected_model),
        (false, _) => format!(
            "key: none (the server default key is used)\nmodel: {}",
            status.selected_model
        ),
    }
}

pub fn models(catalog: &ModelCatalog) -> String {
    let selected = catalog.selected_model.as_deref();
    catalog
        .models
        .iter()
        .map(|model| {
            let marker = if Some(model.id.as_str()) == selected { "*" } else { " " };
            format!(
                "{marker} {:<32} {:<28} {:>7} tokens  {}",
                model.id, model.name, model.context_window, model.owned_by
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use parley_chat::{ExchangeId, ExchangeStatus, ModelInfo};
    use serde_json::json;

    use super::*;

    #[test]
    fn pending_exchange_shows_placeholder() {
        let exchange = Exchange {
            id: ExchangeId::Local(1),
            user_text: "hi".into(),
            response_text: None,
            status: ExchangeStatus::Pending,
            created_at: None,
        };
        assert_eq!(super::exchange(&exchange), "> hi\n(waiting for reply)\n");
    }

    #[test]
    fn field_errors_are_listed_per_field() {
        let errors = ServerErrors::from_body(
            400,
            &json!({
                "non_field_errors": ["Invalid input."],
                "password": ["This password is too short.", "This password is too common."]
            }),
        );
        assert_eq!(
            server_errors(&errors),
            vec![
                "Invalid input.".to_string(),
                "password: This password is too short. This password is too common.".to_string(),
            ]
        );
    }

    #[test]
    fn selected_model_is_marked() {
        let catalog = ModelCatalog {
            models: vec![
                ModelInfo {
                    id: "a".into(),
                    name: "A".into(),
                    context_window: 8192,
                    owned_by: "x".into(),
                },
                ModelInfo {
                    id: "b".into(),
                    name: "B".into(),
                    context_window: 8192,
                    owned_by: "y".into(),
                },
            ],
            selected_model: Some("b".into()),
        };
        let lines: Vec<_> = models(&catalog).lines().map(str::to_owned).collect();
        assert!(lines[0].starts_with("  a"));
        assert!(lines[1].starts_with("* b"));
    }
}
