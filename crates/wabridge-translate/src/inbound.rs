// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent envelope to consumer message.
//!
//! Selects with up to [`MAX_BUTTONS`] options become reply buttons, larger
//! ones become a single-section list. Collections become multi-section
//! lists. Media is routed by MIME prefix.

use tracing::warn;

use wabridge_config::model::LabelsConfig;
use wabridge_core::consumer::{
    ButtonAction, CtaAction, Interactive, InteractiveText, ListAction, ListRow, ListSection,
    MediaRef, OutgoingBody, OutgoingLocation, OutgoingMessage, ReplyButton,
};
use wabridge_core::envelope::{
    AgentContent, AgentMessage, Collection, Location, MediaLink, Select, WebLink, mime,
};
use wabridge_core::BridgeError;

/// Most reply buttons a message may carry.
pub const MAX_BUTTONS: usize = 3;
/// Most rows a list message may carry, across all sections.
pub const MAX_LIST_ROWS: usize = 10;

const BUTTON_TITLE_LEN: usize = 20;
const ROW_TITLE_LEN: usize = 24;
const SECTION_TITLE_LEN: usize = 24;
const LIST_BUTTON_LEN: usize = 20;

/// Pure translator from agent envelopes to consumer messages.
#[derive(Debug, Clone, Default)]
pub struct InboundTranslator {
    labels: LabelsConfig,
}

impl InboundTranslator {
    pub fn new(labels: LabelsConfig) -> Self {
        Self { labels }
    }

    /// Translates `message` into a consumer message addressed to `to`.
    pub fn translate(&self, message: &AgentMessage, to: &str) -> Result<OutgoingMessage, BridgeError> {
        let body = match &message.content {
            AgentContent::Text(body) => OutgoingBody::text(body.clone()),
            AgentContent::Select(select) => self.select(select)?,
            AgentContent::Collection(collection) => self.collection(collection)?,
            AgentContent::MediaLink(link) => media(link)?,
            AgentContent::Location(location) => location_body(location),
            AgentContent::WebLink(link) => web_link(link)?,
            AgentContent::ChatState(_) | AgentContent::Other { .. } => {
                return Err(BridgeError::unsupported(message.content.mime_type()));
            }
        };
        Ok(OutgoingMessage::new(to, body))
    }

    fn select(&self, select: &Select) -> Result<OutgoingBody, BridgeError> {
        if select.options.is_empty() {
            return Err(BridgeError::malformed(mime::SELECT, "select has no options"));
        }
        let body = InteractiveText::new(
            non_empty(select.text.as_deref()).unwrap_or(&self.labels.button_prompt),
        );

        let interactive = if select.options.len() <= MAX_BUTTONS {
            let buttons = select
                .options
                .iter()
                .map(|opt| ReplyButton::reply(opt.key(), truncate(&opt.text, BUTTON_TITLE_LEN)))
                .collect();
            Interactive::Button {
                body,
                action: ButtonAction { buttons },
            }
        } else {
            let rows = select
                .options
                .iter()
                .map(|opt| ListRow {
                    id: opt.key(),
                    title: truncate(&opt.text, ROW_TITLE_LEN),
                    description: None,
                })
                .collect();
            let title = non_empty(select.title.as_deref()).unwrap_or(&self.labels.list_section);
            Interactive::List {
                body,
                action: ListAction {
                    button: truncate(&self.labels.list_button, LIST_BUTTON_LEN),
                    sections: cap_rows(vec![ListSection {
                        title: truncate(title, SECTION_TITLE_LEN),
                        rows,
                    }]),
                },
            }
        };
        Ok(OutgoingBody::Interactive { interactive })
    }

    fn collection(&self, collection: &Collection) -> Result<OutgoingBody, BridgeError> {
        if collection.item_type != mime::DOCUMENT_SELECT {
            return Err(BridgeError::unsupported(format!(
                "{} of {}",
                mime::COLLECTION,
                collection.item_type
            )));
        }
        if collection.items.is_empty() {
            return Err(BridgeError::malformed(mime::COLLECTION, "collection has no items"));
        }

        let sections: Vec<ListSection> = collection
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.options.is_empty())
            .map(|(i, item)| {
                let title = item
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} {}", self.labels.collection_item, i + 1));
                let rows = item
                    .options
                    .iter()
                    .enumerate()
                    .map(|(j, opt)| {
                        let fallback = format!("{} {}", self.labels.collection_option, j + 1);
                        ListRow {
                            id: format!("{}.{}", i + 1, j + 1),
                            title: truncate(opt.label_text().unwrap_or(&fallback), ROW_TITLE_LEN),
                            description: None,
                        }
                    })
                    .collect();
                ListSection {
                    title: truncate(&title, SECTION_TITLE_LEN),
                    rows,
                }
            })
            .collect();
        if sections.is_empty() {
            return Err(BridgeError::malformed(
                mime::COLLECTION,
                "no collection item has options",
            ));
        }

        Ok(OutgoingBody::Interactive {
            interactive: Interactive::List {
                body: InteractiveText::new(self.labels.collection_prompt.clone()),
                action: ListAction {
                    button: truncate(&self.labels.list_button, LIST_BUTTON_LEN),
                    sections: cap_rows(sections),
                },
            },
        })
    }
}

fn media(link: &MediaLink) -> Result<OutgoingBody, BridgeError> {
    if link.uri.is_empty() {
        return Err(BridgeError::malformed(mime::MEDIA_LINK, "media link has no uri"));
    }
    let mime_type = link.mime_type.to_ascii_lowercase();
    let with_caption = || MediaRef {
        link: link.uri.clone(),
        caption: link.title.clone().filter(|t| !t.is_empty()),
        filename: None,
    };
    let bare = || MediaRef {
        link: link.uri.clone(),
        caption: None,
        filename: None,
    };

    let body = if mime_type.starts_with("image/") {
        OutgoingBody::Image { image: with_caption() }
    } else if mime_type.starts_with("sticker/") {
        OutgoingBody::Sticker { sticker: bare() }
    } else if mime_type.starts_with("audio/") || mime_type.starts_with("voice/") {
        OutgoingBody::Audio { audio: with_caption() }
    } else if mime_type.starts_with("video/") {
        OutgoingBody::Video { video: with_caption() }
    } else if mime_type == "application/pdf" {
        OutgoingBody::Document { document: with_caption() }
    } else {
        return Err(BridgeError::unsupported(format!(
            "{} ({})",
            mime::MEDIA_LINK,
            link.mime_type
        )));
    };
    Ok(body)
}

fn location_body(location: &Location) -> OutgoingBody {
    let label = location.text.clone().filter(|t| !t.is_empty());
    OutgoingBody::Location {
        location: OutgoingLocation {
            latitude: location.latitude,
            longitude: location.longitude,
            name: label.clone(),
            address: label,
        },
    }
}

fn web_link(link: &WebLink) -> Result<OutgoingBody, BridgeError> {
    if link.uri.is_empty() {
        return Err(BridgeError::malformed(mime::WEB_LINK, "web link has no uri"));
    }
    let title = non_empty(link.title.as_deref()).unwrap_or(&link.uri);
    let body = non_empty(link.text.as_deref()).unwrap_or(title);
    Ok(OutgoingBody::Interactive {
        interactive: Interactive::CtaUrl {
            body: InteractiveText::new(body),
            action: CtaAction::url(truncate(title, BUTTON_TITLE_LEN), link.uri.clone()),
        },
    })
}

/// Drops rows past [`MAX_LIST_ROWS`], then any section left empty.
fn cap_rows(sections: Vec<ListSection>) -> Vec<ListSection> {
    let total: usize = sections.iter().map(|s| s.rows.len()).sum();
    if total <= MAX_LIST_ROWS {
        return sections;
    }
    warn!(total, kept = MAX_LIST_ROWS, "list exceeds row limit, dropping extra rows");

    let mut remaining = MAX_LIST_ROWS;
    sections
        .into_iter()
        .filter_map(|mut section| {
            section.rows.truncate(remaining);
            remaining -= section.rows.len();
            (!section.rows.is_empty()).then_some(section)
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn envelope(value: Value) -> AgentMessage {
        serde_json::from_value(value).unwrap()
    }

    fn select(count: usize) -> AgentMessage {
        let options: Vec<Value> = (1..=count)
            .map(|i| json!({"order": i, "text": format!("Option {i}")}))
            .collect();
        envelope(json!({
            "from": "mybot@msging.net",
            "type": "application/vnd.lime.select+json",
            "content": {"text": "Pick one", "options": options}
        }))
    }

    fn translate(message: &AgentMessage) -> Result<Value, BridgeError> {
        InboundTranslator::default()
            .translate(message, "5531999999999")
            .map(|m| serde_json::to_value(m).unwrap())
    }

    #[test]
    fn text_is_verbatim() {
        let out = translate(&envelope(json!({"type": "text/plain", "content": "Olá!"}))).unwrap();
        assert_eq!(
            out,
            json!({"messaging_product": "whatsapp", "to": "5531999999999", "type": "text", "text": {"body": "Olá!"}})
        );
    }

    #[test]
    fn three_options_render_as_buttons() {
        let out = translate(&select(3)).unwrap();
        assert_eq!(out["interactive"]["type"], "button");
        let buttons = out["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0]["reply"], json!({"id": "1", "title": "Option 1"}));
        assert_eq!(out["interactive"]["body"]["text"], "Pick one");
    }

    #[test]
    fn four_options_render_as_list() {
        let out = translate(&select(4)).unwrap();
        assert_eq!(out["interactive"]["type"], "list");
        let sections = out["interactive"]["action"]["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0]["title"], "Options");
        assert_eq!(sections[0]["rows"].as_array().unwrap().len(), 4);
        assert_eq!(out["interactive"]["action"]["button"], "View options");
    }

    #[test]
    fn oversized_list_is_capped() {
        let out = translate(&select(12)).unwrap();
        let rows = out["interactive"]["action"]["sections"][0]["rows"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), MAX_LIST_ROWS);
    }

    #[test]
    fn button_ids_fall_back_to_text_and_titles_are_truncated() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.select+json",
            "content": {"options": [{"text": "A very long option label indeed"}]}
        }));
        let out = translate(&msg).unwrap();
        let button = &out["interactive"]["action"]["buttons"][0]["reply"];
        assert_eq!(button["id"], "A very long option label indeed");
        assert_eq!(button["title"].as_str().unwrap().chars().count(), 20);
        assert_eq!(out["interactive"]["body"]["text"], "Choose an option:");
    }

    #[test]
    fn empty_select_is_malformed() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.select+json",
            "content": {"text": "Pick", "options": []}
        }));
        assert!(matches!(
            translate(&msg),
            Err(BridgeError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn collection_sections_and_fallback_titles() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.collection+json",
            "content": {
                "itemType": "application/vnd.lime.document-select+json",
                "items": [
                    {"header": {"type": "application/vnd.lime.media-link+json", "value": {"title": "Plans"}},
                     "options": [{"label": {"type": "text/plain", "value": "Basic"}},
                                 {"label": {"type": "text/plain", "value": "Pro"}}]},
                    {"options": [{"label": {"type": "text/plain", "value": "Talk to us"}}]}
                ]
            }
        }));
        let out = translate(&msg).unwrap();
        assert_eq!(out["interactive"]["type"], "list");
        assert_eq!(out["interactive"]["body"]["text"], "See the options below:");
        let sections = out["interactive"]["action"]["sections"].as_array().unwrap();
        assert_eq!(sections[0]["title"], "Plans");
        assert_eq!(sections[0]["rows"][1]["title"], "Pro");
        assert_eq!(sections[1]["title"], "Item 2");
        assert_eq!(sections[1]["rows"][0]["id"], "2.1");
    }

    #[test]
    fn media_routes_by_mime_prefix() {
        let cases = [
            ("image/png", "image"),
            ("sticker/webp", "sticker"),
            ("audio/ogg; codecs=opus", "audio"),
            ("voice/ogg", "audio"),
            ("video/mp4", "video"),
            ("application/pdf", "document"),
        ];
        for (mime_type, expected) in cases {
            let msg = envelope(json!({
                "type": "application/vnd.lime.media-link+json",
                "content": {"type": mime_type, "uri": "https://cdn/x", "title": "cap"}
            }));
            let out = translate(&msg).unwrap();
            assert_eq!(out["type"], expected, "{mime_type}");
            assert_eq!(out[expected]["link"], "https://cdn/x");
        }
    }

    #[test]
    fn caption_only_where_supported() {
        let image = envelope(json!({
            "type": "application/vnd.lime.media-link+json",
            "content": {"type": "image/jpeg", "uri": "https://cdn/x", "title": "Receipt"}
        }));
        assert_eq!(translate(&image).unwrap()["image"]["caption"], "Receipt");

        let sticker = envelope(json!({
            "type": "application/vnd.lime.media-link+json",
            "content": {"type": "sticker/webp", "uri": "https://cdn/x", "title": "ignored"}
        }));
        assert!(translate(&sticker).unwrap()["sticker"].get("caption").is_none());

        let untitled = envelope(json!({
            "type": "application/vnd.lime.media-link+json",
            "content": {"type": "video/mp4", "uri": "https://cdn/x"}
        }));
        assert!(translate(&untitled).unwrap()["video"].get("caption").is_none());
    }

    #[test]
    fn audio_keeps_its_caption() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.media-link+json",
            "content": {"type": "audio/ogg", "uri": "https://cdn/x", "title": "voice note"}
        }));
        let out = translate(&msg).unwrap();
        assert_eq!(out["type"], "audio");
        assert_eq!(out["audio"]["caption"], "voice note");
    }

    #[test]
    fn collection_items_without_options_are_skipped() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.collection+json",
            "content": {
                "itemType": "application/vnd.lime.document-select+json",
                "items": [
                    {"header": {"type": "application/vnd.lime.media-link+json", "value": {"title": "A"}},
                     "options": []},
                    {"options": [{"label": {"type": "text/plain", "value": "Talk to us"}}]}
                ]
            }
        }));
        let out = translate(&msg).unwrap();
        let sections = out["interactive"]["action"]["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0]["title"], "Item 2");
        assert_eq!(sections[0]["rows"][0]["id"], "2.1");

        let empty = envelope(json!({
            "type": "application/vnd.lime.collection+json",
            "content": {
                "itemType": "application/vnd.lime.document-select+json",
                "items": [{"options": []}]
            }
        }));
        assert!(matches!(
            translate(&empty),
            Err(BridgeError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn unmapped_media_mime_fails() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.media-link+json",
            "content": {"type": "application/zip", "uri": "https://cdn/x"}
        }));
        assert!(matches!(
            translate(&msg),
            Err(BridgeError::UnsupportedMessageType { .. })
        ));
    }

    #[test]
    fn location_copies_label_to_name_and_address() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.location+json",
            "content": {"latitude": -19.92, "longitude": -43.94, "text": "Praça da Liberdade"}
        }));
        let out = translate(&msg).unwrap();
        assert_eq!(out["location"]["name"], "Praça da Liberdade");
        assert_eq!(out["location"]["address"], "Praça da Liberdade");
        assert_eq!(out["location"]["latitude"], -19.92);
    }

    #[test]
    fn web_link_becomes_cta_url() {
        let msg = envelope(json!({
            "type": "application/vnd.lime.web-link+json",
            "content": {"uri": "https://example.com/pay", "title": "Pay now", "text": "Your invoice"}
        }));
        let out = translate(&msg).unwrap();
        assert_eq!(out["interactive"]["type"], "cta_url");
        assert_eq!(out["interactive"]["body"]["text"], "Your invoice");
        assert_eq!(
            out["interactive"]["action"]["parameters"],
            json!({"display_text": "Pay now", "url": "https://example.com/pay"})
        );
    }

    #[test]
    fn unmodelled_and_presence_envelopes_are_unsupported() {
        let other = envelope(json!({"type": "application/vnd.lime.payment+json", "content": {}}));
        assert!(matches!(
            translate(&other),
            Err(BridgeError::UnsupportedMessageType { .. })
        ));
        let presence = envelope(json!({
            "type": "application/vnd.lime.chatstate+json",
            "content": {"state": "composing"}
        }));
        assert!(translate(&presence).is_err());
    }
}
