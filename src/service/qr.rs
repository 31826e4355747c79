//! Room QR codes. Pure functions of the configured base URL, the room and an
//! optional action; nothing here touches the database.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::error::{AppError, AppResult};
use crate::model::sign_event::SignAction;

const QR_MIN_DIMENSION: u32 = 240;

/// URL a caregiver lands on after scanning the room's code
pub fn room_sign_url(base_url: &str, room_id: i64, action: Option<SignAction>) -> String {
    let mut url = format!("{}/sign?room_id={}", base_url.trim_end_matches('/'), room_id);
    if let Some(action) = action {
        url.push_str("&action=");
        url.push_str(action.as_ref());
    }
    url
}

/// SVG QR code for `payload` as a `data:` URL
pub fn qr_data_url(payload: &str) -> AppResult<String> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encoding failed: {e}")))?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}

/// Printable page with the room's code
pub fn room_qr_page(base_url: &str, room_id: i64, action: Option<SignAction>) -> AppResult<String> {
    let url = room_sign_url(base_url, room_id, action);
    let data_url = qr_data_url(&url)?;
    let title = match action {
        Some(action) => format!("QR Code for Room {room_id} (sign {action})"),
        None => format!("QR Code for Room {room_id}"),
    };

    let shown_url = url.replace('&', "&amp;");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>{title}</title></head>
  <body>
    <h1>{title}</h1>
    <img src="{data_url}" alt="{title}" />
    <p>{shown_url}</p>
    <button onclick="window.print()">Print</button>
  </body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_room_and_action() {
        assert_eq!(
            room_sign_url("https://kids.example.org/", 2, None),
            "https://kids.example.org/sign?room_id=2"
        );
        assert_eq!(
            room_sign_url("https://kids.example.org", 3, Some(SignAction::Out)),
            "https://kids.example.org/sign?room_id=3&action=out"
        );
    }

    #[test]
    fn same_input_same_image() {
        let a = qr_data_url("https://kids.example.org/sign?room_id=2").unwrap();
        let b = qr_data_url("https://kids.example.org/sign?room_id=2").unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("data:image/svg+xml;base64,"));

        let svg = STANDARD
            .decode(a.trim_start_matches("data:image/svg+xml;base64,"))
            .unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("<svg"));
    }

    #[test]
    fn page_embeds_image_and_url() {
        let page = room_qr_page("http://localhost:3000", 1, Some(SignAction::In)).unwrap();
        assert!(page.contains("QR Code for Room 1 (sign in)"));
        assert!(page.contains("http://localhost:3000/sign?room_id=1&amp;action=in"));
        assert!(page.contains("<img src=\"data:image/svg+xml;base64,"));
    }
}
