#![forbid(unsafe_code)]

//! HTML template for a single card.
//!
//! Platform independent so the exact markup is testable natively; the wasm
//! module assigns the result to the card element's `innerHTML`.

use idlegrid_core::Card;

/// CSS class every card element carries.
pub const CARD_CLASS: &str = "card";

/// Thumbnail dimensions in CSS pixels.
pub const THUMB_WIDTH: u32 = 400;
pub const THUMB_HEIGHT: u32 = 300;

/// Inner HTML for `card`, with `thumbnail_src` as the image source.
#[must_use]
pub fn card_inner_html(card: &Card, thumbnail_src: &str) -> String {
    let description = escape_html(card.description());
    format!(
        concat!(
            "<img src=\"{src}\" alt=\"{alt}\" loading=\"lazy\" decoding=\"async\" ",
            "width=\"{w}\" height=\"{h}\">",
            "<h3>{title}</h3>",
            "<p>{desc}</p>",
            "<p>{desc}</p>",
            "<p>{price}</p>",
        ),
        src = escape_html(thumbnail_src),
        alt = escape_html(&card.thumbnail_alt()),
        w = THUMB_WIDTH,
        h = THUMB_HEIGHT,
        title = escape_html(&card.title()),
        desc = description,
        price = escape_html(&card.price_label()),
    )
}

/// Escape text for use in element content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parse the `data-index` attribute written on every card element.
#[must_use]
pub fn parse_card_index(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}
