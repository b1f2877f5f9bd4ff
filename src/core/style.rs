use crate::models::layout::{
    BadgeStyle, LayoutConfig, DEFAULT_BADGE_FONT_COLOR, DEFAULT_SUBTITLE_FONT_COLOR,
};

fn normalize_badge_font_size(size: u32) -> u32 {
    size.clamp(1, 160)
}

fn normalize_subtitle_font_size(size: u32) -> u32 {
    size.clamp(10, 80)
}

fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn normalize_color(color: &str, fallback: &str) -> String {
    let trimmed = color.trim();
    if is_hex_color(trimmed) {
        trimmed.to_uppercase()
    } else {
        fallback.to_string()
    }
}

/// Empty text, or text equal to the instrument id, is stored as "follow the instrument".
fn normalize_subtitle_text(text: &str, instrument: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == instrument {
        String::new()
    } else {
        trimmed.to_string()
    }
}

pub fn normalize_style(style: BadgeStyle, instrument: &str) -> BadgeStyle {
    BadgeStyle {
        badge_font_size: normalize_badge_font_size(style.badge_font_size),
        badge_font_color: normalize_color(&style.badge_font_color, DEFAULT_BADGE_FONT_COLOR),
        subtitle_font_size: normalize_subtitle_font_size(style.subtitle_font_size),
        subtitle_font_color: normalize_color(
            &style.subtitle_font_color,
            DEFAULT_SUBTITLE_FONT_COLOR,
        ),
        subtitle_text: normalize_subtitle_text(&style.subtitle_text, instrument),
    }
}

/// Load-time cleanup; the instrument is unknown to the file so only trimming applies to text.
pub fn normalize_loaded(config: &mut LayoutConfig) {
    let style = normalize_style(config.style(), "");
    config.apply_style(style);
}
