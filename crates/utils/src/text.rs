//! Small text helpers shared by the feed reshaping and the fan report formatting.

use once_cell::sync::Lazy;
use regex::Regex;

static STYLE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"style="[^"]*""#).unwrap());
static DATA_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-[^=]+="[^"]*""#).unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static IMG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).unwrap());

const ENTITIES: [(&str, &str); 5] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
];

/// Strip markup from an HTML fragment and collapse whitespace.
///
/// Style and `data-*` attributes go first so that a `>` inside an attribute
/// value cannot end a tag early.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let text = STYLE_ATTR.replace_all(html, "");
    let text = DATA_ATTR.replace_all(&text, "");
    let mut text = TAG.replace_all(&text, "").into_owned();

    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Truncate to at most `max_chars` characters, backing up to the last space
/// at or before the limit, and append `...`.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let cutoff = chars[..=max_chars]
        .iter()
        .rposition(|c| *c == ' ')
        .filter(|idx| *idx > 0)
        .unwrap_or(max_chars);

    let mut truncated: String = chars[..cutoff].iter().collect();
    truncated.push_str("...");
    truncated
}

/// The `src` of the first `<img>` tag in an HTML fragment.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Render a number the way a JavaScript template literal would: integral
/// values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

/// Fixed-point rendering with `digits` decimals, rounding half away from zero
/// on the exact binary value like JavaScript's `toFixed`. Negative zero prints
/// as zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // Every finite f64 has at most this many fractional digits, so this
    // expansion is exact and the dropped tail decides the rounding.
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let digits = digits.min(fraction.len());
    let round_up = fraction.as_bytes().get(digits).is_some_and(|d| *d >= b'5');

    let mut kept: Vec<u8> = whole.bytes().chain(fraction[..digits].bytes()).collect();
    if round_up {
        increment_decimal(&mut kept);
    }

    let split = kept.len() - digits;
    let mut rendered = String::from_utf8_lossy(&kept[..split]).into_owned();
    if digits > 0 {
        rendered.push('.');
        rendered.push_str(&String::from_utf8_lossy(&kept[split..]));
    }
    if value < 0.0 {
        rendered.insert(0, '-');
    }
    rendered
}

const EXACT_FRACTION_DIGITS: usize = 1074;

fn increment_decimal(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}
