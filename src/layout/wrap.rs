use crate::fonts::Measure;

/// Width of `text`. When the font rejects the string, each character is
/// measured on its own and the ones it cannot encode count as zero, so one
/// stray glyph neither aborts the document nor hides the rest of the line.
pub fn measure_or_zero(font: &dyn Measure, text: &str, font_size: f32) -> f32 {
    match font.text_width(text, font_size) {
        Ok(w) => w,
        Err(e) => {
            log::warn!(
                "measuring {text:?} at {font_size}pt failed ({e}); \
                 unmeasurable characters count as zero width"
            );
            let mut buf = [0u8; 4];
            text.chars()
                .map(|ch| font.text_width(ch.encode_utf8(&mut buf), font_size).unwrap_or(0.0))
                .sum()
        }
    }
}

/// Greedy word wrap on single spaces.
///
/// A word that is wider than `max_width` on its own still gets its own line;
/// words are never split. Joining the result with `" "` gives back `text`.
pub fn wrap_words(text: &str, max_width: f32, font: &dyn Measure, font_size: f32) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for word in text.split(' ') {
        let candidate = match current {
            Some(ref line) => format!("{line} {word}"),
            None => word.to_string(),
        };
        if current.is_some() && measure_or_zero(font, &candidate, font_size) > max_width {
            lines.extend(current.replace(word.to_string()));
        } else {
            current = Some(candidate);
        }
    }

    lines.extend(current);
    lines
}

/// Greedy character wrap for text without word boundaries (CJK addresses).
/// Joining the result with `""` gives back `text`.
pub fn wrap_chars(text: &str, max_width: f32, font: &dyn Measure, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure_or_zero(font, &candidate, font_size) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
