// 🪪 Name Normalizer - One canonical display form per person name
// The display form doubles as the identity-matching key (lowercased),
// so every source must normalize through here before lookup.

// ============================================================================
// DISPLAY FORM
// ============================================================================

/// Canonical display form: every word lower-cased then capitalized, with
/// hyphen-joined sub-words each independently capitalized
/// ("van-der" -> "Van-Der").
pub fn format_display_name(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    raw.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// ROSTER NAMES - surname-order heuristic
// ============================================================================

/// Normalize an addendum roster name against the historical convention.
///
/// The alternate display name (broadcast form, already in natural reading
/// order) is preferred as ground truth when present. Otherwise the casing
/// heuristic applies: a fully upper-case leading token followed by
/// not-fully-upper-case tokens is read as surname-first and flipped.
///
/// Names with no casing signal pass through unchanged; a legitimately
/// surname-first natural name cannot be distinguished here.
pub fn normalize_roster_name(raw: &str, alt_display: &str) -> String {
    let alt_display = alt_display.trim();
    if !alt_display.is_empty() {
        return format_display_name(alt_display);
    }

    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let tokens: Vec<&str> = raw.split_whitespace().collect();

    // Typical roster pattern: "ALEKSANYAN Artur"
    if tokens.len() == 2 && is_upper(tokens[0]) && !is_upper(tokens[1]) {
        return format_display_name(&format!("{} {}", tokens[1], tokens[0]));
    }

    // "LAST First Middle ...": move the leading surname token to the end
    if tokens.len() >= 3 && is_upper(tokens[0]) && !tokens[1..].iter().all(|t| is_upper(t)) {
        let mut reordered: Vec<&str> = tokens[1..].to_vec();
        reordered.push(tokens[0]);
        return format_display_name(&reordered.join(" "));
    }

    format_display_name(raw)
}

/// Fully upper-case token: all cased characters upper, at least one cased.
fn is_upper(token: &str) -> bool {
    let mut has_cased = false;
    for c in token.chars() {
        if c.is_alphabetic() {
            has_cased = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_cased
}

// ============================================================================
// TESTS
// ============================================================================
