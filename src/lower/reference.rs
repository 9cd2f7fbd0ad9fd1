//! Scan `{{...}}` template references out of step text.

/// What a single `{{...}}` token points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef<'a> {
    /// `steps.<step_id>.output...`
    StepOutput { step_id: &'a str, raw: &'a str },
    /// Anything without a `steps.` segment: an input-schema variable.
    Input { raw: &'a str },
    /// Has a `steps.` segment but not the `steps.<id>.output` shape.
    Malformed { raw: &'a str },
}

/// Trimmed inner text of every `{{...}}` token in `template`.
///
/// A token runs from `{{` to the first `}`, which must be followed by another
/// `}`; the inner text is non-empty. An opening that does not close is skipped.
pub fn extract_refs(template: &str) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut cursor = 0;

    while let Some(found) = template[cursor..].find("{{") {
        let open = cursor + found;
        let inner_start = open + 2;
        let rest = &template[inner_start..];

        match rest.find('}') {
            Some(end) if end > 0 && rest[end..].starts_with("}}") => {
                refs.push(rest[..end].trim());
                cursor = inner_start + end + 2;
            }
            // Retry from the next character, e.g. `{{{a}}` matches `{a`.
            _ => cursor = open + 1,
        }
    }

    refs
}

/// Classify a trimmed reference name.
pub fn classify(raw: &str) -> TemplateRef<'_> {
    if !raw.contains("steps.") {
        return TemplateRef::Input { raw };
    }

    for (pos, _) in raw.match_indices("steps.") {
        let after = &raw[pos + "steps.".len()..];
        if let Some((step_id, tail)) = after.split_once('.') {
            if !step_id.is_empty() && tail.starts_with("output") {
                return TemplateRef::StepOutput { step_id, raw };
            }
        }
    }

    TemplateRef::Malformed { raw }
}

/// All references in `template`, classified.
pub fn scan(template: &str) -> Vec<TemplateRef<'_>> {
    extract_refs(template).into_iter().map(classify).collect()
}
