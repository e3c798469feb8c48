//! C# namespace sanitization
//!
//! Turns an arbitrary display string (usually the Unity product name) into a
//! dotted identifier the C# compiler accepts as a namespace. The mapping is
//! total and idempotent: `sanitize(&sanitize(s)) == sanitize(s)` for every `s`,
//! which is what makes "equals its own sanitized form" usable as the config
//! validity check.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Reserved keywords of C#. A segment equal to one of these is written as `@keyword`.
pub const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const ESCAPE: char = '@';
const REPLACEMENT: char = '_';

/// Suffix appended to the sanitized product name for the default namespace prefix
pub const DEFAULT_NAMESPACE_SUFFIX: &str = "ContractServices";

pub fn is_keyword(segment: &str) -> bool {
    CSHARP_KEYWORDS.contains(&segment)
}

/// Letter categories allowed at the start of an identifier.
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::LetterNumber
    )
}

/// Characters allowed anywhere inside an identifier.
fn is_identifier_part(c: char) -> bool {
    is_letter(c)
        || matches!(
            get_general_category(c),
            GeneralCategory::DecimalNumber
                | GeneralCategory::NonspacingMark
                | GeneralCategory::SpacingMark
                | GeneralCategory::ConnectorPunctuation
        )
}

/// Strip an existing `@keyword` escape, otherwise replace every disallowed character.
fn bare_segment(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix(ESCAPE)
        && is_keyword(rest)
    {
        return rest.to_string();
    }

    raw.chars()
        .map(|c| if is_identifier_part(c) { c } else { REPLACEMENT })
        .collect()
}

fn finish_segment(segment: String) -> String {
    if is_keyword(&segment) {
        return format!("{ESCAPE}{segment}");
    }

    match segment.chars().next() {
        Some(first) if is_letter(first) || first == REPLACEMENT => segment,
        _ => format!("{REPLACEMENT}{segment}"),
    }
}

/// Sanitize `input` into a dotted C# namespace identifier.
///
/// Every leading or trailing dot becomes a `_`, empty segments are dropped,
/// segments that would start with a digit or a mark get a `_` prefix and
/// reserved keywords are escaped with `@`. The empty string maps to `_`.
pub fn sanitize(input: &str) -> String {
    let leading = input.chars().take_while(|&c| c == '.').count();
    let trailing = if leading == input.len() {
        0
    } else {
        input.chars().rev().take_while(|&c| c == '.').count()
    };
    let core = &input[leading..input.len() - trailing];

    let mut segments: Vec<String> = core
        .split('.')
        .filter(|raw| !raw.is_empty())
        .map(bare_segment)
        .collect();

    if segments.is_empty() {
        segments.push(String::new());
    }
    let last = segments.len() - 1;
    segments[0].insert_str(0, &REPLACEMENT.to_string().repeat(leading));
    segments[last].push_str(&REPLACEMENT.to_string().repeat(trailing));

    segments
        .into_iter()
        .map(finish_segment)
        .collect::<Vec<_>>()
        .join(".")
}

/// Whether `namespace` is already in sanitized form.
pub fn is_sanitized(namespace: &str) -> bool {
    sanitize(namespace) == namespace
}

/// Default namespace prefix for a product: `<sanitized product>.ContractServices`.
pub fn default_namespace_prefix(product_name: &str) -> String {
    format!("{}.{}", sanitize(product_name), DEFAULT_NAMESPACE_SUFFIX)
}
