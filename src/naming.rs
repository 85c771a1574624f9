/// Turns an arbitrary label into an identifier-like name: only ASCII
/// alphanumerics and `_` survive, and an `a` is prepended when the result
/// would otherwise start with a digit or underscore.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    match cleaned.chars().next() {
        Some(c) if !c.is_ascii_alphabetic() => format!("a{}", cleaned),
        _ => cleaned,
    }
}
