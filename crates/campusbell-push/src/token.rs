//! Endpoint token syntax.

const TOKEN_PREFIXES: [&str; 2] = ["ExponentPushToken[", "ExpoPushToken["];

/// Whether `token` is a syntactically valid provider token.
///
/// Accepts `ExponentPushToken[...]` and `ExpoPushToken[...]` with a
/// non-empty inner value.
pub fn is_valid_push_token(token: &str) -> bool {
    TOKEN_PREFIXES.iter().any(|prefix| {
        token
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|inner| !inner.is_empty() && !inner.contains(['[', ']']))
    })
}
