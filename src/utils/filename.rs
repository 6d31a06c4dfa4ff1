use unicode_normalization::UnicodeNormalization;

/// Make an uploaded filename safe to store on disk.
///
/// Accents are folded to ASCII, path separators become spaces, whitespace runs
/// become a single `_`, anything outside `[A-Za-z0-9._-]` is dropped and
/// leading/trailing dots and underscores are stripped. May return an empty
/// string, which callers must reject.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();

    let spaced = ascii.replace(['/', '\\'], " ");

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
