//! URL-safe slugs derived from display names

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::domain::DomainError;

/// Normalize `input` into a slug.
///
/// Diacritics are stripped after compatibility decomposition, ASCII letters
/// are lowercased and every run of other characters becomes a single `-`.
/// Leading and trailing separators are dropped, so the result may be empty.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// True when `slug` is already in the form `slugify` produces.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Pick the slug for a row being saved for the first time.
///
/// An explicit non-blank slug wins but must be well formed; otherwise the
/// slug is derived from `display`.
pub fn assign_slug(explicit: Option<&str>, display: &str) -> Result<String, DomainError> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_valid_slug(slug) => Ok(slug.to_string()),
        Some(slug) => Err(DomainError::Validation(format!(
            "'{}' is not a valid slug",
            slug
        ))),
        None => {
            let slug = slugify(display);
            if slug.is_empty() {
                return Err(DomainError::Validation(format!(
                    "cannot derive a slug from '{}'",
                    display
                )));
            }
            Ok(slug)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Isaac Asimov"), "isaac-asimov");
        assert_eq!(slugify("Science  Fiction"), "science-fiction");
    }

    #[test]
    fn composed_book_name() {
        assert_eq!(slugify("Foo - Bar (2nd ed) Vol. 1"), "foo-bar-2nd-ed-vol-1");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(slugify("Gabriel García Márquez"), "gabriel-garcia-marquez");
        assert_eq!(slugify("Ensaio sobre a Cegueira: Edição"), "ensaio-sobre-a-cegueira-edicao");
    }

    #[test]
    fn trims_separators() {
        assert_eq!(slugify("  --Hello, World!--  "), "hello-world");
        assert_eq!(slugify("J.R.R. Tolkien"), "j-r-r-tolkien");
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn validity() {
        assert!(is_valid_slug("foo-bar-2"));
        assert!(!is_valid_slug("Foo"));
        assert!(!is_valid_slug("-foo"));
        assert!(!is_valid_slug("foo--bar"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn explicit_slug_wins() {
        assert_eq!(assign_slug(Some("custom"), "Whatever").unwrap(), "custom");
        assert_eq!(assign_slug(Some("  "), "Whatever").unwrap(), "whatever");
        assert_eq!(assign_slug(None, "Whatever").unwrap(), "whatever");
    }

    #[test]
    fn rejects_bad_or_underivable_slugs() {
        assert!(matches!(
            assign_slug(Some("Not A Slug"), "x"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            assign_slug(None, "???"),
            Err(DomainError::Validation(_))
        ));
    }
}
