// Template store: plain-text contract skeletons persisted as `<dir>/<slug>.txt`.
// All disk access goes through `TemplateStore`; handlers never touch the filesystem.

pub mod handlers;
pub mod store;

pub use store::{TemplateSource, TemplateStore};

/// Name used when classification yields nothing usable.
pub const DEFAULT_TEMPLATE: &str = "default";

const MAX_SLUG_LEN: usize = 64;

/// Normalizes a template name to a filesystem-safe slug.
///
/// Lowercase ASCII alphanumerics, runs of anything else collapsed to a single `_`,
/// trimmed of leading/trailing `_`, capped at 64 bytes. Empty input maps to `default`.
pub fn template_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        DEFAULT_TEMPLATE.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_collapses_separators() {
        assert_eq!(template_slug("Non-Disclosure  Agreement"), "non_disclosure_agreement");
        assert_eq!(template_slug("  --Service/Supply-- "), "service_supply");
    }

    #[test]
    fn test_slug_blocks_path_traversal() {
        assert_eq!(template_slug("../../etc/passwd"), "etc_passwd");
        assert_eq!(template_slug("..\\secrets"), "secrets");
    }

    #[test]
    fn test_slug_empty_falls_back_to_default() {
        assert_eq!(template_slug(""), "default");
        assert_eq!(template_slug("???"), "default");
    }

    #[test]
    fn test_slug_is_capped() {
        let long = "a".repeat(200);
        assert_eq!(template_slug(&long).len(), 64);
    }

    #[test]
    fn test_slug_drops_non_ascii() {
        assert_eq!(template_slug("Contrat de Société"), "contrat_de_soci_t");
    }
}
