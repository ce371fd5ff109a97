// src/crawl/rewrite.rs
// =============================================================================
// Domain rewriting applied to every URL right before it is crawled.
//
// Typical use: the sitemap was generated on production but we want to warm
// a staging host, so "www.example.com" becomes "staging.example.com".
//
// The replacement is a plain substring swap (no regex, no URL parsing) and
// only the first occurrence is replaced.
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteRule {
    pub old_domain: Option<String>,
    pub new_domain: Option<String>,
}

impl RewriteRule {
    pub fn new(old_domain: Option<String>, new_domain: Option<String>) -> Self {
        Self {
            old_domain,
            new_domain,
        }
    }

    // Applies the rule to one URL
    //
    // Examples (old = "example.com", new = "staging.test"):
    //   "https://example.com/a" -> "https://staging.test/a"
    //   "https://other.org/a"   -> "https://other.org/a"
    //
    // With no old domain (or an empty one) the URL comes back unchanged.
    // An old domain without a new one removes the old domain.
    pub fn rewrite(&self, url: &str) -> String {
        match self.old_domain.as_deref() {
            Some(old) if !old.is_empty() => {
                let new = self.new_domain.as_deref().unwrap_or("");
                url.replacen(old, new, 1)
            }
            _ => url.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.old_domain.as_deref(), Some(old) if !old.is_empty())
    }
}
