use url::Url;

/// How the hosting page was loaded. Every field is optional; whatever is
/// present contributes candidate URLs, whatever is absent or malformed is
/// skipped without error.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Full URL of the page currently hosting the search UI.
    pub page_url: Option<String>,
    /// URL of the script that owns this subsystem (covers pages nested at
    /// different depths than the script).
    pub script_url: Option<String>,
    /// Base URL of the site root.
    pub site_root: Option<String>,
}

impl PageContext {
    pub fn rooted(site_root: impl Into<String>) -> Self {
        Self {
            site_root: Some(site_root.into()),
            ..Self::default()
        }
    }
}

/// Produce the ordered, deduplicated list of URLs that might resolve a
/// project-relative index path, most page-relative first and
/// root-relative last. Pure string/URL construction; never fails.
pub fn resolve_candidates(ctx: &PageContext, path: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    push_unique(&mut out, path.to_string());

    if let Some(page) = &ctx.page_url
        && let Ok(base) = Url::parse(page)
    {
        // Path rooted at the page's directory, kept origin-less so it
        // resolves against whatever host actually served the page.
        let dir = base.path().rsplit_once('/').map_or("", |(d, _)| d);
        push_unique(&mut out, format!("{dir}/{path}"));

        if let Ok(joined) = base.join(path) {
            push_unique(&mut out, joined.to_string());
        }
    }

    if let Some(script) = &ctx.script_url
        && let Ok(base) = Url::parse(script)
        && let Ok(joined) = base.join(path)
    {
        push_unique(&mut out, joined.to_string());
    }

    if let Some(root) = &ctx.site_root
        && let Ok(base) = Url::parse(root)
        && let Ok(joined) = base.join(path)
    {
        push_unique(&mut out, joined.to_string());
    }

    out
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}
