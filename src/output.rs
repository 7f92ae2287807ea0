use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `CALLMAP_QUIET=1` (or `true`) silences human-oriented output
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("CALLMAP_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
