pub mod quotes;
pub mod universe;

/// Yahoo blocks requests without a browser-looking agent.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
