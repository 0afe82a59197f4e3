/// Outcome and cursor types for the traversal state machine
use std::fmt;

/// Position of the listing page loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingCursor {
    /// Next listing page to fetch (1-based)
    Page(u32),

    /// Discovery has finished; no further listing pages will be fetched
    Done,
}

impl ListingCursor {
    /// Cursor at the first listing page
    pub fn start() -> Self {
        Self::Page(1)
    }

    /// Returns the current page number, if discovery is still running
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Page(n) => Some(*n),
            Self::Done => None,
        }
    }

    /// Moves to the next page
    pub fn advance(&mut self) {
        if let Self::Page(n) = self {
            *n += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Why listing discovery stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryOutcome {
    // ===== Natural end =====
    /// A listing fetch failed or a page yielded no links
    Exhausted {
        /// The page that ended discovery
        page: u32,
    },

    /// The site is not paginated; the start URL was read once and had links
    SinglePage,

    // ===== Limits =====
    /// The product cap was reached; the set was truncated to the cap
    Capped,

    /// The configured maximum number of listing pages was read
    PageLimit,

    // ===== Interrupted =====
    /// A stop was requested before discovery finished
    Cancelled,
}

impl DiscoveryOutcome {
    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "exhausted",
            Self::SinglePage => "single_page",
            Self::Capped => "capped",
            Self::PageLimit => "page_limit",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DiscoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { page } => write!(f, "exhausted at page {}", page),
            other => f.write_str(other.label()),
        }
    }
}

/// Stage at which a product URL failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The page could not be fetched after retries
    Fetch,

    /// The page was fetched but yielded no record
    Extraction,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
