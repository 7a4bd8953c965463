/// Application name
pub const APP_NAME: &str = "Daybook";

/// Separator placed between two serialized entries of a day blob
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Body stored for an entry that only carries image attachments
pub const IMAGE_ONLY_BODY: &str = "(image entry)";

/// Canonical calendar date format (local time, no UTC conversion)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Years always offered by the year selector, even without posts
pub const DEFAULT_BASE_YEARS: [i32; 3] = [2024, 2025, 2026];

/// Maximum image upload size in bytes (20 MiB)
pub const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;

/// Default blob server HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8080;
