//! Persisted storage keys. Each key has exactly one writer.

/// Cookie string captured from the page (session continuity).
pub const COOKIES: &str = "focusshell:persistentCookies";

/// Session-storage snapshot as a JSON object (session continuity).
pub const SESSION: &str = "focusshell:persistentSession";

/// Live override grant as JSON (override window).
pub const OVERRIDE_GRANT: &str = "focusshell:overrideWindow";

/// Day key of the last consumed or locked override (override window).
pub const LAST_OVERRIDE_DATE: &str = "focusshell:lastOverrideDate";

/// Last good banned-entry list as a JSON array (policy store).
pub const BANNED_CACHE: &str = "focusshell:bannedUrlsCache";
