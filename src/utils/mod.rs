pub mod fingerprint;
pub mod slug;
pub mod thumbnail;
pub mod validate;

/// Current time as a fixed-width RFC 3339 UTC timestamp, so string order
/// matches chronological order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
