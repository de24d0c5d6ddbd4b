use std::time::{SystemTime, UNIX_EPOCH};

/// Generate an opaque id like `game_3f9a01bc` -- prefix plus 8 random
/// lowercase hex characters.
pub fn generate_id(prefix: &str) -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    const CHARS: &[u8] = b"0123456789abcdef";
    let suffix: String = (0..8)
        .map(|_| {
            let idx = rng.random_range(0..CHARS.len());
            CHARS[idx] as char
        })
        .collect();
    format!("{}_{}", prefix, suffix)
}

/// Current UTC time as milliseconds since the unix epoch.
pub fn utc_now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
