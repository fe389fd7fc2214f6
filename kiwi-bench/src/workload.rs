//! Fixed workloads for load and fuzz runs.
//!
//! Commands are picked round-robin from a per-client offset so runs are
//! repeatable without a random source.

/// Realistic configuration entries; every value is accepted by the client.
pub const STORE_ENTRIES: &[(&str, &str)] = &[
    ("dbConn", "data source=localhost;Initial Catalog=kiwi;User ID=sa;Password"),
    ("logLevel", "Verbose"),
    ("theme", "dark"),
    ("maxConnections", "100"),
    ("timeout", "30"),
    ("cacheSize", "256MB"),
    ("retry", "3"),
    ("caching", "off"),
    ("loginapi", "https://api.azon.com/v1/login"),
    ("apiKey", "12345-abcde-67890-fghij"),
    ("lang", "tr-TR"),
    ("timezone", "Europe/Istanbul"),
    ("dateFormat", "dd/MM/yyyy"),
    ("currency", "TRY"),
    ("smtpSrv", "smtp.azon.com"),
    ("smtpPrt", "587"),
    ("mntcMode", "false"),
    ("backup", "daily"),
    ("compr", "enabled"),
    ("maxUploadSize", "50MB"),
    ("sessionTimeout", "15m"),
];

/// Lines the store must reject. Sent raw, bypassing client validation.
pub const FUZZ_LINES: &[&str] = &[
    "INSERT username john password secret",
    "UPDATE userSettings theme light",
    "SELECT * FROM users WHERE id = 1",
    "RETREIVE username",
    "DELETE username",
    "CREATE TABLE newTable (id INT, name VARCHAR(100))",
    "CHECK health",
    "",
    "\u{0}\u{1}\u{2}",
];

/// Index of the command issued by `client` at step `step`.
pub fn pick(len: usize, client: usize, step: usize) -> usize {
    client.wrapping_mul(7).wrapping_add(step) % len
}

pub fn store_entry(client: usize, step: usize) -> (&'static str, &'static str) {
    STORE_ENTRIES[pick(STORE_ENTRIES.len(), client, step)]
}

pub fn fuzz_line(client: usize, step: usize) -> &'static str {
    FUZZ_LINES[pick(FUZZ_LINES.len(), client, step)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_common::Command;

    #[test]
    fn store_entries_pass_client_validation() {
        for (key, value) in STORE_ENTRIES {
            assert!(Command::set(key, value).is_ok(), "{} = {:?}", key, value);
        }
    }

    #[test]
    fn pick_stays_in_range_and_spreads_clients() {
        for client in 0..16 {
            for step in 0..64 {
                assert!(pick(5, client, step) < 5);
            }
        }
        assert_ne!(pick(STORE_ENTRIES.len(), 0, 0), pick(STORE_ENTRIES.len(), 1, 0));
    }
}
