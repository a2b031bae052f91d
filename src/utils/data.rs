use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_EMAIL_DOMAIN: &str = "test.com";

const FIRST_NAMES: [&str; 10] = [
    "John", "Jane", "Mike", "Sarah", "David", "Emily", "Chris", "Amanda", "Robert", "Lisa",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];
const STREETS: [&str; 8] = [
    "Main St", "Oak Ave", "Elm St", "Park Rd", "Cedar Ln", "Maple Dr", "Pine St", "Lake Blvd",
];
const CITIES: [&str; 8] = [
    "Springfield", "Franklin", "Clinton", "Madison", "Georgetown", "Salem", "Bristol", "Fairview",
];
const STATES: [&str; 10] = ["CA", "TX", "NY", "FL", "IL", "PA", "OH", "GA", "NC", "MI"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullName {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Checkout form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

/// Random test inputs. Not for anything security related.
pub struct DataGenerator {
    rng: StdRng,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DataGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `length` characters drawn from `charset` (alphanumeric when `None`).
    pub fn random_string(&mut self, length: usize, charset: Option<&str>) -> String {
        let chars: Vec<char> = charset.unwrap_or(ALPHANUMERIC).chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        (0..length)
            .map(|_| chars[self.rng.gen_range(0..chars.len())])
            .collect()
    }

    /// Uniform in `[min, max]`. The bounds are swapped when reversed.
    pub fn random_number(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    pub fn random_email(&mut self, domain: Option<&str>) -> String {
        let user = self.random_string(8, None).to_lowercase();
        format!(
            "{}{}@{}",
            user,
            chrono::Utc::now().timestamp_millis(),
            domain.unwrap_or(DEFAULT_EMAIL_DOMAIN)
        )
    }

    pub fn random_first_name(&mut self) -> &'static str {
        self.pick(&FIRST_NAMES)
    }

    pub fn random_last_name(&mut self) -> &'static str {
        self.pick(&LAST_NAMES)
    }

    pub fn random_full_name(&mut self) -> FullName {
        let first_name = self.random_first_name().to_string();
        let last_name = self.random_last_name().to_string();
        let full_name = format!("{} {}", first_name, last_name);
        FullName {
            first_name,
            last_name,
            full_name,
        }
    }

    /// Five-digit US ZIP code.
    pub fn random_postal_code(&mut self) -> String {
        self.random_number(10_000, 99_999).to_string()
    }

    /// `AAA-PPP-LLLL`.
    pub fn random_phone_number(&mut self) -> String {
        let area = self.random_number(200, 999);
        let prefix = self.random_number(200, 999);
        let line = self.random_number(1_000, 9_999);
        format!("{}-{}-{}", area, prefix, line)
    }

    pub fn random_address(&mut self) -> Address {
        let number = self.random_number(100, 9_999);
        let street = self.pick(&STREETS);
        Address {
            street: format!("{} {}", number, street),
            city: self.pick(&CITIES).to_string(),
            state: self.pick(&STATES).to_string(),
            zip: self.random_postal_code(),
        }
    }

    /// `prefix_<ms>_<rand6>`, or `<ms>_<rand6>` when `prefix` is empty.
    pub fn unique_id(&mut self, prefix: &str) -> String {
        let ts = chrono::Utc::now().timestamp_millis();
        let suffix = self.random_string(6, None);
        if prefix.is_empty() {
            format!("{}_{}", ts, suffix)
        } else {
            format!("{}_{}_{}", prefix, ts, suffix)
        }
    }

    pub fn generate_customer_info(&mut self) -> CustomerInfo {
        CustomerInfo {
            first_name: self.random_first_name().to_string(),
            last_name: self.random_last_name().to_string(),
            postal_code: self.random_postal_code(),
        }
    }

    /// `None` for an empty slice.
    pub fn pick_random<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Up to `count` distinct elements in random order.
    pub fn pick_multiple_random<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        items
            .choose_multiple(&mut self.rng, count.min(items.len()))
            .cloned()
            .collect()
    }

    fn pick(&mut self, list: &[&'static str]) -> &'static str {
        list.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

/// Current UTC time as ISO-8601 with `:` and `.` replaced by `-`, safe for file names.
pub fn timestamp() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_string_uses_charset() {
        let mut data = DataGenerator::seeded(7);
        assert_eq!(data.random_string(10, None).len(), 10);
        let digits = data.random_string(32, Some("0123456789"));
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(data.random_string(5, Some("")), "");
    }

    #[test]
    fn test_random_number_is_inclusive() {
        let mut data = DataGenerator::seeded(1);
        let seen: HashSet<i64> = (0..500).map(|_| data.random_number(1, 3)).collect();
        assert_eq!(seen, HashSet::from([1, 2, 3]));
        assert_eq!(data.random_number(5, 5), 5);
    }

    #[test]
    fn test_formats() {
        let mut data = DataGenerator::seeded(42);

        let email = data.random_email(None);
        assert!(email.ends_with("@test.com"));
        assert!(email[..8].chars().all(|c| !c.is_ascii_uppercase()));

        let id = data.unique_id("order");
        assert!(id.starts_with("order_"));
        assert_eq!(id.split('_').count(), 3);
        assert_eq!(data.unique_id("").split('_').count(), 2);
    }

    #[test]
    fn test_postal_codes_are_five_digits() {
        for seed in 0..50 {
            let mut data = DataGenerator::seeded(seed);
            for _ in 0..20 {
                let code = data.random_postal_code();
                assert_eq!(code.len(), 5, "{}", code);
                assert!(code.chars().all(|c| c.is_ascii_digit()), "{}", code);
                let zip: u32 = code.parse().unwrap();
                assert!((10_000..=99_999).contains(&zip));
            }
        }
    }

    #[test]
    fn test_phone_numbers_have_valid_parts() {
        let mut data = DataGenerator::seeded(7);
        for _ in 0..500 {
            let phone = data.random_phone_number();
            let parts: Vec<u32> = phone.split('-').map(|p| p.parse().unwrap()).collect();
            assert_eq!(parts.len(), 3, "{}", phone);
            assert!((200..=999).contains(&parts[0]), "{}", phone);
            assert!((200..=999).contains(&parts[1]), "{}", phone);
            assert!((1_000..=9_999).contains(&parts[2]), "{}", phone);
        }
    }

    #[test]
    fn test_names_and_addresses_come_from_lists() {
        let mut data = DataGenerator::seeded(3);
        let name = data.random_full_name();
        assert!(FIRST_NAMES.contains(&name.first_name.as_str()));
        assert_eq!(name.full_name, format!("{} {}", name.first_name, name.last_name));

        let address = data.random_address();
        assert!(STATES.contains(&address.state.as_str()));
        assert!(STREETS.iter().any(|s| address.street.ends_with(s)));
    }

    #[test]
    fn test_pick_multiple_has_no_duplicates() {
        let mut data = DataGenerator::seeded(9);
        let items = [1, 2, 3, 4, 5];
        let picked = data.pick_multiple_random(&items, 3);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 3);
        assert_eq!(data.pick_multiple_random(&items, 10).len(), 5);
        assert!(data.pick_random::<u8>(&[]).is_none());
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let a = DataGenerator::seeded(11).generate_customer_info();
        let b = DataGenerator::seeded(11).generate_customer_info();
        assert_eq!(a, b);
    }

    #[test]
    fn test_timestamp_is_filename_safe() {
        let ts = timestamp();
        assert!(!ts.contains(':'));
        assert!(!ts.contains('.'));
        assert!(ts.ends_with('Z'));
    }
}
