//! Synthetic employee generator
//!
//! Produces plausible-looking fake employees. The generator owns its RNG so a
//! seeded instance yields a reproducible sequence.

use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::employee::{Employee, EmploymentStatus, Position};

/// Source of new records
///
/// Implemented for any `FnMut() -> Employee` so tests can script the exact
/// records a handler will insert.
pub trait RecordGenerator: Send {
    /// Produce one new record with a fresh id
    fn generate(&mut self) -> Employee;
}

impl<F> RecordGenerator for F
where
    F: FnMut() -> Employee + Send,
{
    fn generate(&mut self) -> Employee {
        self()
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amara", "Ben", "Carla", "Dmitri", "Elena", "Farah", "Gustavo", "Hana", "Ivan", "Jade",
    "Kofi", "Lena", "Marco", "Nadia", "Oscar", "Priya", "Quinn", "Rosa", "Samir", "Tara",
    "Uma", "Victor", "Wen", "Ximena", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Adeyemi", "Bauer", "Castillo", "Dubois", "Eriksen", "Fujita", "Garcia", "Haddad",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "O'Brien", "Petrov",
    "Quinteros", "Rossi", "Schmidt", "Tanaka", "Usman", "Varga", "Weber", "Yilmaz", "Zhang",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const STREETS: &[&str] = &[
    "Maple Avenue", "Oak Street", "Cedar Lane", "Harbor Road", "Willow Drive", "Sunset Boulevard",
    "Mill Street", "Lakeview Terrace", "River Road", "Highland Court",
];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Riverside", "CA"),
    ("Franklin", "TN"),
    ("Greenville", "SC"),
    ("Madison", "WI"),
    ("Salem", "OR"),
    ("Fairview", "TX"),
    ("Georgetown", "KY"),
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
    "enim", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris",
];

/// Youngest generated age, in years
pub const MIN_AGE: u64 = 18;

/// Oldest generated age, in years
pub const MAX_AGE: u64 = 65;

/// Random employee generator
pub struct FakeGenerator<R: Rng = StdRng> {
    rng: R,
}

impl FakeGenerator<StdRng> {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for FakeGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FakeGenerator<R> {
    /// Wrap an existing RNG
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate an employee relative to the given "today"
    pub fn generate_on(&mut self, today: NaiveDate) -> Employee {
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();

        let first = pick(&mut self.rng, FIRST_NAMES);
        let last = pick(&mut self.rng, LAST_NAMES);
        let name = format!("{} {}", first, last);

        Employee {
            id: id.to_string(),
            email: self.email(first, last),
            name,
            position: *Position::ALL
                .choose(&mut self.rng)
                .unwrap_or(&Position::SoftwareEngineer),
            team: self.rng.gen_range(1..=10),
            birthday: self.birthday(today),
            phone_number: self.phone_number(),
            address: self.address(),
            employment_status: *EmploymentStatus::ALL
                .choose(&mut self.rng)
                .unwrap_or(&EmploymentStatus::FullTime),
            notes: self.sentence(),
        }
    }

    fn birthday(&mut self, today: NaiveDate) -> NaiveDate {
        // Stay strictly inside [MIN_AGE, MAX_AGE] regardless of leap days.
        let min_days = MIN_AGE * 366;
        let max_days = MAX_AGE * 365;
        let days = self.rng.gen_range(min_days..=max_days);
        today.checked_sub_days(Days::new(days)).unwrap_or(today)
    }

    fn email(&mut self, first: &str, last: &str) -> String {
        let local: String = format!("{}.{}", first, last)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect::<String>()
            .to_ascii_lowercase();
        let suffix: u16 = self.rng.gen_range(1..100);
        let domain = pick(&mut self.rng, EMAIL_DOMAINS);
        format!("{}{}@{}", local, suffix, domain)
    }

    fn phone_number(&mut self) -> String {
        format!(
            "({:03}) {:03}-{:04}",
            self.rng.gen_range(200..1000),
            self.rng.gen_range(200..1000),
            self.rng.gen_range(0..10_000)
        )
    }

    fn address(&mut self) -> String {
        let number: u32 = self.rng.gen_range(1..10_000);
        let street = pick(&mut self.rng, STREETS);
        let (city, state) = *CITIES.choose(&mut self.rng).unwrap_or(&CITIES[0]);
        let zip: u32 = self.rng.gen_range(10_000..100_000);
        format!("{} {}, {}, {} {}", number, street, city, state, zip)
    }

    fn sentence(&mut self) -> String {
        let len = self.rng.gen_range(5..=10);
        let mut words: Vec<&str> = (0..len).map(|_| pick(&mut self.rng, LOREM)).collect();

        let mut sentence = String::new();
        if let Some(first) = words.first_mut() {
            let mut chars = first.chars();
            if let Some(c) = chars.next() {
                sentence.push(c.to_ascii_uppercase());
                sentence.push_str(chars.as_str());
            }
        }
        for word in words.iter().skip(1) {
            sentence.push(' ');
            sentence.push_str(word);
        }
        sentence.push('.');
        sentence
    }
}

impl<R: Rng + Send> RecordGenerator for FakeGenerator<R> {
    fn generate(&mut self) -> Employee {
        self.generate_on(Utc::now().date_naive())
    }
}

fn pick<R: Rng>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}
