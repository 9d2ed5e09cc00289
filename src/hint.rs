//! Realistic strings: JSON Schema `format`s and `faker` hints.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use rand::Rng;
use std::net::{Ipv4Addr, Ipv6Addr};

// Offsets are kept within 14 hours of UTC. Java's ZoneOffset allows 18 and
// .NET's DateTimeOffset allows 14, so this is the most selective of the two.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// A JSON Schema `format` the generator knows how to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Uuid,
}

impl Format {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "date-time" => Format::DateTime,
            "date" => Format::Date,
            "time" => Format::Time,
            "email" => Format::Email,
            "hostname" => Format::Hostname,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "uri" => Format::Uri,
            "uuid" => Format::Uuid,
            _ => return None,
        })
    }

    pub fn fake<R: Rng>(self, rng: &mut R) -> String {
        match self {
            Format::DateTime => fake_datetime(rng).to_rfc3339(),
            Format::Date => fake_datetime(rng).format("%Y-%m-%d").to_string(),
            Format::Time => fake_datetime(rng).format("%H:%M:%S%:z").to_string(),
            Format::Email => format!("{}@{}", fake_mailbox(rng), fake_hostname(rng)),
            Format::Hostname => fake_hostname(rng),
            // 0.0.0.0/8 is not routable, and a leading zero is rejected by
            // some validators.
            Format::Ipv4 => Ipv4Addr::new(rng.gen_range(1..=255), rng.gen(), rng.gen(), rng.gen())
                .to_string(),
            Format::Ipv6 => Ipv6Addr::from(rng.gen::<u128>()).to_string(),
            Format::Uri => format!(
                "https://{}/{}",
                fake_hostname(rng),
                rng.gen::<faker_rand::lorem::Word>()
            ),
            Format::Uuid => uuid::Builder::from_random_bytes(rng.gen())
                .into_uuid()
                .to_string(),
        }
    }

    /// Whether `s` is a well-formed value of this format.
    pub fn accepts(self, s: &str) -> bool {
        match self {
            Format::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Date => s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            Format::Time => DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", s)).is_ok(),
            Format::Email => match s.split_once('@') {
                Some((mailbox, host)) => !mailbox.is_empty() && is_hostname(host),
                None => false,
            },
            Format::Hostname => is_hostname(s),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Uri => match s.split_once(':') {
                Some((scheme, _)) => {
                    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                        && scheme
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
                }
                None => false,
            },
            Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        }
    }
}

fn is_hostname(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

// Faker domains are built from names, which may carry apostrophes or spaces;
// only the alphanumeric part of each label is kept.
fn fake_hostname<R: Rng>(rng: &mut R) -> String {
    let domain = rng.gen::<faker_rand::en_us::internet::Domain>().to_string();
    let labels: Vec<String> = domain
        .to_ascii_lowercase()
        .split('.')
        .map(|label| label.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|label| !label.is_empty())
        .collect();

    if labels.len() < 2 {
        return "example.com".to_owned();
    }

    labels.join(".")
}

fn fake_mailbox<R: Rng>(rng: &mut R) -> String {
    let mailbox: String = rng
        .gen::<faker_rand::en_us::internet::Username>()
        .to_string()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if mailbox.is_empty() {
        "user".to_owned()
    } else {
        mailbox
    }
}

// Any i32 count of seconds since the epoch is a valid timestamp, and always
// has a four-digit year.
fn fake_datetime<R: Rng>(rng: &mut R) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(
        rng.gen_range(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES) * 60,
    )
    .unwrap_or_else(|| Utc.fix());

    DateTime::<Utc>::from_timestamp(i64::from(rng.gen::<i32>()), 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

macro_rules! faker_hints {
    ($($name:literal => $faker:ty,)*) => {
        /// Every value the `faker` keyword accepts.
        pub const HINTS: &[&str] = &[$($name,)*];

        /// Generates a string with the faker registered under `hint`, or `None`
        /// if no such faker exists.
        pub fn fake_hint<R: Rng>(hint: &str, rng: &mut R) -> Option<String> {
            match hint {
                $($name => Some(rng.gen::<$faker>().to_string()),)*
                _ => None,
            }
        }
    };
}

faker_hints! {
    "en_us/addresses/address" => faker_rand::en_us::addresses::Address,
    "en_us/addresses/city_name" => faker_rand::en_us::addresses::CityName,
    "en_us/addresses/division" => faker_rand::en_us::addresses::Division,
    "en_us/addresses/division_abbreviation" => faker_rand::en_us::addresses::DivisionAbbreviation,
    "en_us/addresses/postal_code" => faker_rand::en_us::addresses::PostalCode,
    "en_us/addresses/secondary_address" => faker_rand::en_us::addresses::SecondaryAddress,
    "en_us/addresses/street_address" => faker_rand::en_us::addresses::StreetAddress,
    "en_us/addresses/street_name" => faker_rand::en_us::addresses::StreetName,
    "en_us/company/company_name" => faker_rand::en_us::company::CompanyName,
    "en_us/company/slogan" => faker_rand::en_us::company::Slogan,
    "en_us/internet/domain" => faker_rand::en_us::internet::Domain,
    "en_us/internet/email" => faker_rand::en_us::internet::Email,
    "en_us/internet/username" => faker_rand::en_us::internet::Username,
    "en_us/names/first_name" => faker_rand::en_us::names::FirstName,
    "en_us/names/full_name" => faker_rand::en_us::names::FullName,
    "en_us/names/last_name" => faker_rand::en_us::names::LastName,
    "en_us/names/name_prefix" => faker_rand::en_us::names::NamePrefix,
    "en_us/names/name_suffix" => faker_rand::en_us::names::NameSuffix,
    "en_us/phones/phone_number" => faker_rand::en_us::phones::PhoneNumber,
    "fr_fr/addresses/address" => faker_rand::fr_fr::addresses::Address,
    "fr_fr/addresses/city_name" => faker_rand::fr_fr::addresses::CityName,
    "fr_fr/addresses/division" => faker_rand::fr_fr::addresses::Division,
    "fr_fr/addresses/postal_code" => faker_rand::fr_fr::addresses::PostalCode,
    "fr_fr/addresses/secondary_address" => faker_rand::fr_fr::addresses::SecondaryAddress,
    "fr_fr/addresses/street_address" => faker_rand::fr_fr::addresses::StreetAddress,
    "fr_fr/addresses/street_name" => faker_rand::fr_fr::addresses::StreetName,
    "fr_fr/company/company_name" => faker_rand::fr_fr::company::CompanyName,
    "fr_fr/internet/domain" => faker_rand::fr_fr::internet::Domain,
    "fr_fr/internet/email" => faker_rand::fr_fr::internet::Email,
    "fr_fr/internet/username" => faker_rand::fr_fr::internet::Username,
    "fr_fr/names/first_name" => faker_rand::fr_fr::names::FirstName,
    "fr_fr/names/full_name" => faker_rand::fr_fr::names::FullName,
    "fr_fr/names/last_name" => faker_rand::fr_fr::names::LastName,
    "fr_fr/names/name_prefix" => faker_rand::fr_fr::names::NamePrefix,
    "fr_fr/phones/phone_number" => faker_rand::fr_fr::phones::PhoneNumber,
    "lorem/word" => faker_rand::lorem::Word,
    "lorem/sentence" => faker_rand::lorem::Sentence,
    "lorem/paragraph" => faker_rand::lorem::Paragraph,
    "lorem/paragraphs" => faker_rand::lorem::Paragraphs,
}

/// Looks `name` up among [`HINTS`], returning the registered spelling.
pub fn find_hint(name: &str) -> Option<&'static str> {
    HINTS.iter().copied().find(|hint| *hint == name)
}
