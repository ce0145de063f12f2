//! Templated fake text generator.
//!
//! Templates contain `{{category.method}}` placeholders, e.g.
//! `{{name.firstName}} {{name.lastName}}`. Everything outside placeholders
//! is copied verbatim. Supported placeholders:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `name.firstName`, `name.lastName`, `name.fullName` | person names (locale aware) |
//! | `internet.email`, `internet.userName` | email address, login |
//! | `address.city`, `address.streetName`, `address.zipCode` | address parts |
//! | `company.companyName` | company name |
//! | `phone.phoneNumber` | `(NNN) NNN-NNNN` |
//! | `lorem.word`, `lorem.sentence`, `lorem.paragraph` | lorem ipsum text |
//! | `random.uuid`, `random.number` | UUID token, integer in `0..=99999` |

use super::string::uuid_token;
use super::ValueGenerator;
use crate::GeneratorError;
use datafill_core::{FillValue, Row};
use faker_rand::en_us::addresses::{CityName, StreetName};
use faker_rand::en_us::company::CompanyName;
use faker_rand::en_us::internet::{Email, Username};
use faker_rand::lorem::{Paragraph, Sentence, Word};
use faker_rand::{en_us, fr_fr};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Locale {
    En,
    Fr,
}

impl Locale {
    fn parse(locale: &str) -> Self {
        match locale.to_ascii_lowercase().as_str() {
            "fr" | "fr_fr" | "fr-fr" => Self::Fr,
            "en" | "en_us" | "en-us" => Self::En,
            other => {
                tracing::warn!("Unsupported faker locale '{other}', falling back to 'en'");
                Self::En
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FakerKey {
    FirstName,
    LastName,
    FullName,
    Email,
    UserName,
    City,
    StreetName,
    ZipCode,
    CompanyName,
    PhoneNumber,
    Word,
    Sentence,
    Paragraph,
    Uuid,
    Number,
}

impl FakerKey {
    fn parse(key: &str) -> Option<Self> {
        let key = match key.trim() {
            "name.firstName" => Self::FirstName,
            "name.lastName" => Self::LastName,
            "name.fullName" | "name.findName" => Self::FullName,
            "internet.email" => Self::Email,
            "internet.userName" => Self::UserName,
            "address.city" => Self::City,
            "address.streetName" => Self::StreetName,
            "address.zipCode" => Self::ZipCode,
            "company.companyName" => Self::CompanyName,
            "phone.phoneNumber" => Self::PhoneNumber,
            "lorem.word" => Self::Word,
            "lorem.sentence" => Self::Sentence,
            "lorem.paragraph" => Self::Paragraph,
            "random.uuid" => Self::Uuid,
            "random.number" => Self::Number,
            _ => return None,
        };
        Some(key)
    }

    fn render<R: Rng>(self, rng: &mut R, locale: Locale) -> String {
        match (self, locale) {
            (Self::FirstName, Locale::En) => rng.gen::<en_us::names::FirstName>().to_string(),
            (Self::FirstName, Locale::Fr) => rng.gen::<fr_fr::names::FirstName>().to_string(),
            (Self::LastName, Locale::En) => rng.gen::<en_us::names::LastName>().to_string(),
            (Self::LastName, Locale::Fr) => rng.gen::<fr_fr::names::LastName>().to_string(),
            (Self::FullName, _) => {
                let first = Self::FirstName.render(rng, locale);
                let last = Self::LastName.render(rng, locale);
                format!("{first} {last}")
            }
            (Self::Email, _) => rng.gen::<Email>().to_string(),
            (Self::UserName, _) => rng.gen::<Username>().to_string(),
            (Self::City, _) => rng.gen::<CityName>().to_string(),
            (Self::StreetName, _) => rng.gen::<StreetName>().to_string(),
            (Self::ZipCode, _) => format!("{:05}", rng.gen_range(0..100_000)),
            (Self::CompanyName, _) => rng.gen::<CompanyName>().to_string(),
            (Self::PhoneNumber, _) => format!(
                "({}) {}-{:04}",
                rng.gen_range(200..1000),
                rng.gen_range(200..1000),
                rng.gen_range(0..10_000)
            ),
            (Self::Word, _) => rng.gen::<Word>().to_string(),
            (Self::Sentence, _) => rng.gen::<Sentence>().to_string(),
            (Self::Paragraph, _) => rng.gen::<Paragraph>().to_string(),
            (Self::Uuid, _) => uuid_token(rng),
            (Self::Number, _) => rng.gen_range(0..=99_999).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(FakerKey),
}

/// Compile a template; returns the first unsupported placeholder on failure.
fn compile(template: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let key = &rest[start + 2..start + 2 + len];
        let parsed = FakerKey::parse(key).ok_or_else(|| key.trim().to_string())?;
        segments.push(Segment::Placeholder(parsed));
        rest = &rest[start + 2 + len + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

/// Check a template without building a generator.
pub fn check_template(template: &str) -> Result<(), String> {
    compile(template).map(|_| ())
}

/// Renders a compiled template with locale-aware fake values.
#[derive(Debug, Clone)]
pub struct FakerGenerator {
    segments: Vec<Segment>,
    locale: Locale,
}

impl FakerGenerator {
    pub fn new(table: &str, column: &str, template: &str, locale: &str) -> Result<Self, GeneratorError> {
        let segments = compile(template).map_err(|key| GeneratorError::UnknownFakerKey {
            table: table.to_string(),
            column: column.to_string(),
            key,
        })?;
        Ok(Self {
            segments,
            locale: Locale::parse(locale),
        })
    }
}

impl ValueGenerator for FakerGenerator {
    fn generate<R: Rng>(&self, rng: &mut R, _index: u64, _row: &Row) -> Result<FillValue, GeneratorError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(key) => out.push_str(&key.render(rng, self.locale)),
            }
        }
        Ok(FillValue::Text(out))
    }
}
