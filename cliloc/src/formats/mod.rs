//! The two supported file formats and the locale suffixes that identify cliloc files.
//!
//! This module re-exports the main types for each format and provides
//! the [`FormatType`] enum used to pick a conversion direction from file names.

pub mod cliloc;
pub mod csv;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use cliloc::{ClilocFile, ClilocReader, ClilocWriter};
pub use csv::{CsvFile, CsvReader, CsvWriter};

use crate::Error;

/// A locale suffix a cliloc file can carry, e.g. `cliloc.enu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Chs,
    Cht,
    Deu,
    Enu,
    Esp,
    Fra,
    Ita,
    Jpn,
    Kor,
    Ptb,
    Rus,
}

impl Locale {
    /// Every supported locale, in alphabetical order.
    pub const ALL: [Locale; 11] = [
        Locale::Chs,
        Locale::Cht,
        Locale::Deu,
        Locale::Enu,
        Locale::Esp,
        Locale::Fra,
        Locale::Ita,
        Locale::Jpn,
        Locale::Kor,
        Locale::Ptb,
        Locale::Rus,
    ];

    /// The upper-case tag of this locale.
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Chs => "CHS",
            Locale::Cht => "CHT",
            Locale::Deu => "DEU",
            Locale::Enu => "ENU",
            Locale::Esp => "ESP",
            Locale::Fra => "FRA",
            Locale::Ita => "ITA",
            Locale::Jpn => "JPN",
            Locale::Kor => "KOR",
            Locale::Ptb => "PTB",
            Locale::Rus => "RUS",
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive; leading dots are ignored so `".enu"` parses too.
impl FromStr for Locale {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches('.');
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// Represents both supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// Binary cliloc file for the given locale.
    Cliloc(Locale),
    /// Semicolon-delimited text.
    Csv,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use cliloc::formats::{FormatType, Locale};
/// assert_eq!(FormatType::Cliloc(Locale::Deu).to_string(), "cliloc (DEU)");
/// assert_eq!(FormatType::Csv.to_string(), "csv");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Cliloc(locale) => write!(f, "cliloc ({})", locale),
            FormatType::Csv => write!(f, "csv"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`FormatType`].
///
/// Accepts `"csv"` or any supported locale tag, ignoring case.
///
/// # Example
/// ```rust
/// use cliloc::formats::{FormatType, Locale};
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("CSV").unwrap(), FormatType::Csv);
/// assert_eq!(FormatType::from_str("enu").unwrap(), FormatType::Cliloc(Locale::Enu));
/// assert!(FormatType::from_str("txt").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().trim_start_matches('.');
        if tag.eq_ignore_ascii_case("csv") {
            return Ok(FormatType::Csv);
        }
        tag.parse::<Locale>()
            .map(FormatType::Cliloc)
            .map_err(|_| Error::UnknownFormat(s.to_string()))
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> String {
        match self {
            FormatType::Cliloc(locale) => locale.as_str().to_ascii_lowercase(),
            FormatType::Csv => "csv".to_string(),
        }
    }
}

/// Infers the format from the final extension of a file name.
///
/// Returns `None` when there is no extension or it is not recognised.
///
/// # Example
/// ```rust
/// use cliloc::formats::{FormatType, Locale, infer_format_from_extension};
/// assert_eq!(infer_format_from_extension("data/cliloc.ENU"), Some(FormatType::Cliloc(Locale::Enu)));
/// assert_eq!(infer_format_from_extension("german.csv"), Some(FormatType::Csv));
/// assert_eq!(infer_format_from_extension("v1.2/cliloc"), None);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FormatType> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_str_is_case_insensitive() {
        assert_eq!("enu".parse::<Locale>().unwrap(), Locale::Enu);
        assert_eq!("ENU".parse::<Locale>().unwrap(), Locale::Enu);
        assert_eq!("dEu".parse::<Locale>().unwrap(), Locale::Deu);
        assert_eq!(".fra".parse::<Locale>().unwrap(), Locale::Fra);
        assert!("xyz".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn test_every_locale_round_trips_through_its_tag() {
        for locale in Locale::ALL {
            assert_eq!(locale.as_str().parse::<Locale>().unwrap(), locale);
            assert_eq!(locale.to_string(), locale.as_str());
        }
    }

    #[test]
    fn test_format_type_from_str() {
        assert_eq!(FormatType::from_str("csv").unwrap(), FormatType::Csv);
        assert_eq!(FormatType::from_str("  Csv ").unwrap(), FormatType::Csv);
        assert_eq!(
            FormatType::from_str("kor").unwrap(),
            FormatType::Cliloc(Locale::Kor)
        );
        assert!(matches!(
            FormatType::from_str("tsv"),
            Err(Error::UnknownFormat(s)) if s == "tsv"
        ));
    }

    #[test]
    fn test_format_type_extension() {
        assert_eq!(FormatType::Cliloc(Locale::Jpn).extension(), "jpn");
        assert_eq!(FormatType::Csv.extension(), "csv");
    }

    #[test]
    fn test_infer_format_from_extension() {
        assert_eq!(
            infer_format_from_extension("cliloc.enu"),
            Some(FormatType::Cliloc(Locale::Enu))
        );
        assert_eq!(
            infer_format_from_extension("/games/client/Cliloc.Rus"),
            Some(FormatType::Cliloc(Locale::Rus))
        );
        assert_eq!(
            infer_format_from_extension("out/german.CSV"),
            Some(FormatType::Csv)
        );
        assert_eq!(infer_format_from_extension("cliloc"), None);
        assert_eq!(infer_format_from_extension("notes.txt"), None);
        assert_eq!(infer_format_from_extension("dir.enu/cliloc"), None);
    }
}
