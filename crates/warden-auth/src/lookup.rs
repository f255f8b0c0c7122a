//! Parsing of `source:name` credential lookup lists.
//!
//! A lookup list such as `param:api_key,query:api_key,cookie:api_key,header:x-api-key`
//! is parsed once at startup into a [`LookupChain`]. Entries that are empty,
//! lack a `:` separator or name an unknown source are skipped with a warning.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Header,
    Query,
    Cookie,
    Param,
}

impl FromStr for LookupSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(LookupSource::Header),
            "query" => Ok(LookupSource::Query),
            "cookie" => Ok(LookupSource::Cookie),
            "param" => Ok(LookupSource::Param),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupSource::Header => "header",
            LookupSource::Query => "query",
            LookupSource::Cookie => "cookie",
            LookupSource::Param => "param",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupLocation {
    pub source: LookupSource,
    pub name: String,
}

impl fmt::Display for LookupLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.name)
    }
}

/// Ordered, non-empty list of places to look for a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupChain {
    locations: Vec<LookupLocation>,
}

impl LookupChain {
    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let mut locations = Vec::new();

        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let Some((source, name)) = entry.split_once(':') else {
                warn!(lookup = %entry, "Skipping lookup entry without `source:name` form");
                continue;
            };

            let name = name.trim();
            let Ok(source) = source.trim().parse::<LookupSource>() else {
                warn!(lookup = %entry, "Skipping lookup entry with unsupported source");
                continue;
            };
            if name.is_empty() {
                warn!(lookup = %entry, "Skipping lookup entry without a name");
                continue;
            }

            locations.push(LookupLocation {
                source,
                name: name.to_string(),
            });
        }

        if locations.is_empty() {
            return Err(SetupError::EmptyLookup(raw.to_string()));
        }

        Ok(Self { locations })
    }

    pub fn locations(&self) -> &[LookupLocation] {
        &self.locations
    }
}

impl fmt::Display for LookupChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, location) in self.locations.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", location)?;
        }
        Ok(())
    }
}
