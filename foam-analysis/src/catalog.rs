//! Static keyword catalog.
//!
//! The catalog maps identifier text to a highlighting category and, for a
//! subset, to hover documentation. Its content lives in `catalog/openfoam.yaml`
//! and is embedded at compile time; [`Catalog::builtin`] parses it once per
//! process. Lookups are exact and case-sensitive.
//!
//! Category precedence is fixed by list order: `dictionary`, then `list`, then
//! `lvalue`, then `rvalue`. An identifier present in several lists takes the
//! category of the first one.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::semantic_tokens::TokenCategory;

const BUILTIN_CATALOG: &str = include_str!("../catalog/openfoam.yaml");

static BUILTIN: Lazy<Catalog> =
    Lazy::new(|| Catalog::from_yaml(BUILTIN_CATALOG).expect("embedded keyword catalog is valid"));

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse keyword catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("identifier `{0}` is documented more than once")]
    DuplicateDocumentation(String),
    #[error("keyword catalog contains an empty identifier")]
    EmptyIdentifier,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogData {
    #[serde(default)]
    dictionary: Vec<String>,
    #[serde(default)]
    list: Vec<String>,
    #[serde(default)]
    lvalue: Vec<String>,
    #[serde(default)]
    rvalue: Vec<String>,
    #[serde(default)]
    documentation: Vec<DocumentationData>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentationData {
    identifier: String,
    text: String,
}

/// One identifier known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub identifier: String,
    pub category: Option<TokenCategory>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: HashMap<String, TokenCategory>,
    documentation: HashMap<String, String>,
    classified_order: Vec<String>,
    documented_order: Vec<String>,
}

impl Catalog {
    /// The OpenFOAM catalog shipped with the crate.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_yaml::from_str(source)?;
        Self::from_data(data)
    }

    fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();

        let lists = [
            (data.dictionary, TokenCategory::Namespace),
            (data.list, TokenCategory::Keyword),
            (data.lvalue, TokenCategory::Type),
            (data.rvalue, TokenCategory::Parameter),
        ];
        for (identifiers, category) in lists {
            for identifier in identifiers {
                if identifier.is_empty() {
                    return Err(CatalogError::EmptyIdentifier);
                }
                if !catalog.categories.contains_key(&identifier) {
                    catalog.classified_order.push(identifier.clone());
                    catalog.categories.insert(identifier, category);
                }
            }
        }

        for DocumentationData { identifier, text } in data.documentation {
            if identifier.is_empty() {
                return Err(CatalogError::EmptyIdentifier);
            }
            if catalog.documentation.contains_key(&identifier) {
                return Err(CatalogError::DuplicateDocumentation(identifier));
            }
            catalog.documented_order.push(identifier.clone());
            catalog.documentation.insert(identifier, text);
        }

        Ok(catalog)
    }

    pub fn classify(&self, identifier: &str) -> Option<TokenCategory> {
        self.categories.get(identifier).copied()
    }

    pub fn documentation(&self, identifier: &str) -> Option<&str> {
        self.documentation.get(identifier).map(String::as_str)
    }

    /// Documented identifiers with their text, in data-file order.
    pub fn documented(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.documented_order.iter().filter_map(|identifier| {
            self.documentation
                .get(identifier)
                .map(|text| (identifier.as_str(), text.as_str()))
        })
    }

    pub fn documented_len(&self) -> usize {
        self.documented_order.len()
    }

    /// Every known identifier: documented ones first in data-file order, then
    /// the remaining classified identifiers in list order.
    pub fn entries(&self) -> impl Iterator<Item = KeywordEntry> + '_ {
        let undocumented = self
            .classified_order
            .iter()
            .filter(|identifier| !self.documentation.contains_key(*identifier));
        self.documented_order
            .iter()
            .chain(undocumented)
            .map(|identifier| KeywordEntry {
                identifier: identifier.clone(),
                category: self.classify(identifier),
                documentation: self.documentation(identifier).map(str::to_string),
            })
    }
}
