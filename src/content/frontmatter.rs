//! Front-matter parsing for posts written as local files
//!
//! A post file is YAML front-matter between `---` lines followed by the body.
//! An optional `<!-- more -->` marker splits the body into the initial
//! content (shown above the comparison table) and the main content.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer};

use super::post::{split_list, ColumnNames, PostDraft, StoreName, TableRow};

const MORE_MARKER: &str = "<!-- more -->";

/// Accepts either `a, b` or a YAML list
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma separated string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_list(value))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                let item = item.trim();
                if !item.is_empty() {
                    vec.push(item.to_string());
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter of a post file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub keywords: Vec<String>,
    pub image_url: Option<String>,
    pub store: Option<StoreName>,
    pub affiliate_link: Option<String>,
    pub column_names: Option<ColumnNames>,
    pub table: Vec<TableRow>,
}

impl FrontMatter {
    /// Split a file into front-matter and body
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();
        let Some(rest) = trimmed.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        let rest = rest.trim_start_matches(['\n', '\r']);

        let end_pos = rest
            .find("\n---")
            .ok_or_else(|| anyhow!("Front-matter is not closed with ---"))?;
        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)
            .map_err(|e| anyhow!("Failed to parse front-matter: {}", e))?;
        Ok((fm, remaining))
    }

    /// Build an editor draft from this front-matter and the file body
    pub fn into_draft(self, body: &str) -> PostDraft {
        let (content_initial, content) = split_more(body);
        let has_table = !self.table.is_empty();
        let use_third_column = self.table.iter().any(|row| row.col3.is_some());

        PostDraft {
            title: self.title.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            content,
            content_initial: content_initial.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            categories: self.categories,
            keywords: self.keywords,
            image_url: self.image_url.unwrap_or_default(),
            has_table,
            table_data: self.table,
            use_third_column,
            column_names: self.column_names.unwrap_or_default(),
            affiliate_link: self.affiliate_link.unwrap_or_default(),
            store_name: self.store,
        }
    }
}

/// Split a body on `<!-- more -->` into (initial content, main content)
pub fn split_more(body: &str) -> (Option<String>, String) {
    match body.find(MORE_MARKER) {
        Some(pos) => {
            let initial = body[..pos].trim().to_string();
            let rest = body[pos + MORE_MARKER.len()..].trim().to_string();
            (Some(initial).filter(|s| !s.is_empty()), rest)
        }
        None => (None, body.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_file() {
        let content = r###"---
title: Melhor air fryer de 2024
author: Ana
excerpt: "## Vale a pena?"
categories: Cozinha, Eletro
keywords:
  - air fryer
  - oferta
store: amazon
affiliate_link: https://amzn.to/abc
column_names:
  col1: Modelo
  col2: Preço
table:
  - col1: Mondial
    col2: R$ 299
  - col1: Philips
    col2: R$ 499
---
Introdução curta.
<!-- more -->
## Análise

- cesto grande
"###;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories, vec!["Cozinha", "Eletro"]);
        assert_eq!(fm.keywords, vec!["air fryer", "oferta"]);
        assert_eq!(fm.store, Some(StoreName::Amazon));

        let draft = fm.into_draft(body);
        assert_eq!(draft.title, "Melhor air fryer de 2024");
        assert_eq!(draft.excerpt, "## Vale a pena?");
        assert_eq!(draft.content_initial, "Introdução curta.");
        assert_eq!(draft.content, "## Análise\n\n- cesto grande");
        assert!(draft.has_table);
        assert!(!draft.use_third_column);
        assert_eq!(draft.column_names.col2, "Preço");
        assert_eq!(draft.table_data.len(), 2);
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = FrontMatter::parse("Só texto").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(body, "Só texto");
        assert_eq!(fm.into_draft(body).content, "Só texto");
    }

    #[test]
    fn test_unclosed_frontmatter_is_an_error() {
        assert!(FrontMatter::parse("---\ntitle: x\n").is_err());
    }

    #[test]
    fn test_unknown_store_is_an_error() {
        assert!(FrontMatter::parse("---\nstore: shopee\n---\n").is_err());
    }

    #[test]
    fn test_split_more() {
        assert_eq!(split_more("a\n<!-- more -->\nb"), (Some("a".to_string()), "b".to_string()));
        assert_eq!(split_more("<!-- more -->b"), (None, "b".to_string()));
        assert_eq!(split_more(" b "), (None, "b".to_string()));
    }
}
