//! Post model as stored in the `posts` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store that an affiliate link points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreName {
    MercadoLivre,
    Amazon,
    Magalu,
    Kabum,
    Outros,
}

impl StoreName {
    pub const ALL: [StoreName; 5] = [
        StoreName::MercadoLivre,
        StoreName::Amazon,
        StoreName::Magalu,
        StoreName::Kabum,
        StoreName::Outros,
    ];

    /// Identifier used in storage and form values
    pub fn key(self) -> &'static str {
        match self {
            StoreName::MercadoLivre => "mercado_livre",
            StoreName::Amazon => "amazon",
            StoreName::Magalu => "magalu",
            StoreName::Kabum => "kabum",
            StoreName::Outros => "outros",
        }
    }

    /// Name shown on the "Ir para ..." button
    pub fn display_name(self) -> &'static str {
        match self {
            StoreName::MercadoLivre => "Mercado Livre",
            StoreName::Amazon => "Amazon",
            StoreName::Magalu => "Magazine Luiza",
            StoreName::Kabum => "KaBuM!",
            StoreName::Outros => "Site Oficial",
        }
    }

    /// Name shown in the editor's store picker
    pub fn label(self) -> &'static str {
        match self {
            StoreName::Outros => "Outros",
            other => other.display_name(),
        }
    }

    pub fn button_class(self) -> &'static str {
        match self {
            StoreName::MercadoLivre => "bg-[#FFF159] hover:bg-[#FFE600] text-[#2D3277] font-semibold",
            StoreName::Amazon => "bg-[#232F3E] hover:bg-[#131921] text-white font-medium",
            StoreName::Magalu => "bg-[#0086FF] hover:bg-[#0066CC] text-white font-medium",
            StoreName::Kabum => "bg-[#FF6500] hover:bg-[#E65D00] text-white font-medium",
            StoreName::Outros => "bg-gray-900 hover:bg-gray-800 text-white",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub col1: String,
    pub col2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col3: Option<String>,
}

/// Header labels of the comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub col1: String,
    pub col2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col3: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            col1: "Coluna 1".to_string(),
            col2: "Coluna 2".to_string(),
            col3: Some("Coluna 3".to_string()),
        }
    }
}

/// A published post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_initial: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub has_table: bool,
    #[serde(default)]
    pub table_data: Vec<TableRow>,
    #[serde(default)]
    pub use_third_column: bool,
    #[serde(default)]
    pub column_names: Option<ColumnNames>,

    #[serde(default)]
    pub affiliate_link: Option<String>,
    #[serde(default)]
    pub store_name: Option<StoreName>,
}

impl Post {
    /// Date shown under the title
    pub fn display_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    /// Last modification time, falling back to creation
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Whether the post page should show a store button
    pub fn has_store_button(&self) -> bool {
        self.store_name.is_some()
            && self
                .affiliate_link
                .as_deref()
                .is_some_and(|link| !link.is_empty())
    }

    /// Whether the comparison table has anything to show
    pub fn shows_table(&self) -> bool {
        self.has_table && !self.table_data.is_empty()
    }

    /// Editable copy of this post
    pub fn draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            content_initial: self.content_initial.clone().unwrap_or_default(),
            author: self.author.clone(),
            categories: self.categories.clone(),
            keywords: self.keywords.clone(),
            image_url: self.image_url.clone(),
            has_table: self.has_table,
            table_data: self.table_data.clone(),
            use_third_column: self.use_third_column,
            column_names: self.column_names.clone().unwrap_or_default(),
            affiliate_link: self.affiliate_link.clone().unwrap_or_default(),
            store_name: self.store_name,
        }
    }
}

/// The fields an editor fills in. Everything except id, slug and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub content_initial: String,
    pub author: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub image_url: String,
    pub has_table: bool,
    pub table_data: Vec<TableRow>,
    pub use_third_column: bool,
    pub column_names: ColumnNames,
    pub affiliate_link: String,
    pub store_name: Option<StoreName>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
            content_initial: String::new(),
            author: String::new(),
            categories: Vec::new(),
            keywords: Vec::new(),
            image_url: String::new(),
            has_table: false,
            table_data: Vec::new(),
            use_third_column: false,
            column_names: ColumnNames::default(),
            affiliate_link: String::new(),
            store_name: None,
        }
    }
}

impl PostDraft {
    /// Check the fields the editor marks as required.
    ///
    /// Returns the label of the first missing field.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("Título", &self.title),
            ("Resumo", &self.excerpt),
            ("Conteúdo Principal", &self.content),
            ("Autor", &self.author),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
    }

    /// Drop table rows when the table is switched off
    pub fn normalized(mut self) -> Self {
        if !self.has_table {
            self.table_data.clear();
        }
        if !self.use_third_column {
            for row in &mut self.table_data {
                row.col3 = None;
            }
        }
        self
    }
}

/// Split a comma separated input ("Tecnologia, Design") into trimmed values
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Record handed to the insert call: the draft plus its allocated slug
#[derive(Debug, Clone, Serialize)]
pub struct NewPost<'a> {
    #[serde(flatten)]
    pub draft: &'a PostDraft,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}
