//! Built-in site templates using the Tera template engine
//!
//! Every page template is embedded in the binary. Post text goes through the
//! `blocks` filter, which renders the line-based markup to HTML.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostDraft, StoreName, TableRow};
use crate::helpers::{self, BlockStyle};

/// Length of generated meta descriptions
const DESCRIPTION_CHARS: usize = 160;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escape interpolations in pages; rendered post text is marked `safe`
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("macros.html", include_str!("site/macros.html")),
            ("index.html", include_str!("site/index.html")),
            ("posts.html", include_str!("site/posts.html")),
            ("post.html", include_str!("site/post.html")),
            ("search.html", include_str!("site/search.html")),
            ("about.html", include_str!("site/about.html")),
            ("privacy.html", include_str!("site/privacy.html")),
            ("terms.html", include_str!("site/terms.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("gate.html", include_str!("site/gate.html")),
            ("editor.html", include_str!("site/editor.html")),
            // Partials
            (
                "partials/navbar.html",
                include_str!("site/partials/navbar.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter("blocks", blocks_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Context every page starts from
    pub fn base_context(config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(config));
        context
    }
}

/// Tera filter: render post text to HTML, `style` is "lead" or "body"
fn blocks_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("blocks", "value", String, value);
    let style = match args.get("style") {
        Some(val) => {
            let name = tera::try_get_value!("blocks", "style", String, val);
            BlockStyle::from_name(&name)
                .ok_or_else(|| tera::Error::msg(format!("unknown block style `{}`", name)))?
        }
        None => BlockStyle::Body,
    };
    Ok(tera::Value::String(helpers::render_html(&s, style)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub logo_url: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            logo_url: config.logo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub slug: String,
    pub path: String,
    pub permalink: String,
    pub excerpt: String,
    /// Plain-text excerpt for meta tags and cards
    pub description: String,
    pub content: String,
    pub content_initial: String,
    pub image_url: String,
    pub author: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    /// dd/mm/yyyy
    pub date: String,
    pub published_time: String,
    pub modified_time: String,
    pub store: Option<StoreData>,
    pub table: Option<TableData>,
}

impl PostData {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        let path = helpers::post_path(&post.slug);
        let store = match (post.has_store_button(), post.store_name) {
            (true, Some(store)) => Some(StoreData {
                name: store.display_name().to_string(),
                class: store.button_class().to_string(),
                link: helpers::safe_href(post.affiliate_link.as_deref().unwrap_or_default()),
            }),
            _ => None,
        };

        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            permalink: helpers::full_url_for(config, &path),
            path,
            excerpt: post.excerpt.clone(),
            description: helpers::meta_description(&post.excerpt, DESCRIPTION_CHARS),
            content: post.content.clone(),
            content_initial: post.content_initial.clone().unwrap_or_default(),
            image_url: post.image_url.clone(),
            author: post.author.clone(),
            categories: post.categories.clone(),
            keywords: post.keywords.clone(),
            date: post
                .display_date()
                .map(|d| helpers::format_date_br(&d))
                .unwrap_or_default(),
            published_time: post
                .created_at
                .map(|d| helpers::date_xml(&d))
                .unwrap_or_default(),
            modified_time: post
                .modified_at()
                .map(|d| helpers::date_xml(&d))
                .unwrap_or_default(),
            store,
            table: post.shows_table().then(|| TableData::new(post)),
        }
    }

    /// schema.org Article markup, safe to embed in a script tag
    pub fn json_ld(&self, config: &SiteConfig) -> String {
        let schema = serde_json::json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": self.title,
            "image": self.image_url,
            "author": { "@type": "Person", "name": self.author },
            "publisher": {
                "@type": "Organization",
                "name": config.title,
                "logo": { "@type": "ImageObject", "url": config.logo_url }
            },
            "datePublished": self.published_time,
            "dateModified": self.modified_time,
            "description": self.description,
        });
        schema.to_string().replace("</", "<\\/")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreData {
    pub name: String,
    pub class: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn new(post: &Post) -> Self {
        let names = post.column_names.clone().unwrap_or_default();
        let mut headers = vec![names.col1, names.col2];
        if post.use_third_column {
            headers.push(names.col3.unwrap_or_else(|| "Coluna 3".to_string()));
        }

        let rows = post
            .table_data
            .iter()
            .map(|row| {
                let mut cells = vec![row.col1.clone(), row.col2.clone()];
                if post.use_third_column {
                    cells.push(row.col3.clone().unwrap_or_default());
                }
                cells
            })
            .collect();

        Self { headers, rows }
    }
}

/// Values of the editor form
#[derive(Debug, Clone, Serialize)]
pub struct EditorData {
    /// Form target
    pub action: String,
    pub editing: bool,
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: String,
    pub content_initial: String,
    pub content: String,
    pub author: String,
    pub categories: String,
    pub keywords: String,
    pub image_url: String,
    pub affiliate_link: String,
    pub stores: Vec<StoreOption>,
    pub has_table: bool,
    pub use_third_column: bool,
    pub col1_name: String,
    pub col2_name: String,
    pub col3_name: String,
    /// One row per line, cells separated by `|`
    pub table: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreOption {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

impl EditorData {
    pub fn new(draft: &PostDraft, slug: Option<&str>) -> Self {
        let action = match slug {
            Some(slug) => format!("{}/edit", helpers::post_path(slug)),
            None => "/admin/new".to_string(),
        };
        let stores = StoreName::ALL
            .into_iter()
            .map(|store| StoreOption {
                key: store.key().to_string(),
                label: store.label().to_string(),
                selected: draft.store_name == Some(store),
            })
            .collect();

        Self {
            action,
            editing: slug.is_some(),
            slug: slug.map(str::to_string),
            title: draft.title.clone(),
            excerpt: draft.excerpt.clone(),
            content_initial: draft.content_initial.clone(),
            content: draft.content.clone(),
            author: draft.author.clone(),
            categories: draft.categories.join(", "),
            keywords: draft.keywords.join(", "),
            image_url: draft.image_url.clone(),
            affiliate_link: draft.affiliate_link.clone(),
            stores,
            has_table: draft.has_table,
            use_third_column: draft.use_third_column,
            col1_name: draft.column_names.col1.clone(),
            col2_name: draft.column_names.col2.clone(),
            col3_name: draft.column_names.col3.clone().unwrap_or_default(),
            table: format_table(&draft.table_data),
        }
    }
}

/// Table rows as editor text
pub fn format_table(rows: &[TableRow]) -> String {
    rows.iter()
        .map(|row| match &row.col3 {
            Some(col3) => format!("{} | {} | {}", row.col1, row.col2, col3),
            None => format!("{} | {}", row.col1, row.col2),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse editor text back into table rows; blank lines are skipped
pub fn parse_table(text: &str) -> Vec<TableRow> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cells = line.splitn(3, '|').map(|c| c.trim().to_string());
            TableRow {
                col1: cells.next().unwrap_or_default(),
                col2: cells.next().unwrap_or_default(),
                col3: cells.next(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ColumnNames;
    use chrono::{TimeZone, Utc};

    fn sample_post() -> Post {
        let mut post = Post {
            id: 1,
            title: "Fone JBL </script>".to_string(),
            slug: "fone-jbl".to_string(),
            excerpt: "## Resumo\nVeja [aqui](https://loja.com/x)".to_string(),
            content: "Texto".to_string(),
            content_initial: None,
            image_url: "https://img/x.png".to_string(),
            author: "Ana".to_string(),
            categories: vec!["Áudio".to_string()],
            keywords: Vec::new(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()),
            updated_at: None,
            has_table: true,
            table_data: vec![TableRow {
                col1: "Bateria".to_string(),
                col2: "40h".to_string(),
                col3: Some("ignorada".to_string()),
            }],
            use_third_column: false,
            column_names: Some(ColumnNames::default()),
            affiliate_link: Some("https://ml.com/x".to_string()),
            store_name: Some(StoreName::MercadoLivre),
        };
        post.content_initial = Some("> Destaque".to_string());
        post
    }

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_post_data() {
        let config = SiteConfig::default();
        let data = PostData::new(&sample_post(), &config);
        assert_eq!(data.path, "/blog/fone-jbl");
        assert_eq!(data.permalink, "https://achandooferta.com.br/blog/fone-jbl");
        assert_eq!(data.date, "05/03/2024");
        assert_eq!(data.description, "Resumo Veja aqui");
        assert_eq!(data.store.as_ref().unwrap().name, "Mercado Livre");

        let table = data.table.as_ref().unwrap();
        assert_eq!(table.headers, vec!["Coluna 1", "Coluna 2"]);
        assert_eq!(table.rows, vec![vec!["Bateria", "40h"]]);

        let json_ld = data.json_ld(&config);
        assert!(!json_ld.contains("</script>"));
        assert!(json_ld.contains("\"@type\":\"Article\""));
    }

    #[test]
    fn test_script_affiliate_link_is_neutralized() {
        let mut post = sample_post();
        post.affiliate_link = Some(" JavaScript:alert(1)".to_string());
        let data = PostData::new(&post, &SiteConfig::default());
        assert_eq!(data.store.unwrap().link, "#");
    }

    #[test]
    fn test_render_post_page() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let data = PostData::new(&sample_post(), &config);

        let mut context = TemplateRenderer::base_context(&config);
        context.insert("json_ld", &data.json_ld(&config));
        context.insert("post", &data);
        let html = renderer.render("post.html", &context).unwrap();

        assert!(html.contains("Fone JBL &lt;&#x2F;script&gt;"));
        assert!(html.contains("<h2"));
        assert!(html.contains(r#"href="https://loja.com/x""#));
        assert!(html.contains("<blockquote"));
        assert!(html.contains("Ir para Mercado Livre"));
        assert!(html.contains("Bateria"));
    }

    #[test]
    fn test_editor_data() {
        let mut draft = sample_post().draft();
        draft.use_third_column = true;
        let data = EditorData::new(&draft, Some("fone-jbl"));
        assert_eq!(data.action, "/blog/fone-jbl/edit");
        assert_eq!(data.table, "Bateria | 40h | ignorada");
        assert!(data.stores.iter().any(|s| s.key == "mercado_livre" && s.selected));

        let new = EditorData::new(&PostDraft::default(), None);
        assert_eq!(new.action, "/admin/new");
        assert!(!new.stores.iter().any(|s| s.selected));
    }

    #[test]
    fn test_parse_table() {
        let rows = parse_table("Tela | 6,1\"\n\nPeso|170g|leve\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].col2, "6,1\"");
        assert_eq!(rows[0].col3, None);
        assert_eq!(rows[1].col3.as_deref(), Some("leve"));
        assert_eq!(parse_table(&format_table(&rows)), rows);
    }

    #[test]
    fn test_blocks_filter_rejects_unknown_style() {
        let mut args = HashMap::new();
        args.insert("style".to_string(), tera::Value::String("x".to_string()));
        assert!(blocks_filter(&tera::Value::String("a".to_string()), &args).is_err());
    }
}
