//! Text search over posts

use super::Post;

/// Queries shorter than this (after trimming) return nothing
pub const MIN_QUERY_CHARS: usize = 2;

/// Posts whose title, excerpt or content contain `query`, ignoring case.
///
/// Keeps the order of `posts`.
pub fn search<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.excerpt.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64, title: &str, excerpt: &str, content: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "slug": format!("p{}", id),
            "excerpt": excerpt,
            "content": content,
        }))
        .unwrap()
    }

    #[test]
    fn test_matches_any_field_case_insensitive() {
        let posts = vec![
            post(1, "Fone JBL Tune", "", ""),
            post(2, "Notebook", "Ótimo para ESTUDOS", ""),
            post(3, "Cadeira", "", "boa para estudos longos"),
            post(4, "Geladeira", "", ""),
        ];
        let ids: Vec<i64> = search(&posts, "estudos").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
        let ids: Vec<i64> = search(&posts, "  jbl ").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
        let ids: Vec<i64> = search(&posts, "ÓTIMO").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_short_query_returns_nothing() {
        let posts = vec![post(1, "a", "", "")];
        assert!(search(&posts, "a").is_empty());
        assert!(search(&posts, "   ").is_empty());
    }
}
