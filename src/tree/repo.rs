use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// One node of the materialized referral forest. `level`, `path` and
/// `path_ids` let a consumer rebuild the hierarchy from the flat list
/// without further queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: i64,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub referral_id: Option<String>,
    /// 0 for roots (no referrer), parent level + 1 below.
    pub level: i32,
    /// Display chain of full names from the root, " → " separated.
    pub path: String,
    /// User ids from the root down to this node; the sort key of the output.
    pub path_ids: Vec<String>,
}

/// Materialize the whole referral forest. Every user with a null
/// `referral_id` roots a tree; the recursive walk goes strictly downward
/// over the referral edge, so it visits each node once and terminates as
/// long as the relation stays acyclic. Rows come back depth-first, ordered
/// lexicographically by `path_ids`. An empty table yields an empty list.
pub async fn build_tree(db: &PgPool) -> sqlx::Result<Vec<TreeNode>> {
    sqlx::query_as::<_, TreeNode>(
        r#"
        WITH RECURSIVE referral_tree AS (
            SELECT id, user_id, full_name, email, mobile, referral_id,
                   0 AS level,
                   full_name::TEXT AS path,
                   ARRAY[user_id]::VARCHAR[] AS path_ids
            FROM users
            WHERE referral_id IS NULL
            UNION ALL
            SELECT u.id, u.user_id, u.full_name, u.email, u.mobile, u.referral_id,
                   rt.level + 1,
                   rt.path || ' → ' || u.full_name,
                   rt.path_ids || u.user_id
            FROM users u
            JOIN referral_tree rt ON u.referral_id = rt.user_id
        )
        SELECT id, user_id, full_name, email, mobile, referral_id, level, path, path_ids
        FROM referral_tree
        ORDER BY path_ids
        "#,
    )
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, user_id: &str, level: i32, path: &str, path_ids: &[&str]) -> TreeNode {
        TreeNode {
            id,
            user_id: user_id.into(),
            full_name: path.rsplit(" → ").next().unwrap_or(path).into(),
            email: format!("{}@x.com", user_id.to_lowercase()),
            mobile: format!("98765{:05}", id),
            referral_id: if level == 0 {
                None
            } else {
                path_ids.get(path_ids.len() - 2).map(|s| s.to_string())
            },
            level,
            path: path.into(),
            path_ids: path_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn node_serializes_camel_case_with_path_ids() {
        let n = node(3, "EP30000", 2, "A → B → C", &["EP10000", "EP20000", "EP30000"]);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["userId"], "EP30000");
        assert_eq!(json["level"], 2);
        assert_eq!(json["path"], "A → B → C");
        assert_eq!(
            json["pathIds"],
            serde_json::json!(["EP10000", "EP20000", "EP30000"])
        );
    }

    // Mirrors the ORDER BY path_ids contract: sorting the flat list by
    // path_ids puts every parent immediately before its subtree.
    #[test]
    fn path_ids_ordering_is_depth_first() {
        let mut nodes = vec![
            node(4, "EP40000", 0, "D", &["EP40000"]),
            node(3, "EP30000", 2, "A → B → C", &["EP10000", "EP20000", "EP30000"]),
            node(1, "EP10000", 0, "A", &["EP10000"]),
            node(2, "EP20000", 1, "A → B", &["EP10000", "EP20000"]),
        ];
        nodes.sort_by(|a, b| a.path_ids.cmp(&b.path_ids));

        let order: Vec<&str> = nodes.iter().map(|n| n.user_id.as_str()).collect();
        assert_eq!(order, ["EP10000", "EP20000", "EP30000", "EP40000"]);

        let levels: Vec<i32> = nodes.iter().map(|n| n.level).collect();
        assert_eq!(levels, [0, 1, 2, 0]);
    }
}
