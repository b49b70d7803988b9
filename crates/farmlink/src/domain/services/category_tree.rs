//! Category Tree - Building and reshaping the category hierarchy

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::entities::{Category, CategoryTreeNode};
use crate::domain::errors::DomainError;

/// Nest a flat category list. Roots and siblings are sorted by name;
/// nodes whose parent is missing never appear.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeNode> {
    let mut children: HashMap<Option<Uuid>, Vec<&Category>> = HashMap::new();
    for category in categories {
        children.entry(category.parent_id).or_default().push(category);
    }
    for list in children.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn attach(
        parent: Option<Uuid>,
        children: &HashMap<Option<Uuid>, Vec<&Category>>,
    ) -> Vec<CategoryTreeNode> {
        children
            .get(&parent)
            .map(|list| {
                list.iter()
                    .map(|c| CategoryTreeNode {
                        id: c.id,
                        name: c.name.clone(),
                        parent_id: c.parent_id,
                        level: c.level,
                        children: attach(Some(c.id), children),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    attach(None, &children)
}

/// `root` and every category below it
pub fn subtree_ids(categories: &[Category], root: Uuid) -> Vec<Uuid> {
    let mut result = vec![root];
    let mut cursor = 0;
    while cursor < result.len() {
        let current = result[cursor];
        result.extend(
            categories
                .iter()
                .filter(|c| c.parent_id == Some(current))
                .map(|c| c.id),
        );
        cursor += 1;
    }
    result
}

/// Check that `id` may be moved under `new_parent` and compute the new
/// level of every category in the moved subtree.
pub fn plan_reparent(
    categories: &[Category],
    id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<Vec<(Uuid, i32)>, DomainError> {
    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    if !by_id.contains_key(&id) {
        return Err(DomainError::not_found("Category", id));
    }

    let base_level = match new_parent {
        None => 0,
        Some(parent_id) => {
            let parent = by_id
                .get(&parent_id)
                .ok_or_else(|| DomainError::not_found("Category", parent_id))?;
            if subtree_ids(categories, id).contains(&parent_id) {
                return Err(DomainError::validation(
                    "category cannot be moved under itself or its descendants",
                ));
            }
            parent.level + 1
        }
    };

    let mut levels = vec![(id, base_level)];
    let mut cursor = 0;
    while cursor < levels.len() {
        let (current, level) = levels[cursor];
        levels.extend(
            categories
                .iter()
                .filter(|c| c.parent_id == Some(current))
                .map(|c| (c.id, level + 1)),
        );
        cursor += 1;
    }
    Ok(levels)
}
