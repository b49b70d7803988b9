//! Category Application Service (Use Case)

use std::sync::Arc;
use uuid::Uuid;

use farmlink::domain::services::{build_tree, plan_reparent, subtree_ids};
use farmlink::{
    Actor, Category, CategoryRepository, CategoryTreeNode, DomainError, ProductRepository, Role,
};

pub struct CategoryService<C: CategoryRepository, P: ProductRepository> {
    categories: Arc<C>,
    products: Arc<P>,
}

impl<C: CategoryRepository, P: ProductRepository> CategoryService<C, P> {
    pub fn new(categories: Arc<C>, products: Arc<P>) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Category, DomainError> {
        actor.require_role(Role::Admin)?;
        let name = required_name(name)?;

        let parent = match parent_id {
            Some(id) => Some(
                self.categories
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Category", id))?,
            ),
            None => None,
        };

        let category = self
            .categories
            .insert(&Category::new(name, parent.as_ref()))
            .await?;

        tracing::info!("Created category: {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn tree(&self) -> Result<Vec<CategoryTreeNode>, DomainError> {
        let all = self.categories.find_all().await?;
        Ok(build_tree(&all))
    }

    /// Rename and optionally move a category; the moved subtree is relevelled
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Category, DomainError> {
        actor.require_role(Role::Admin)?;
        let name = required_name(name)?;

        let all = self.categories.find_all().await?;
        let levels = plan_reparent(&all, id, parent_id)?;
        let mut category = all
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("Category", id))?;

        category.name = name;
        category.parent_id = parent_id;
        if let Some((_, level)) = levels.first() {
            category.level = *level;
        }

        let saved = self.categories.update(&category, &levels).await?;
        tracing::info!("Updated category: {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    /// Delete a category with its whole subtree, refusing while products use any of it
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_role(Role::Admin)?;

        let all = self.categories.find_all().await?;
        if !all.iter().any(|c| c.id == id) {
            return Err(DomainError::not_found("Category", id));
        }
        let ids = subtree_ids(&all, id);

        if self.products.exists_in_categories(&ids).await? {
            return Err(DomainError::conflict(
                "category is still used by products",
            ));
        }

        let removed = self.categories.delete_many(&ids).await?;
        tracing::info!("Deleted category {} ({} nodes)", id, removed);
        Ok(())
    }

    /// Ids of `id` and all its descendants; NotFound for an unknown category
    pub async fn subtree(&self, id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let all = self.categories.find_all().await?;
        if !all.iter().any(|c| c.id == id) {
            return Err(DomainError::not_found("Category", id));
        }
        Ok(subtree_ids(&all, id))
    }
}

fn required_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("category name is required"));
    }
    Ok(name.to_string())
}
