//! Spending categories, nested at most one level deep.

use rusqlite::{Connection, params};

use crate::{Error, database_id::DatabaseId};

/// Alias for integers used as category IDs.
pub type CategoryId = DatabaseId;

/// A label for classifying transactions.
///
/// A category may have a parent, but a parent may not itself have one, so the
/// hierarchy is at most two levels: top-level categories and their
/// subcategories.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: DatabaseId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

/// Create the category table if it does not exist.
///
/// Deleting a parent category promotes its subcategories to the top level.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            name TEXT NOT NULL,
            parent_id INTEGER REFERENCES category(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        parent_id: row.get(3)?,
    })
}

/// Create a new category.
///
/// # Errors
/// Returns [Error::EmptyName] if `name` is blank,
/// [Error::NestedCategoryParent] if the chosen parent is itself a
/// subcategory, [Error::InvalidReference] if the parent does not exist for
/// this user, or [Error::SqlError] for other SQL errors.
pub fn create_category(
    name: &str,
    parent_id: Option<CategoryId>,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("category"));
    }

    if let Some(parent_id) = parent_id {
        validate_parent(parent_id, user_id, connection)?;
    }

    let category = connection
        .prepare(
            "INSERT INTO category (user_id, name, parent_id) VALUES (?1, ?2, ?3)
            RETURNING id, user_id, name, parent_id",
        )?
        .query_one(params![user_id, name, parent_id], map_row_to_category)?;

    Ok(category)
}

/// Retrieve a category by its `id`.
pub fn get_category(
    id: CategoryId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare(
            "SELECT id, user_id, name, parent_id FROM category
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_one((id, user_id), map_row_to_category)?;

    Ok(category)
}

/// Retrieve all of the user's categories with each parent followed by its
/// subcategories, for rendering lists and select options.
pub fn get_all_categories(
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let categories: Vec<Category> = connection
        .prepare(
            "SELECT id, user_id, name, parent_id FROM category
            WHERE user_id = ?1
            ORDER BY name ASC",
        )?
        .query_map([user_id], map_row_to_category)?
        .map(|category_result| category_result.map_err(Error::from))
        .collect::<Result<_, _>>()?;

    Ok(arrange_by_parent(categories))
}

/// Orders categories so each top-level category is immediately followed by
/// its subcategories. Subcategories whose parent is missing from the list
/// are appended at the end.
fn arrange_by_parent(categories: Vec<Category>) -> Vec<Category> {
    let mut arranged = Vec::with_capacity(categories.len());

    for parent in categories.iter().filter(|c| c.parent_id.is_none()) {
        arranged.push(parent.clone());
        arranged.extend(
            categories
                .iter()
                .filter(|child| child.parent_id == Some(parent.id))
                .cloned(),
        );
    }

    for orphan in &categories {
        if !arranged.contains(orphan) {
            arranged.push(orphan.clone());
        }
    }

    arranged
}

/// Update a category's name and parent.
///
/// # Errors
/// In addition to the errors from [create_category], returns
/// [Error::NestedCategoryParent] if the category has subcategories of its own
/// and a parent was selected, or [Error::InvalidReference] if the category
/// was chosen as its own parent.
pub fn update_category(
    id: CategoryId,
    name: &str,
    parent_id: Option<CategoryId>,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("category"));
    }

    if let Some(parent_id) = parent_id {
        if parent_id == id {
            return Err(Error::InvalidReference);
        }

        validate_parent(parent_id, user_id, connection)?;

        let child_count: i64 = connection
            .prepare("SELECT COUNT(*) FROM category WHERE parent_id = ?1")?
            .query_one([id], |row| row.get(0))?;

        if child_count > 0 {
            return Err(Error::NestedCategoryParent);
        }
    }

    connection
        .execute(
            "UPDATE category SET name = ?1, parent_id = ?2 WHERE id = ?3 AND user_id = ?4",
            params![name, parent_id, id, user_id],
        )
        .map_err(Error::from)
}

/// Delete a category. Transactions that referenced it keep their amounts but
/// lose the category label, and its subcategories become top-level.
pub fn delete_category(
    id: CategoryId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .map_err(Error::from)
}

fn validate_parent(
    parent_id: CategoryId,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let parent = get_category(parent_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidReference,
        other => other,
    })?;

    if parent.parent_id.is_some() {
        return Err(Error::NestedCategoryParent);
    }

    Ok(())
}
