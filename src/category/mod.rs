//! Categories that label transactions, e.g. "Salary" for income or "Groceries" for expenses.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category_by_name,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryName, NewCategory};
pub use list::list_categories_endpoint;
