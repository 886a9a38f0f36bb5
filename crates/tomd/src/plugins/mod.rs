//! Optional rule sets installed with [`Converter::use_plugin`].
//!
//! A plugin is any `FnOnce(&Converter) -> Vec<Rule>`. It may register hooks
//! or removals on the converter while it runs; the rules it returns are added
//! afterwards and take precedence over everything registered before them.
//!
//! [`Converter::use_plugin`]: crate::Converter::use_plugin

mod code_block;
mod gfm;
mod table;

pub use code_block::robust_code_block;
pub use gfm::{github_flavored, strikethrough, task_list_items};
pub use table::{table, table_compat};
