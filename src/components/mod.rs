//! UI components.

pub mod tree_editor;
