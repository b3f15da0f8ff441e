pub mod assets;
pub mod attributes;
pub mod settings;
