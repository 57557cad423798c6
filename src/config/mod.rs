//! JSON configuration, loaded once at process entry and passed explicitly to every stage.

pub(crate) mod model;
pub(crate) mod settings;
