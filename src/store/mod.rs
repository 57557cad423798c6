pub(crate) mod retention;
