pub(crate) mod create_index;
pub(crate) mod list_indexes;
pub(crate) mod ping;
