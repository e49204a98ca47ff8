pub mod test_merge;
pub mod test_resources;
