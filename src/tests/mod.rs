pub mod test_policy;
pub mod test_world_model;
