pub mod test_address_properties;
pub mod test_locality_properties;
