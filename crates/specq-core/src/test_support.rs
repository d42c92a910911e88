//! Shared fixtures for unit tests.

///
/// Customer
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Customer {
    pub id: u32,
    pub name: String,
    pub active: bool,
    pub age: u32,
    pub city: String,
}

impl Customer {
    pub fn new(id: u32, name: &str, active: bool, age: u32, city: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            active,
            age,
            city: city.to_string(),
        }
    }
}

/// Small mixed fixture set: two Johns, one Jane, one inactive Jo.
pub(crate) fn customers() -> Vec<Customer> {
    vec![
        Customer::new(1, "John", true, 34, "Derry"),
        Customer::new(2, "Jane", true, 29, "Sligo"),
        Customer::new(3, "John", true, 51, "Sligo"),
        Customer::new(4, "Jo", false, 47, "Derry"),
    ]
}
