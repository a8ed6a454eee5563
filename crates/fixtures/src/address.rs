//! Demo addresses shipped with a fresh shop install

use serde::{Deserialize, Serialize};

/// An address record as displayed in the back-office addresses grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub second_address: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
    pub phone: String,
}

impl Address {
    /// Customer address in Paris
    pub fn first() -> Self {
        Self {
            id: "3".to_string(),
            first_name: "John".to_string(),
            last_name: "DOE".to_string(),
            company: "My Company".to_string(),
            address: "16, Main street".to_string(),
            second_address: "2nd floor".to_string(),
            zip_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
            phone: "0102030405".to_string(),
        }
    }

    /// Customer address in Miami
    pub fn second() -> Self {
        Self {
            id: "4".to_string(),
            first_name: "Jane".to_string(),
            last_name: "DOE".to_string(),
            company: "My Company".to_string(),
            address: "16, Main street".to_string(),
            second_address: "2nd floor".to_string(),
            zip_code: "33133".to_string(),
            city: "Miami".to_string(),
            country: "United States".to_string(),
            phone: "0102030405".to_string(),
        }
    }

    /// Supplier address
    pub fn third() -> Self {
        Self {
            id: "5".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            company: "Accessories supplier".to_string(),
            address: "767 Fifth Ave.".to_string(),
            second_address: String::new(),
            zip_code: "10153".to_string(),
            city: "New York".to_string(),
            country: "United States".to_string(),
            phone: "(212) 336-1440".to_string(),
        }
    }

    /// All demo addresses, in id order
    pub fn demo() -> Vec<Self> {
        vec![Self::first(), Self::second(), Self::third()]
    }

    /// Value displayed in a grid column, keyed by the grid's column id
    pub fn column(&self, column: &str) -> Option<&str> {
        let value = match column {
            "id_address" => &self.id,
            "firstname" => &self.first_name,
            "lastname" => &self.last_name,
            "address1" => &self.address,
            "postcode" => &self.zip_code,
            "city" => &self.city,
            "country_name" | "id_country" => &self.country,
            _ => return None,
        };
        Some(value.as_str())
    }
}
