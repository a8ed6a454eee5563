//! Import sample files offered on the back-office import page
//!
//! Each sample file starts with a semicolon-delimited header line that
//! documents the columns the importer expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFileKind {
    CategoriesImport,
    ProductsImport,
    CombinationsImport,
    CustomersImport,
    AddressesImport,
    ManufacturersImport,
    SuppliersImport,
    AliasImport,
    StoreContacts,
}

impl SampleFileKind {
    pub const ALL: [SampleFileKind; 9] = [
        SampleFileKind::CategoriesImport,
        SampleFileKind::ProductsImport,
        SampleFileKind::CombinationsImport,
        SampleFileKind::CustomersImport,
        SampleFileKind::AddressesImport,
        SampleFileKind::ManufacturersImport,
        SampleFileKind::SuppliersImport,
        SampleFileKind::AliasImport,
        SampleFileKind::StoreContacts,
    ];

    /// Type key used by the import page to identify the file
    pub fn type_key(&self) -> &'static str {
        match self {
            SampleFileKind::CategoriesImport => "categories_import",
            SampleFileKind::ProductsImport => "products_import",
            SampleFileKind::CombinationsImport => "combinations_import",
            SampleFileKind::CustomersImport => "customers_import",
            SampleFileKind::AddressesImport => "addresses_import",
            SampleFileKind::ManufacturersImport => "manufacturers_import",
            SampleFileKind::SuppliersImport => "suppliers_import",
            SampleFileKind::AliasImport => "alias_import",
            SampleFileKind::StoreContacts => "store_contacts",
        }
    }

    /// Literal prefix of the header line the downloaded file must contain
    pub fn expected_header(&self) -> &'static str {
        match self {
            SampleFileKind::CategoriesImport => concat!(
                "Category ID;Active (0/1);Name *;Parent category;Root category (0/1);Description;Meta title;",
                "Meta keywords;Meta description;URL rewritten;Image URL",
            ),
            SampleFileKind::ProductsImport => concat!(
                "Product ID;Active (0/1);Name *;Categories (x,y,z...);Price tax excluded;Tax rules ID;",
                "Wholesale price;On sale (0/1);Discount amount;Discount percent;Discount from (yyyy-mm-dd);",
                "Discount to (yyyy-mm-dd);Reference #;Supplier reference #;Supplier;Manufacturer;EAN13;UPC;Ecotax;",
                "Width;Height;Depth;Weight;Delivery time of in-stock products;",
                "Delivery time of out-of-stock products with allowed",
            ),
            SampleFileKind::CombinationsImport => concat!(
                "Product ID*;Attribute (Name:Type:Position)*;Value (Value:Position)*;",
                "Supplier reference;Reference;EAN13;UPC;Wholesale price;Impact on price;Ecotax;Quantity;",
                "Minimal quantity;Low stock level;Impact on",
            ),
            SampleFileKind::CustomersImport => concat!(
                "Customer ID;Active (0/1);Titles ID (Mr = 1, Ms = 2, else 0);Email *;",
                "Password *;Birthday (yyyy-mm-dd);Last Name *;First Name *;Newsletter (0/1);Opt-in (0/1);",
                "Registration date (yyyy-mm-dd);Groups",
            ),
            SampleFileKind::AddressesImport => concat!(
                "Address ID;Alias*;Active (0/1);Customer e-mail*;Customer ID;",
                "Manufacturer;Supplier;Company;Lastname*;Firstname*;Address 1*;Address 2;Zipcode*;City*;",
                "Country*;State;Other;Phone;Mobile Phone;VAT number;DNI",
            ),
            SampleFileKind::ManufacturersImport => concat!(
                "Manufacturer ID;Active (0/1);Name *;Description;Short description;",
                "Meta title;Meta keywords;Meta description;Image URL",
            ),
            SampleFileKind::SuppliersImport => concat!(
                "Supplier ID;Active (0/1);Name *;Description;Short description;Meta title;",
                "Meta keywords;Meta description;Image URL",
            ),
            SampleFileKind::AliasImport => "Alias ID;Alias *;Search *;Active (0/1)",
            SampleFileKind::StoreContacts => concat!(
                "Store ID;active;name;address1;address2;postcode;state;city;country;latitude;",
                "longitude;phone;fax;email;note;hours;image",
            ),
        }
    }

    /// Column names documented by the header, in order
    pub fn expected_columns(&self) -> Vec<&'static str> {
        self.expected_header().split(';').collect()
    }
}

impl fmt::Display for SampleFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_key())
    }
}

impl FromStr for SampleFileKind {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_key() == s)
            .ok_or_else(|| FixtureError::UnknownSampleFile(s.to_string()))
    }
}
