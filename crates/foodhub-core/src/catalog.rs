use crate::{Error, IndexSpec, Result};

use std::fmt;

/// The collections the food-delivery application stores its documents in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Restaurants,
    Orders,
    Payments,
    Vouchers,
    Reviews,
    Cart,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Restaurants,
        Collection::Orders,
        Collection::Payments,
        Collection::Vouchers,
        Collection::Reviews,
        Collection::Cart,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Restaurants => "restaurants",
            Collection::Orders => "orders",
            Collection::Payments => "payments",
            Collection::Vouchers => "vouchers",
            Collection::Reviews => "reviews",
            Collection::Cart => "cart",
        }
    }

    pub fn from_name(name: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AsRef<str> for Collection {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl From<Collection> for String {
    fn from(collection: Collection) -> String {
        collection.name().to_string()
    }
}

/// The fixed, ordered list of indexes the application depends on.
///
/// Catalog order is the provisioning order, so logs and reports are
/// deterministic.
#[derive(Debug, Clone)]
pub struct IndexCatalog {
    specs: Vec<IndexSpec>,
}

impl IndexCatalog {
    /// Builds a catalog, validating every spec and rejecting two entries that
    /// declare the same key sequence on the same collection.
    pub fn new(specs: impl IntoIterator<Item = IndexSpec>) -> Result<Self> {
        let specs: Vec<_> = specs.into_iter().collect();

        for (i, spec) in specs.iter().enumerate() {
            spec.validate()
                .map_err(|err| err.context(crate::err!("catalog entry #{}", i + 1)))?;

            if let Some(prev) = specs[..i]
                .iter()
                .find(|prev| prev.collection == spec.collection && prev.matches_keys(&spec.fields))
            {
                return Err(Error::invalid_catalog(format!(
                    "`{spec}` repeats the key sequence of `{prev}`"
                )));
            }
        }

        Ok(Self { specs })
    }

    /// The indexes of the food-delivery application.
    pub fn food_delivery() -> Self {
        use Collection::*;

        let specs = vec![
            // users
            IndexSpec::new(Users).asc("email").unique(),
            // restaurants
            IndexSpec::new(Restaurants).asc("name").asc("address").unique(),
            IndexSpec::new(Restaurants).text("name"),
            IndexSpec::new(Restaurants).asc("menu.items.name"),
            // orders
            IndexSpec::new(Orders).asc("userId"),
            IndexSpec::new(Orders).asc("restaurantId"),
            IndexSpec::new(Orders).asc("shipperId"),
            IndexSpec::new(Orders).asc("status"),
            IndexSpec::new(Orders).asc("userId").desc("createdAt"),
            IndexSpec::new(Orders).asc("restaurantId").desc("createdAt"),
            IndexSpec::new(Orders).asc("shipperId").desc("createdAt"),
            IndexSpec::new(Orders).asc("status").desc("createdAt"),
            // payments
            IndexSpec::new(Payments).asc("orderId"),
            IndexSpec::new(Payments).asc("userId"),
            IndexSpec::new(Payments).asc("status"),
            IndexSpec::new(Payments).asc("userId").desc("createdAt"),
            // vouchers
            IndexSpec::new(Vouchers).asc("code").unique(),
            IndexSpec::new(Vouchers).asc("active"),
            IndexSpec::new(Vouchers).asc("restaurantId"),
            // reviews
            IndexSpec::new(Reviews).asc("orderId").unique(),
            IndexSpec::new(Reviews).asc("userId"),
            IndexSpec::new(Reviews).asc("restaurantId"),
            IndexSpec::new(Reviews).asc("restaurantId").desc("createdAt"),
            IndexSpec::new(Reviews).asc("userId").desc("createdAt"),
            // cart: one cart per user
            IndexSpec::new(Cart).asc("userId").unique(),
        ];

        Self { specs }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexSpec> {
        self.specs.iter()
    }

    /// Entries targeting `collection`, in catalog order.
    pub fn for_collection<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a IndexSpec> + 'a {
        self.specs.iter().filter(move |spec| spec.collection == collection)
    }
}

impl<'a> IntoIterator for &'a IndexCatalog {
    type Item = &'a IndexSpec;
    type IntoIter = std::slice::Iter<'a, IndexSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
