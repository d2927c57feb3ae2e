use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub type PharmacyId = i64;

/// Upper bound on candidates returned by a pharmacy search
pub const DEFAULT_SEARCH_SIZE: usize = 10;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    #[serde(alias = "pharmacyId")]
    pub id: PharmacyId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub hospital_id: Option<i64>,
    #[serde(default)]
    pub hospital_name: Option<String>,
}

impl Pharmacy {
    /// A pharmacy known only by its identifier.
    pub fn with_id(id: PharmacyId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct PharmacySearch {
    pub keyword: String,
    pub size: usize,
}

/// Keyword search over pharmacy name and address
#[async_trait]
pub trait PharmacyDirectory: Send + Sync {
    async fn search_pharmacies(&self, search: &PharmacySearch) -> Result<Vec<Pharmacy>, Error>;
}
