//! Domain collaborator traits over the REST surface

use async_trait::async_trait;
use domain::{
    pharmacies::{Pharmacy, PharmacyDirectory, PharmacyId, PharmacySearch},
    prescriptions::{
        DispatchInput, DispatchResponse, Prescription, PrescriptionApi, PrescriptionId,
        PrescriptionStatus, PrescriptionSummary, StatusUpdate, StatusUpdateInput,
    },
    records::{MedicalRecord, MedicalRecordService, NewMedicalRecord},
    Error,
};
use serde::Deserialize;

use crate::{ClientConfig, ClientResult, HttpClient};

/// Collection responses come back either bare or wrapped in a page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Items(Vec<T>),
    Page { content: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Items(items) | Listing::Page { content: items } => items,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::from_http(HttpClient::new(config)?))
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl PrescriptionApi for ApiClient {
    async fn list_prescriptions(&self) -> Result<Vec<PrescriptionSummary>, Error> {
        let listing: Listing<PrescriptionSummary> = self.http.get("/prescriptions").await?;
        Ok(listing.into_vec())
    }

    async fn get_prescription(&self, id: PrescriptionId) -> Result<Prescription, Error> {
        Ok(self.http.get(&format!("/prescriptions/{}", id)).await?)
    }

    async fn update_status(
        &self,
        id: PrescriptionId,
        status: PrescriptionStatus,
    ) -> Result<StatusUpdate, Error> {
        let body = StatusUpdateInput { status };
        Ok(self
            .http
            .patch(&format!("/prescriptions/{}/status", id), &body)
            .await?)
    }

    async fn dispatch(
        &self,
        id: PrescriptionId,
        pharmacy_id: PharmacyId,
    ) -> Result<DispatchResponse, Error> {
        let body = DispatchInput { pharmacy_id };
        let text = self
            .http
            .post_text(&format!("/prescriptions/{}/dispatch", id), &body)
            .await?;
        Ok(DispatchResponse::from_body(&text))
    }
}

#[async_trait]
impl PharmacyDirectory for ApiClient {
    async fn search_pharmacies(&self, search: &PharmacySearch) -> Result<Vec<Pharmacy>, Error> {
        let size = search.size.to_string();
        let query = [("keyword", search.keyword.as_str()), ("size", size.as_str())];

        let listing: Listing<Pharmacy> = self.http.get_with_query("/pharmacies", &query).await?;
        let mut pharmacies = listing.into_vec();
        pharmacies.truncate(search.size);
        Ok(pharmacies)
    }
}

#[async_trait]
impl MedicalRecordService for ApiClient {
    async fn list_records(&self) -> Result<Vec<MedicalRecord>, Error> {
        let listing: Listing<MedicalRecord> = self.http.get("/medical-records").await?;
        Ok(listing.into_vec())
    }

    async fn create_record(&self, record: &NewMedicalRecord) -> Result<MedicalRecord, Error> {
        record.validate()?;
        Ok(self.http.post("/medical-records", record).await?)
    }
}
