//! Create, Read, Update, Delete over the top-level collections.
//!
//! # Example
//!
//! ```ignore
//! use partyreg_lib::model::{Student, StudentPayload};
//!
//! let students: Vec<Student> = client.list_all().await?;
//! let created = client.create::<Student>(&payload).await?;
//! client.delete::<Student>(created.id).await?;
//! ```

use reqwest::Method;

use crate::PartyRegClient;
use crate::error::Error;
use crate::model::Resource;
use crate::page::PageRequest;
use crate::page::PaginatedResponse;
use crate::page::Pages;

impl PartyRegClient {
    /// `GET /<r>?page_number=&page_size=`
    pub async fn list_page<R: Resource>(&self, page: PageRequest) -> Result<PaginatedResponse<R>, Error> {
        let url = self.endpoint(&[R::PATH], &page.query())?;
        self.get_json(url).await
    }

    /// Walks every page of a collection.
    pub fn pages<R: Resource>(&self, page_size: u32) -> Pages<R> {
        Pages::new(self.clone(), page_size)
    }

    /// Every row of a collection.
    pub async fn list_all<R: Resource>(&self) -> Result<Vec<R>, Error> {
        self.pages::<R>(PageRequest::DEFAULT_SIZE).collect_all().await
    }

    /// `GET /<r>/{id}`
    pub async fn get<R: Resource>(&self, id: i64) -> Result<R, Error> {
        let url = self.endpoint(&[R::PATH, &id.to_string()], &[])?;
        self.get_json(url).await
    }

    /// `POST /<r>`
    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R, Error> {
        let url = self.endpoint(&[R::PATH], &[])?;
        self.send_json(Method::POST, url, payload).await
    }

    /// `PUT /<r>/{id}`
    pub async fn update<R: Resource>(&self, id: i64, payload: &R::Payload) -> Result<R, Error> {
        let url = self.endpoint(&[R::PATH, &id.to_string()], &[])?;
        self.send_json(Method::PUT, url, payload).await
    }

    /// `DELETE /<r>/{id}`. Any response body is ignored.
    pub async fn delete<R: Resource>(&self, id: i64) -> Result<(), Error> {
        let url = self.endpoint(&[R::PATH, &id.to_string()], &[])?;
        self.send(Method::DELETE, url, None).await?;
        log::info!("deleted {} {id}", R::NAME);
        Ok(())
    }
}
