//! Typed per-resource service seam.
//!
//! Portals talk to a `ResourceService<R>` rather than to the client
//! directly, so tables can be driven by an in-memory fake in tests.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::PartyRegClient;
use crate::error::Error;
use crate::model::Resource;

/// CRUD over one resource collection.
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, Error>;

    async fn get(&self, id: i64) -> Result<R, Error>;

    async fn create(&self, payload: &R::Payload) -> Result<R, Error>;

    async fn update(&self, id: i64, payload: &R::Payload) -> Result<R, Error>;

    async fn delete(&self, id: i64) -> Result<(), Error>;
}

/// [`ResourceService`] backed by the REST API.
pub struct RestService<R> {
    client: PartyRegClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> RestService<R> {
    pub fn new(client: PartyRegClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &PartyRegClient {
        &self.client
    }
}

impl<R> Clone for RestService<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for RestService<R> {
    async fn list(&self) -> Result<Vec<R>, Error> {
        self.client.list_all::<R>().await
    }

    async fn get(&self, id: i64) -> Result<R, Error> {
        self.client.get::<R>(id).await
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, Error> {
        self.client.create::<R>(payload).await
    }

    async fn update(&self, id: i64, payload: &R::Payload) -> Result<R, Error> {
        self.client.update::<R>(id, payload).await
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        self.client.delete::<R>(id).await
    }
}
