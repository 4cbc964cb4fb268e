//! Verb shorthands over [`HttpClient::request`].
//!
//! The `*_with` forms take a per-call descriptor carrying headers, query,
//! timeout, service key, or cancel id; the verb's method, URL, and body
//! override the descriptor's own.

use futures::future::BoxFuture;
use serde_json::Value;

use hookhttp_core::result::HttpResult;
use hookhttp_core::types::{HttpResponse, Method, RequestDescriptor};

use crate::client::HttpClient;

type Pending = BoxFuture<'static, HttpResult<HttpResponse>>;

fn merge(
    method: Method,
    url: String,
    body: Option<Value>,
    options: RequestDescriptor,
) -> RequestDescriptor {
    RequestDescriptor {
        method,
        url,
        body: body.or(options.body),
        ..options
    }
}

impl HttpClient {
    /// Issues a `GET`.
    pub fn get(&self, url: impl Into<String>) -> Pending {
        self.get_with(url, RequestDescriptor::default())
    }

    /// Issues a `GET` with per-call options.
    pub fn get_with(&self, url: impl Into<String>, options: RequestDescriptor) -> Pending {
        self.request(merge(Method::Get, url.into(), None, options))
    }

    /// Issues a `DELETE`.
    pub fn delete(&self, url: impl Into<String>) -> Pending {
        self.delete_with(url, RequestDescriptor::default())
    }

    /// Issues a `DELETE` with per-call options.
    pub fn delete_with(&self, url: impl Into<String>, options: RequestDescriptor) -> Pending {
        self.request(merge(Method::Delete, url.into(), None, options))
    }

    /// Issues a `POST` with a JSON body.
    pub fn post(&self, url: impl Into<String>, body: Value) -> Pending {
        self.post_with(url, body, RequestDescriptor::default())
    }

    /// Issues a `POST` with a JSON body and per-call options.
    pub fn post_with(
        &self,
        url: impl Into<String>,
        body: Value,
        options: RequestDescriptor,
    ) -> Pending {
        self.request(merge(Method::Post, url.into(), Some(body), options))
    }

    /// Issues a `PUT` with a JSON body.
    pub fn put(&self, url: impl Into<String>, body: Value) -> Pending {
        self.put_with(url, body, RequestDescriptor::default())
    }

    /// Issues a `PUT` with a JSON body and per-call options.
    pub fn put_with(
        &self,
        url: impl Into<String>,
        body: Value,
        options: RequestDescriptor,
    ) -> Pending {
        self.request(merge(Method::Put, url.into(), Some(body), options))
    }

    /// Issues a `PATCH` with a JSON body.
    pub fn patch(&self, url: impl Into<String>, body: Value) -> Pending {
        self.patch_with(url, body, RequestDescriptor::default())
    }

    /// Issues a `PATCH` with a JSON body and per-call options.
    pub fn patch_with(
        &self,
        url: impl Into<String>,
        body: Value,
        options: RequestDescriptor,
    ) -> Pending {
        self.request(merge(Method::Patch, url.into(), Some(body), options))
    }
}
