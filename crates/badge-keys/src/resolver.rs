use std::sync::Arc;

use async_trait::async_trait;
use badge_core::Did;
use dashmap::DashSet;

use crate::document::DidDocument;
use crate::error::KeyStoreError;
use crate::store::KeyStore;

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID URI to its DID Document.
    async fn resolve(&self, did: &str) -> Result<DidDocument, KeyStoreError>;
}

/// Resolves the key store's own `did:web` identifier.
pub struct LocalDidResolver {
    store: Arc<KeyStore>,
}

impl LocalDidResolver {
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DidResolver for LocalDidResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, KeyStoreError> {
        let did = Did::parse(did)?;
        if &did != self.store.did() {
            return Err(KeyStoreError::ForeignDid {
                expected: self.store.did().to_string(),
                actual: did.to_string(),
            });
        }
        Ok(self.store.did_document())
    }
}

/// Decides whether a credential issuer is known.
///
/// `Ok(false)` means the issuer was looked up and is unknown; `Err` means
/// the lookup itself failed.
#[async_trait]
pub trait IssuerResolver: Send + Sync {
    async fn resolve(&self, issuer_id: &str) -> Result<bool, KeyStoreError>;
}

/// Resolves issuers against a local DID resolver. An issuer is known when
/// its DID document lists at least one verification method.
pub struct LocalIssuerResolver {
    resolver: Arc<dyn DidResolver>,
}

impl LocalIssuerResolver {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve issuers against the key store's own DID.
    pub fn for_store(store: Arc<KeyStore>) -> Self {
        Self::new(Arc::new(LocalDidResolver::new(store)))
    }
}

#[async_trait]
impl IssuerResolver for LocalIssuerResolver {
    async fn resolve(&self, issuer_id: &str) -> Result<bool, KeyStoreError> {
        if Did::parse(issuer_id).is_err() {
            return Ok(false);
        }
        match self.resolver.resolve(issuer_id).await {
            Ok(doc) => Ok(!doc.verification_method.is_empty()),
            Err(KeyStoreError::ForeignDid { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Issuer identifiers trusted by configuration.
#[derive(Default)]
pub struct TrustedIssuerRegistry {
    issuers: DashSet<String>,
}

impl TrustedIssuerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of issuer identifiers.
    pub fn from_issuers<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for issuer in issuers {
            registry.add(issuer);
        }
        registry
    }

    pub fn add(&self, issuer: impl Into<String>) {
        let issuer = issuer.into();
        tracing::info!(issuer = %issuer, "trusted issuer added");
        self.issuers.insert(issuer);
    }

    /// Remove an issuer. Returns whether it was present.
    pub fn remove(&self, issuer: &str) -> bool {
        self.issuers.remove(issuer).is_some()
    }

    pub fn contains(&self, issuer: &str) -> bool {
        self.issuers.contains(issuer)
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

#[async_trait]
impl IssuerResolver for TrustedIssuerRegistry {
    async fn resolve(&self, issuer_id: &str) -> Result<bool, KeyStoreError> {
        Ok(self.contains(issuer_id))
    }
}

/// Tries several issuer resolvers in order.
///
/// The first positive answer wins. If none is positive, a failing resolver's
/// error is returned when one failed, otherwise `Ok(false)`.
#[derive(Default)]
pub struct CompositeIssuerResolver {
    resolvers: Vec<Arc<dyn IssuerResolver>>,
}

impl CompositeIssuerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolver to the chain.
    pub fn add_resolver(&mut self, resolver: Arc<dyn IssuerResolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of registered resolvers.
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

#[async_trait]
impl IssuerResolver for CompositeIssuerResolver {
    async fn resolve(&self, issuer_id: &str) -> Result<bool, KeyStoreError> {
        let mut last_error = None;

        for resolver in &self.resolvers {
            match resolver.resolve(issuer_id).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(issuer = issuer_id, error = %e, "issuer resolver failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(false),
        }
    }
}
