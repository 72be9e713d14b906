use crate::error::ControlPlaneError;
use async_trait::async_trait;

/// The operator's own serving certificate and private key, sourced
/// from the control-plane secret with keys `privateKey`/`cert`.
#[derive(Clone)]
pub struct ServingBundle {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for ServingBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServingBundle")
            .field("cert_pem_len", &self.cert_pem.len())
            .field("key_pem_len", &self.key_pem.len())
            .finish()
    }
}

/// Loads the operator's serving bundle and the CA bundle mirrored to
/// disk by the external TLS collaborator. Loaded once at process start
/// and treated as immutable for the process lifetime.
#[async_trait]
pub trait TlsBundleProvider: Send + Sync {
    async fn load_serving_bundle(&self) -> Result<ServingBundle, ControlPlaneError>;
    async fn load_ca_bundle(&self) -> Result<Vec<u8>, ControlPlaneError>;
}

/// Reads the serving bundle and CA bundle from a directory laid out as
/// `<dir>/tls.crt`, `<dir>/tls.key`, `<dir>/ca.crt` — the local mirror
/// the external TLS collaborator maintains.
pub struct FileTlsBundleProvider {
    pub dir: std::path::PathBuf,
}

#[async_trait]
impl TlsBundleProvider for FileTlsBundleProvider {
    async fn load_serving_bundle(&self) -> Result<ServingBundle, ControlPlaneError> {
        let cert_pem = tokio::fs::read(self.dir.join("tls.crt"))
            .await
            .map_err(ControlPlaneError::unavailable)?;
        let key_pem = tokio::fs::read(self.dir.join("tls.key"))
            .await
            .map_err(ControlPlaneError::unavailable)?;
        Ok(ServingBundle { cert_pem, key_pem })
    }

    async fn load_ca_bundle(&self) -> Result<Vec<u8>, ControlPlaneError> {
        tokio::fs::read(self.dir.join("ca.crt"))
            .await
            .map_err(ControlPlaneError::unavailable)
    }
}
