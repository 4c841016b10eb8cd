use super::streaming::StreamingTransport;
use crate::config::RequestConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{
    self, CryptoProvider, verify_tls12_signature, verify_tls13_signature,
};
use tokio_rustls::rustls::{
    self as tls, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};

// ==== Connector

/// Perform the TLS handshake over an established TCP connection
pub async fn connect(
    config: &RequestConfig,
    stream: TcpStream,
) -> io::Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(config.server_address())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        .to_owned();

    let connector = TlsConnector::from(Arc::new(client_config(config)?));

    connector.connect(server_name, stream).await
}

/// Build the client configuration.
///
/// With verification enabled the server certificate must chain up to a certificate from
/// the configured CA path, or to the bundled web PKI roots if there is none.
pub fn client_config(config: &RequestConfig) -> io::Result<ClientConfig> {
    let provider = Arc::new(crypto::ring::default_provider());

    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(io::Error::other)?;

    let client_config = if config.verify_tls() {
        builder
            .with_root_certificates(root_store(config.ca_path())?)
            .with_no_client_auth()
    } else {
        log::warn!("TLS certificate verification is disabled");

        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
            .with_no_client_auth()
    };

    Ok(client_config)
}

fn root_store(ca_path: Option<&Path>) -> io::Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    let Some(ca_path) = ca_path else {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        return Ok(roots);
    };

    for file in ca_files(ca_path)? {
        let certs = CertificateDer::pem_file_iter(&file).map_err(io::Error::other)?;

        for cert in certs {
            roots
                .add(cert.map_err(io::Error::other)?)
                .map_err(io::Error::other)?;
        }
    }

    if roots.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no CA certificates found in {}", ca_path.display()),
        ));
    }

    log::debug!("loaded {} CA certificates from {}", roots.len(), ca_path.display());

    Ok(roots)
}

/// A CA path is either a PEM file or a directory of them
fn ca_files(ca_path: &Path) -> io::Result<Vec<PathBuf>> {
    if !ca_path.is_dir() {
        return Ok(vec![ca_path.to_owned()]);
    }

    let mut files = Vec::new();

    for entry in fs::read_dir(ca_path)? {
        let path = entry?.path();

        let is_pem = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ["pem", "crt", "cer"].contains(&ext));

        if is_pem && path.is_file() {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// Accepts every server certificate, handshake signatures are still verified
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

// ==== Transport

impl StreamingTransport for TlsStream<TcpStream> {
    const NAME: &'static str = "TLS";

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.get_ref().0.local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.get_ref().0.peer_addr()
    }
}
