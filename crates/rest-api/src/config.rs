use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Address on which to listen.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Domain (host name) of this server.
    pub domain: String,
}

/// Default address (127.0.0.1:80).
fn default_address() -> SocketAddr {
    (Ipv4Addr::LOCALHOST, 80).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct File {
        server: Config,
    }

    #[test]
    fn address_defaults_to_port_80() {
        let cfg: File = serde_json::from_str(
            r#"{"server":{"domain":"example.com"}}"#).unwrap();

        assert_eq!(cfg.server.address, SocketAddr::from(([127, 0, 0, 1], 80)));
        assert_eq!(cfg.server.domain, "example.com");
    }
}
