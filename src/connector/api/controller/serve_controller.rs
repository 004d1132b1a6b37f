use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;

use crate::connector::web::{self, WebState};

use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn serve(&self, port: u16, public: bool) -> Result<String> {
        let state = Arc::new(WebState::new(self.container.single_prompt_use_case()));
        web::serve(state, bind_address(port, public)).await?;
        Ok(String::new())
    }
}

fn bind_address(port: u16, public: bool) -> SocketAddr {
    let ip = if public {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    } else {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    };
    SocketAddr::new(ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_loopback_unless_public() {
        assert_eq!(bind_address(8000, false).to_string(), "127.0.0.1:8000");
        assert_eq!(bind_address(8000, true).to_string(), "0.0.0.0:8000");
    }
}
