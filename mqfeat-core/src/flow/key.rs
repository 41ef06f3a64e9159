use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::events::{TransportMeta, TransportProtocol};

/// Directional 4-tuple identifying a flow.
///
/// Client-to-broker and broker-to-client traffic of one session are separate
/// flows with separate timing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowKey {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FlowKey {
    /// Derives the key of a TCP segment; anything else has no flow.
    pub fn from_transport(meta: &TransportMeta) -> Option<Self> {
        match meta.protocol {
            TransportProtocol::Tcp => Some(Self {
                src: meta.src,
                dst: meta.dst,
                src_port: meta.src_port,
                dst_port: meta.dst_port,
            }),
            _ => None,
        }
    }
}

fn write_endpoint(f: &mut fmt::Formatter<'_>, ip: IpAddr, port: u16) -> fmt::Result {
    match ip {
        IpAddr::V4(v4) => write!(f, "{v4}:{port}"),
        IpAddr::V6(v6) => write!(f, "[{v6}]:{port}"),
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_endpoint(f, self.src, self.src_port)?;
        f.write_str(" -> ")?;
        write_endpoint(f, self.dst, self.dst_port)
    }
}
