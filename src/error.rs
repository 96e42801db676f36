//! Fatal startup and serving errors for the `winboxget` binary.

use derive_more::{Display, Error};
use std::net::SocketAddr;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    /// The upstream HTTP client could not be built.
    #[display("could not set up the HTTP client")]
    Http,
    #[display("could not compile the index page")]
    Render,
    #[display("could not listen on {_0}")]
    Bind(#[error(not(source))] SocketAddr),
    #[display("server error")]
    Serve,
}
