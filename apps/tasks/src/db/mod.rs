pub mod connection_provider;

pub use connection_provider::{ConnectionProvider, Connector, SqliteConnector};
