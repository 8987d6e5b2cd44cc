use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::{errors::Error, S7Client, S7Types};

pub(crate) struct S7PoolManager {
    s7_ip: Ipv4Addr,
    s7_type: S7Types,
    rack_slot: Option<(u8, u8)>,
}

#[async_trait]
impl bb8::ManageConnection for S7PoolManager {
    type Connection = S7Client;
    type Error = Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        match self.rack_slot {
            Some((rack, slot)) => {
                Ok(S7Client::connect_rack_slot(self.s7_ip, self.s7_type, rack, slot).await?)
            }
            None => Ok(S7Client::new(self.s7_ip, self.s7_type).await?),
        }
    }

    async fn is_valid(&self, _connection: &mut Self::Connection) -> Result<(), Self::Error> {
        Ok(())
    }

    fn has_broken(&self, connection: &mut Self::Connection) -> bool {
        connection.is_closed()
    }
}

type S7PooledConnection = bb8::Pool<S7PoolManager>;

/// Pooled connection to a PLC device from the S7 family.
///
/// Hands out one exclusive `S7Client` per checked-out flow; the underlying
/// `bb8` pool serializes access to each connection so request/response pairs
/// are never interleaved on the wire.
#[allow(missing_debug_implementations)]
#[derive(Clone)]
pub struct S7Pool(pub(crate) S7PooledConnection);

impl S7Pool {
    /// Create new pooled connection to an S7 PLC
    ///```rust
    /// # tokio_test::block_on(async {
    /// use std::net::Ipv4Addr;
    /// use s7client::{S7Pool, S7Types};
    ///
    /// // create S7 pool
    /// let mut pool = S7Pool::new(Ipv4Addr::new(127, 0, 0, 1), S7Types::S71200)?;
    /// # Ok::<(), s7client::errors::Error>(())
    /// # });
    /// ```
    /// # Errors
    ///
    /// Will return `Error` if the `Pool` could not be created.
    pub fn new(ip: Ipv4Addr, s7_type: S7Types) -> Result<Self, Error> {
        let mgr = S7PoolManager { s7_ip: ip, s7_type, rack_slot: None };
        let pool = S7PooledConnection::builder()
            .max_size(3)
            .build_unchecked(mgr);

        Ok(S7Pool(pool))
    }

    /// Create a new pooled connection, overriding the PLC's rack/slot instead
    /// of relying on the [`S7Types`] family default.
    /// # Errors
    ///
    /// Will return `Error` if the `Pool` could not be created.
    pub fn connect_rack_slot(ip: Ipv4Addr, s7_type: S7Types, rack: u8, slot: u8) -> Result<Self, Error> {
        let mgr = S7PoolManager { s7_ip: ip, s7_type, rack_slot: Some((rack, slot)) };
        let pool = S7PooledConnection::builder()
            .max_size(3)
            .build_unchecked(mgr);

        Ok(S7Pool(pool))
    }
}
