use std::{net::Ipv4Addr, time::Duration};
use tokio::{net::TcpStream, time::timeout};

use crate::connection::{
    iso::{DisconnectMode, S7Types, TsapConfig},
    tcp::{connect, disconnect},
};
use crate::errors::Error;

// Default TCP Port
pub(crate) const TCP_PORT: u32 = 102;
// Default TCP timeout
pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(3);
/// Default timeout for receiving the response to an outstanding request.
pub(crate) const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(3000);
/// Default timeout for sending a request. Zero means "no timeout".
pub(crate) const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(0);

/// Standalone S7 connection
#[derive(Debug)]
pub struct S7Client {
    pub(crate) connection: TcpStream,
    s7_type: S7Types,
    tsap: TsapConfig,
    pub(crate) pdu_length: u16,
    pub(crate) pdu_number: u16,
    // The Max AMQ parameters define how many unacknowledged requests a PLC (Callee) is able to accept from a client (Caller).
    pub(crate) max_amq_caller: u16,
    pub(crate) max_amq_calle: u16,
    pub(crate) recv_timeout: Duration,
    pub(crate) send_timeout: Duration,
    closed: bool,
}

impl S7Client {
    /// Create new standalone connection to an S7 PLC
    ///```rust
    /// # tokio_test::block_on(async {
    /// use std::net::Ipv4Addr;
    /// use s7client::{S7Client, S7Types};
    ///
    /// // create single s7 client
    /// let mut client = S7Client::new(Ipv4Addr::new(192, 168, 10, 72), S7Types::S71200)
    ///          .await?;
    /// # Ok::<(), s7client::errors::Error>(())
    /// # });
    /// ```
    /// # Errors
    ///
    /// Will return `Error` if no connection could be established to the PLC.
    pub async fn new(ip: Ipv4Addr, s7_type: S7Types) -> Result<Self, Error> {
        let tsap = TsapConfig::for_s7_type(s7_type);
        Self::connect_with_tsap(ip, s7_type, tsap).await
    }

    /// Create a new connection, overriding the PLC's rack/slot instead of
    /// relying on the [`S7Types`] family default.
    ///```rust, ignore
    /// let mut client = S7Client::connect_rack_slot(ip, S7Types::S71500, 0, 3).await?;
    /// ```
    /// # Errors
    ///
    /// Will return `Error` if no connection could be established to the PLC.
    pub async fn connect_rack_slot(
        ip: Ipv4Addr,
        s7_type: S7Types,
        rack: u8,
        slot: u8,
    ) -> Result<Self, Error> {
        let tsap = TsapConfig::with_rack_slot(rack, slot);
        Self::connect_with_tsap(ip, s7_type, tsap).await
    }

    async fn connect_with_tsap(ip: Ipv4Addr, s7_type: S7Types, tsap: TsapConfig) -> Result<Self, Error> {
        let tcp_client = match timeout(
            CONNECTION_TIMEOUT,
            TcpStream::connect(format!("{ip}:{TCP_PORT}")),
        )
        .await
        {
            Ok(connection) => connection,
            Err(_err) => {
                return Err(Error::Connection(format!(
                    "Error on connecting to '{}:{}': Timed out after {} seconds",
                    ip,
                    TCP_PORT,
                    CONNECTION_TIMEOUT.as_secs()
                )))
            }
        }?;

        let mut client = Self {
            connection: tcp_client,
            s7_type,
            tsap,
            pdu_length: 0,
            pdu_number: 0,
            max_amq_caller: 0,
            max_amq_calle: 0,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            closed: true,
        };
        client.connect().await?;

        Ok(client)
    }

    /// Overrides the timeout applied while waiting for a response to an
    /// outstanding request (default 3000ms).
    pub fn set_recv_timeout(&mut self, recv_timeout: Duration) {
        self.recv_timeout = recv_timeout;
    }

    /// Overrides the timeout applied while sending a request. A zero
    /// duration (the default) means sends are never timed out.
    pub fn set_send_timeout(&mut self, send_timeout: Duration) {
        self.send_timeout = send_timeout;
    }

    /// Manually trigger negotiation of connection parameters
    ///
    /// This is not necessary as the parameters get checked before a request is send to the PLC
    /// # Errors
    ///
    /// Will return `Error` if no connection could be established to the PLC.
    pub async fn connect(&mut self) -> Result<(), Error> {
        let connection_parameters = connect(
            &mut self.connection,
            self.tsap,
            &mut self.pdu_number,
            self.send_timeout,
            self.recv_timeout,
        )
        .await?;

        self.pdu_length = connection_parameters.pdu_length;
        self.max_amq_caller = connection_parameters.max_amq_caller;
        self.max_amq_calle = connection_parameters.max_amq_calle;

        self.closed = false;

        Ok(())
    }

    /// Gracefully disconnect from the PLC, sending a COTP Disconnect Request.
    /// # Errors
    ///
    /// Will return `Error` if the connection to the PLC could not be closed gracefully.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        disconnect(&mut self.connection, DisconnectMode::Graceful).await?;
        self.closed = true;
        Ok(())
    }

    /// Tears down the TCP socket without attempting a COTP Disconnect
    /// handshake. Use this after a protocol error has already left the ISO
    /// connection in an unknown state.
    /// # Errors
    ///
    /// Will return `Error` if the socket could not be closed.
    pub async fn disconnect_tcp_only(&mut self) -> Result<(), Error> {
        disconnect(&mut self.connection, DisconnectMode::TcpOnly).await?;
        self.closed = true;
        Ok(())
    }

    pub(crate) async fn validate_connection_info(&mut self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Connection("Connection is closed".to_string()));
        }
        Ok(())
    }

    pub(crate) fn set_closed(&mut self) {
        self.closed = true;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

// impl Drop for S7Client {
//     fn drop(&mut self) {
//         // TODO implement drop for async
//         let _ = self.disconnect();
//     }
// }
