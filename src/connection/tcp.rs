use bytes::{BufMut, BytesMut};
use std::convert::TryFrom;
use std::mem;
use std::time::Duration;
// use std::net::TcpStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::iso::{COTPConnection, COTPData, CoTp, FragmentBudget, IsoControlPDU, TTPKTHeader};
use crate::connection::iso::{COTPDisconnect, DisconnectMode, IsoDisconnect, TsapConfig};
use crate::errors::{Error, IsoError};
use crate::s7_protocol::header::S7ProtocolHeader;
use crate::s7_protocol::negotiate::{NegotiatePDUParameters, S7Negotiation};

pub(crate) async fn connect(
    tcp_client: &mut TcpStream,
    tsap: TsapConfig,
    seq: &mut u16,
    send_timeout: Duration,
    recv_timeout: Duration,
) -> Result<NegotiatePDUParameters, Error> {
    // send connection request
    let iso: Vec<u8> = IsoControlPDU::build(1024, tsap).into();
    tcp_client.write_all(&iso).await?;

    // Get response TTPKT Header
    let packet_header = read_tpkt_header(tcp_client).await?;
    let mut tpkt_data = read_tpkt_data(tcp_client, packet_header.length).await?;

    let cotp_connection = COTPConnection::try_from(&mut tpkt_data)?;
    cotp_connection.req_ok()?;

    negotiate_connection_params(tcp_client, seq, send_timeout, recv_timeout).await
}

/// Disconnects from the PLC. A [`DisconnectMode::TcpOnly`] mode skips the
/// COTP Disconnect Request handshake and only tears down the TCP socket —
/// appropriate when the peer is already known to have dropped the ISO
/// connection (e.g. after a prior protocol error).
pub(crate) async fn disconnect(tcp_client: &mut TcpStream, mode: DisconnectMode) -> Result<(), Error> {
    if !mode.needs_handshake() {
        return Ok(());
    }

    let iso: Vec<u8> = IsoDisconnect::build().into();
    tcp_client.write_all(&iso).await?;

    // Get response TTPKT Header
    let packet_header = read_tpkt_header(tcp_client).await?;
    let mut tpkt_data = read_tpkt_data(tcp_client, packet_header.length).await?;

    let cotp_disconnect = COTPDisconnect::try_from(&mut tpkt_data)?;
    cotp_disconnect.req_ok()?;
    Ok(())
}

pub(crate) async fn negotiate_connection_params(
    conn: &mut TcpStream,
    seq: &mut u16,
    send_timeout: Duration,
    recv_timeout: Duration,
) -> Result<NegotiatePDUParameters, Error> {
    let negotiation_params = BytesMut::from(S7Negotiation::build(seq)?);
    let mut exchanged_data =
        exchange_buffer(conn, negotiation_params, send_timeout, recv_timeout).await?;

    S7ProtocolHeader::try_from(&mut exchanged_data)?.is_ack_with_data()?;
    let params = NegotiatePDUParameters::try_from(&mut exchanged_data)?;
    Ok(params)
}

pub(crate) async fn send_buffer(conn: &mut TcpStream, data: BytesMut) -> Result<(), Error> {
    // Telegram length
    let iso_len = mem::size_of::<TTPKTHeader>()     // TPKT Header
                + mem::size_of::<COTPData>()        // COTP Header Size
                + data.len(); // S7 params
    let tpkt_header = TTPKTHeader::build(iso_len as u16);
    let cotp = COTPData::build();

    // construct data
    let mut bytes = BytesMut::new();
    // add TPKT Header
    bytes.put(BytesMut::from(tpkt_header));
    // add COTP Header
    bytes.put(BytesMut::from(cotp));
    // add data
    bytes.put(data);

    // send data to plc
    conn.write_all(&bytes).await?;

    Ok(())
}

pub(crate) async fn recv_buffer(conn: &mut TcpStream) -> Result<BytesMut, Error> {
    let mut bytes = BytesMut::new();
    let mut is_last: bool = false;
    let mut budget = FragmentBudget::default();

    // if not last wait for others till last
    while !is_last {
        let header = read_tpkt_header(conn).await?;
        let mut iso_cotp_data = read_tpkt_data(conn, header.length).await?;
        let cotp = COTPData::try_from(&mut iso_cotp_data)?;

        cotp.req_ok()?;
        budget.admit(iso_cotp_data.len())?;
        bytes.put(iso_cotp_data);
        is_last = cotp.is_last();
    }

    Ok(bytes)
}

/// Exchanges one request/response pair with the PLC, applying `send_timeout`
/// and `recv_timeout` independently. A zero `send_timeout` means the send is
/// not wrapped in a timeout at all.
pub(crate) async fn exchange_buffer(
    conn: &mut TcpStream,
    data: BytesMut,
    send_timeout: Duration,
    recv_timeout: Duration,
) -> Result<BytesMut, Error> {
    if send_timeout.is_zero() {
        send_buffer(conn, data).await?;
    } else {
        match timeout(send_timeout, send_buffer(conn, data)).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::DataExchangeTimedOut),
        }
    }

    // Receive data from PLC with timeout
    match timeout(recv_timeout, recv_buffer(conn)).await {
        Ok(data) => Ok(data?),
        Err(_) => Err(Error::DataExchangeTimedOut),
    }
}

async fn read_tpkt_header(conn: &mut TcpStream) -> Result<TTPKTHeader, Error> {
    // Get response TTPKT Header
    let mut data = BytesMut::with_capacity(mem::size_of::<TTPKTHeader>());
    conn.read_buf(&mut data).await?;
    TTPKTHeader::try_from(&mut data)
}

async fn read_tpkt_data(conn: &mut TcpStream, length: u16) -> Result<BytesMut, Error> {
    let mut data = BytesMut::with_capacity(length as usize - mem::size_of::<TTPKTHeader>());

    match conn.read_buf(&mut data).await {
        Ok(_) => Ok(data),
        Err(_) => Err(Error::ISOResponse(IsoError::InvalidDataSize)),
    }
}
