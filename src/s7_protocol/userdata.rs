//! USERDATA telegrams: block catalog listing, System Status List (SZL)
//! reads (with multi-telegram continuation), and PLC run-state control.
//!
//! These PDUs share the S7 message header with READ/WRITE AREA but carry
//! a different parameter block (`UserDataParams`) addressed by a
//! type/group/subfunction triple instead of an S7-ANY item.

use std::convert::TryFrom;

use bytes::{Buf, BufMut, BytesMut};

use super::header::S7ProtocolHeader;
use crate::client::create::S7Client;
use crate::connection::tcp::exchange_buffer;
use crate::errors::{Error, S7ProtocolError};

const PARAM_HEAD: [u8; 3] = [0x00, 0x01, 0x12];
const TYPE_GROUP_CPU: u8 = 0x11;
const SUBFUNC_LIST_BLOCKS: u8 = 0x43;
const SUBFUNC_READ_SZL: u8 = 0x44;

const PLC_CONTROL_PIECE: &[u8] = b"P_PROGRAM";
const FN_PLC_START: u8 = 0x28;
const FN_PLC_STOP: u8 = 0x29;

// Each block-list entry is `{indicator, block_type, count:u16}`; only entries
// whose indicator marks them as a block-type count are accumulated.
const BLOCK_LIST_INDICATOR: u8 = 0x30;
const BLOCK_TYPE_OB: u8 = 0x38;
const BLOCK_TYPE_DB: u8 = 0x41;
const BLOCK_TYPE_SDB: u8 = 0x42;
const BLOCK_TYPE_FC: u8 = 0x43;
const BLOCK_TYPE_SFC: u8 = 0x44;
const BLOCK_TYPE_FB: u8 = 0x45;
const BLOCK_TYPE_SFB: u8 = 0x46;

#[derive(Debug)]
struct UserDataParams {
    subfunction: u8,
    sequence_number: u8,
    data_unit_reference: u8,
}

impl UserDataParams {
    fn len() -> usize {
        8
    }
}

impl From<UserDataParams> for BytesMut {
    fn from(params: UserDataParams) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(UserDataParams::len());
        bytes.put_slice(&PARAM_HEAD);
        bytes.put_u8(4); // length of the four fields that follow
        bytes.put_u8(TYPE_GROUP_CPU);
        bytes.put_u8(params.subfunction);
        bytes.put_u8(params.sequence_number);
        bytes.put_u8(params.data_unit_reference);
        bytes
    }
}

impl TryFrom<&mut BytesMut> for UserDataParams {
    type Error = Error;

    fn try_from(bytes: &mut BytesMut) -> Result<Self, Self::Error> {
        if bytes.len() < Self::len() {
            return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
        }
        let _head = [bytes.get_u8(), bytes.get_u8(), bytes.get_u8()];
        let _len = bytes.get_u8();
        let _type_and_group = bytes.get_u8();
        let subfunction = bytes.get_u8();
        let sequence_number = bytes.get_u8();
        let data_unit_reference = bytes.get_u8();
        Ok(Self { subfunction, sequence_number, data_unit_reference })
    }
}

async fn exchange_userdata(
    client: &mut S7Client,
    params: UserDataParams,
    data: Vec<u8>,
) -> Result<(BytesMut, UserDataParams), Error> {
    let params_bytes = BytesMut::from(params);
    let mut data_bytes = BytesMut::new();
    data_bytes.put_slice(&data);

    let header = S7ProtocolHeader::build_userdata_request(
        &mut client.pdu_number,
        params_bytes.len(),
        data_bytes.len(),
    )?;

    let mut bytes = BytesMut::new();
    bytes.put(BytesMut::from(header));
    bytes.put(params_bytes);
    bytes.put(data_bytes);

    let mut response =
        exchange_buffer(&mut client.connection, bytes, client.send_timeout, client.recv_timeout)
            .await?;

    let resp_header = S7ProtocolHeader::try_from(&mut response)?;
    resp_header
        .is_ack_with_data()?
        .is_current_pdu_response(client.pdu_number)?;

    if resp_header.has_error() {
        let (class, code) = resp_header.get_errors();
        return Err(Error::S7ProtocolError(S7ProtocolError::from_codes(class, code)));
    }

    let resp_params = UserDataParams::try_from(&mut response)?;
    Ok((response, resp_params))
}

/// Counts of blocks of each kind present in the PLC's program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockCounts {
    /// Organization blocks
    pub ob: u16,
    /// Function blocks
    pub fb: u16,
    /// Functions
    pub fc: u16,
    /// Data blocks
    pub db: u16,
    /// System data blocks
    pub sdb: u16,
    /// System functions
    pub sfc: u16,
    /// System function blocks
    pub sfb: u16,
}

pub(crate) async fn list_blocks(client: &mut S7Client) -> Result<BlockCounts, Error> {
    let params = UserDataParams {
        subfunction: SUBFUNC_LIST_BLOCKS,
        sequence_number: 1,
        data_unit_reference: 0,
    };
    // Request data item: return_code(0xFF) + transport_size(0x09) + length(0x0000)
    let (mut response, _) = exchange_userdata(client, params, vec![0xFF, 0x09, 0x00, 0x00]).await?;

    if response.len() < 4 {
        return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
    }
    let _return_code = response.get_u8();
    let _transport_size = response.get_u8();
    let data_length = response.get_u16() as usize;
    if response.len() < data_length {
        return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
    }

    let mut counts = BlockCounts::default();
    for _ in 0..(data_length / 4) {
        let indicator = response.get_u8();
        let block_type = response.get_u8();
        let count = response.get_u16();
        if indicator != BLOCK_LIST_INDICATOR {
            continue;
        }
        match block_type {
            BLOCK_TYPE_OB => counts.ob = count,
            BLOCK_TYPE_DB => counts.db = count,
            BLOCK_TYPE_SDB => counts.sdb = count,
            BLOCK_TYPE_FC => counts.fc = count,
            BLOCK_TYPE_SFC => counts.sfc = count,
            BLOCK_TYPE_FB => counts.fb = count,
            BLOCK_TYPE_SFB => counts.sfb = count,
            _ => {}
        }
    }

    Ok(counts)
}

/// Reads one System Status List entry, transparently following the PLC's
/// "more follows" continuation across multiple USERDATA telegrams.
pub(crate) async fn read_szl(client: &mut S7Client, id: u16, index: u16) -> Result<Vec<u8>, Error> {
    let mut collected = Vec::new();
    let mut sequence_number: u8 = 1;
    let mut data_unit_reference: u8 = 0;
    let mut first = true;

    loop {
        let params = UserDataParams {
            subfunction: SUBFUNC_READ_SZL,
            sequence_number,
            data_unit_reference,
        };

        let mut data = vec![0xFF, 0x09, 0x00, 0x04];
        if first {
            data.extend_from_slice(&id.to_be_bytes());
            data.extend_from_slice(&index.to_be_bytes());
        } else {
            data.extend_from_slice(&[0, 0, 0, 0]);
        }

        let (mut response, resp_params) = exchange_userdata(client, params, data).await?;

        if response.len() < 4 {
            return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
        }
        let _return_code = response.get_u8();
        let _transport_size = response.get_u8();
        let data_length = response.get_u16() as usize;
        let more_follows = data_length > 0 && response.len() > data_length;

        let chunk_len = data_length.min(response.len());
        collected.extend_from_slice(&response[..chunk_len]);
        response.advance(chunk_len);

        data_unit_reference = resp_params.data_unit_reference;
        sequence_number = sequence_number.wrapping_add(1);
        first = false;

        if !more_follows || data_unit_reference == 0 {
            break;
        }
    }

    Ok(collected)
}

/// Observed CPU run state, as reported by a PLC-status USERDATA query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    /// CPU is executing the user program
    Run,
    /// CPU is halted
    Stop,
    /// Reported state did not map to a known value
    Unknown(u8),
}

impl From<u8> for CpuState {
    fn from(code: u8) -> Self {
        match code {
            0x08 => Self::Run,
            0x04 => Self::Stop,
            other => Self::Unknown(other),
        }
    }
}

pub(crate) async fn cpu_state(client: &mut S7Client) -> Result<CpuState, Error> {
    let data = read_szl(client, 0x0424, 0x0000).await?;
    // `data` starts with the echoed szl_id (u16) and szl_index (u16), followed
    // by the SZL 0x0424 record itself. The run/stop indicator sits at byte 2
    // of that record (mirrors the Cli_GetPlcStatus convention of indexing
    // SZL.Data[2]), i.e. overall offset 4 + 2.
    let status = data.get(6).copied().unwrap_or(0);
    Ok(CpuState::from(status))
}

fn plc_control_params(function_code: u8, selector: &[u8]) -> Vec<u8> {
    let mut params = vec![function_code, 0, 0, 0, 0, 0, 0xFD];
    params.push(selector.len() as u8);
    params.extend_from_slice(selector);
    params.push(PLC_CONTROL_PIECE.len() as u8);
    params.extend_from_slice(PLC_CONTROL_PIECE);
    params
}

async fn plc_control(client: &mut S7Client, function_code: u8, selector: &[u8]) -> Result<(), Error> {
    let params_body = plc_control_params(function_code, selector);

    let header = S7ProtocolHeader::build_request(&mut client.pdu_number, params_body.len(), 0)?;
    let mut bytes = BytesMut::new();
    bytes.put(BytesMut::from(header));
    bytes.put_slice(&params_body);

    let mut response =
        exchange_buffer(&mut client.connection, bytes, client.send_timeout, client.recv_timeout)
            .await?;

    let resp_header = S7ProtocolHeader::try_from(&mut response)?;
    resp_header
        .is_ack()?
        .is_current_pdu_response(client.pdu_number)?;

    if resp_header.has_error() {
        let (class, code) = resp_header.get_errors();
        return Err(Error::S7ProtocolError(S7ProtocolError::from_codes(class, code)));
    }

    Ok(())
}

pub(crate) async fn plc_stop(client: &mut S7Client) -> Result<(), Error> {
    plc_control(client, FN_PLC_STOP, &[]).await
}

pub(crate) async fn plc_hot_start(client: &mut S7Client) -> Result<(), Error> {
    plc_control(client, FN_PLC_START, &[]).await
}

pub(crate) async fn plc_cold_start(client: &mut S7Client) -> Result<(), Error> {
    plc_control(client, FN_PLC_START, b"C ").await
}
