use std::borrow::Cow;
use std::convert::TryFrom;

use bytes::{Buf, BufMut, BytesMut};

use super::header::S7ProtocolHeader;
use super::segments::{data_item::DataItem, parameters::ReadWriteParams, request_item::RequestItem};
use super::types::{Area, DataItemTransportSize, S7DataTypes, WRITE_OPERATION};
use crate::client::create::S7Client;
use crate::connection::tcp::exchange_buffer;
use crate::errors::{Error, S7DataItemResponseError, S7ProtocolError};

impl ReadWriteParams {
    fn build_write(items: Vec<RequestItem>) -> Self {
        Self {
            function_code: WRITE_OPERATION,
            item_count: items.len() as u8,
            request_item: Some(items),
        }
    }
}

impl<'a> DataItem<'a> {
    fn build_write(data_type: DataItemTransportSize, data: Cow<'a, [u8]>) -> Result<Self, Error> {
        let transport_size = data_type.len();
        Ok(Self {
            error_code: 0,
            var_type: data_type as u8,
            count: u16::try_from(data.len()).map_err(|_| Error::DataItemTooLarge)? * transport_size,
            data,
        })
    }
}

fn assert_pdu_size_for_write(data_len: usize, max_pdu_size: usize) -> Result<(), Error> {
    if data_len + 16 > max_pdu_size {
        return Err(Error::TooMuchDataToWrite);
    }
    Ok(())
}

/// Writes a single addressed element in one request. Callers are expected to
/// keep `data.len()` within the negotiated PDU size; see [`assert_pdu_size_for_write`].
pub(crate) async fn write_area(
    client: &mut S7Client,
    area: Area,
    db_number: u16,
    start: u32,
    data_type: S7DataTypes,
    data: &[u8],
) -> Result<(), Error> {
    assert_pdu_size_for_write(data.len(), client.pdu_length.into())?;

    let request_item = RequestItem::build(area, db_number, start, data_type, data.len())?;
    let request_params = BytesMut::from(ReadWriteParams::build_write(vec![request_item]));
    let data_item: BytesMut =
        DataItem::build_write(data_type.into(), Cow::Borrowed(data))?.into();

    let mut bytes = BytesMut::new();
    let req_header = S7ProtocolHeader::build_request(
        &mut client.pdu_number,
        request_params.len(),
        data_item.len(),
    )?;
    bytes.put(BytesMut::from(req_header));
    bytes.put(request_params);
    bytes.put(data_item);

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

    let read_params = ReadWriteParams::from(&mut response);
    read_params.expect_function(WRITE_OPERATION)?;
    if read_params.item_count != 1 || response.is_empty() {
        return Err(Error::PartialDataWritten);
    }

    let error_code = response.get_u8();
    if error_code == 255 {
        Ok(())
    } else {
        Err(Error::DataItemError(S7DataItemResponseError::from(error_code)))
    }
}
