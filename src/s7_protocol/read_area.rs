use std::convert::TryFrom;

use bytes::{BufMut, BytesMut};

use super::header::S7ProtocolHeader;
use super::segments::{data_item::DataItem, parameters::ReadWriteParams, request_item::RequestItem};
use super::types::{Area, S7DataTypes, READ_OPERATION};
use crate::client::create::S7Client;
use crate::connection::tcp::exchange_buffer;
use crate::errors::{Error, S7ProtocolError};

impl ReadWriteParams {
    pub(super) fn build_read(items: Vec<RequestItem>) -> Self {
        Self {
            function_code: READ_OPERATION,
            item_count: items.len() as u8,
            request_item: Some(items),
        }
    }
}

fn max_data_size_per_fragment(client: &S7Client) -> usize {
    usize::from(client.pdu_length)
        .saturating_sub(S7ProtocolHeader::len_response())
        .saturating_sub(ReadWriteParams::len())
        .saturating_sub(DataItem::header_len())
}

/// Reads a single addressed element, splitting the request across multiple
/// PDUs if the requested length would not fit the negotiated PDU size.
pub(crate) async fn read_area(
    client: &mut S7Client,
    area: Area,
    db_number: u16,
    start: u32,
    length: u32,
    data_type: S7DataTypes,
) -> Result<Vec<u8>, Error> {
    let max_fragment = max_data_size_per_fragment(client);

    let fragments: Vec<(u32, u32)> = if max_fragment == 0 || (length as usize) <= max_fragment {
        vec![(start, length)]
    } else {
        let mut fragments = Vec::new();
        let mut remaining = length;
        let mut offset = start;
        while remaining > 0 {
            let chunk = remaining.min(max_fragment as u32);
            fragments.push((offset, chunk));
            offset += chunk;
            remaining -= chunk;
        }
        fragments
    };

    let mut collected = BytesMut::new();

    for (fragment_start, fragment_len) in fragments {
        let request_item = RequestItem::build(
            area,
            db_number,
            fragment_start,
            data_type,
            fragment_len as usize,
        )?;
        let request_params = BytesMut::from(ReadWriteParams::build_read(vec![request_item]));

        let mut bytes = BytesMut::new();
        let req_header =
            S7ProtocolHeader::build_request(&mut client.pdu_number, request_params.len(), 0)?;
        bytes.put(BytesMut::from(req_header));
        bytes.put(request_params);

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

        let read_params = ReadWriteParams::from(&mut response);
        read_params.expect_function(READ_OPERATION)?;
        let data_item = DataItem::parse(&mut response, max_fragment)?;
        collected.put(data_item.data.as_ref());
    }

    Ok(collected.to_vec())
}
