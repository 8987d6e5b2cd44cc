use bytes::{BufMut, BytesMut};

use crate::{
    errors::Error,
    s7_protocol::types::{Area, S7DataTypes, SPEC_TYPE_READ_WRITE, SYNTAX_ID_ANY_TYPE},
};

/// S7-ANY variable specification item, as embedded in READ/WRITE AREA requests.
#[derive(Debug, Copy, Clone)]
pub(in crate::s7_protocol) struct RequestItem {
    pub(crate) specification_type: u8,
    pub(crate) item_length: u8,
    pub(crate) syntax_id: u8,
    pub(crate) var_type: u8,
    pub(crate) data_length: u16,
    pub(crate) db_number: u16,
    pub(crate) area: u8,
    /// Bit offset of the addressed element, encoded on the wire as 3 bytes.
    pub(crate) address: u32,
}

impl RequestItem {
    pub(in crate::s7_protocol) fn len() -> usize {
        12
    }

    pub(in crate::s7_protocol) fn build(
        area: Area,
        db_number: u16,
        start: u32,
        data_type: S7DataTypes,
        length: usize,
    ) -> Result<Self, Error> {
        Ok(Self {
            specification_type: SPEC_TYPE_READ_WRITE,
            item_length: 10,
            syntax_id: SYNTAX_ID_ANY_TYPE,
            var_type: data_type as u8,
            data_length: u16::try_from(length).map_err(|_| Error::TooManyItemsInOneRequest)?,
            area: area as u8,
            db_number,
            address: match data_type {
                S7DataTypes::S7BIT | S7DataTypes::S7COUNTER | S7DataTypes::S7TIMER => start,
                _ => start * 8,
            },
        })
    }

    pub(in crate::s7_protocol) fn address_to_bytes(&self) -> BytesMut {
        let mut address = self.address;
        let address_byte3 = (address & 0x0FF) as u8;
        address >>= 8;
        let address_byte2 = (address & 0x0FF) as u8;
        address >>= 8;
        let address_byte1 = (address & 0x0FF) as u8;

        let mut bytes = BytesMut::with_capacity(3);
        bytes.extend_from_slice(&[address_byte1, address_byte2, address_byte3]);
        bytes
    }
}

impl From<RequestItem> for BytesMut {
    fn from(req_item: RequestItem) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(12);
        bytes.put_u8(req_item.specification_type);
        bytes.put_u8(req_item.item_length);
        bytes.put_u8(req_item.syntax_id);
        bytes.put_u8(req_item.var_type);
        bytes.put_u16(req_item.data_length);
        bytes.put_u16(req_item.db_number);
        bytes.put_u8(req_item.area);
        bytes.put(req_item.address_to_bytes());

        bytes
    }
}
