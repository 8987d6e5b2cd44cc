use std::convert::TryFrom;

use bytes::{Buf, BufMut, BytesMut};

use crate::errors::Error;

use super::header::S7ProtocolHeader;

pub(crate) const NEGOTIATE_FUNCTION_CODE: u8 = 0xf0;

#[derive(Debug)]
pub(crate) struct S7Negotiation {
    s7_header: S7ProtocolHeader,
    params: NegotiatePDUParameters,
}

impl S7Negotiation {
    pub(crate) fn build(seq: &mut u16) -> Result<S7Negotiation, Error> {
        Ok(Self {
            s7_header: S7ProtocolHeader::build_request(seq, NegotiatePDUParameters::len(), 0)?,
            params: NegotiatePDUParameters::build(),
        })
    }
}

impl From<S7Negotiation> for BytesMut {
    fn from(data: S7Negotiation) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(20);
        bytes.put(BytesMut::from(data.s7_header));
        bytes.put(BytesMut::from(data.params));

        bytes
    }
}

/// Negotiated PDU parameters, exchanged once per connection to agree on the
/// maximum request/response size and the number of unacknowledged jobs the
/// caller and callee may each have outstanding.
#[derive(Debug)]
pub(crate) struct NegotiatePDUParameters {
    function_code: u8,
    reserved: u8,
    pub(crate) max_amq_caller: u16,
    pub(crate) max_amq_calle: u16,
    pub(crate) pdu_length: u16,
}

impl NegotiatePDUParameters {
    pub(crate) fn len() -> usize {
        8
    }

    pub(crate) fn build() -> Self {
        Self {
            function_code: NEGOTIATE_FUNCTION_CODE,
            reserved: 0,
            max_amq_caller: 0x0100,
            max_amq_calle: 0x0100,
            pdu_length: 480,
        }
    }
}

impl From<NegotiatePDUParameters> for BytesMut {
    fn from(params: NegotiatePDUParameters) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(8);
        bytes.put_u8(params.function_code);
        bytes.put_u8(params.reserved);
        bytes.put_u16(params.max_amq_caller);
        bytes.put_u16(params.max_amq_calle);
        bytes.put_u16(params.pdu_length);

        bytes
    }
}

impl TryFrom<&mut BytesMut> for NegotiatePDUParameters {
    type Error = Error;

    fn try_from(bytes: &mut BytesMut) -> Result<Self, Self::Error> {
        if bytes.len() >= Self::len() {
            Ok(Self {
                function_code: bytes.get_u8(),
                reserved: bytes.get_u8(),
                max_amq_caller: bytes.get_u16(),
                max_amq_calle: bytes.get_u16(),
                pdu_length: bytes.get_u16(),
            })
        } else {
            Err(Error::Connection(
                "Received short packet while negotiating connection".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negotiated_parameters_big_endian() {
        let mut bytes = BytesMut::from(&[0xF0, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0xE0][..]);
        let params = NegotiatePDUParameters::try_from(&mut bytes).unwrap();
        assert_eq!(params.max_amq_caller, 0x0100);
        assert_eq!(params.max_amq_calle, 0x0100);
        assert_eq!(params.pdu_length, 0x01E0);
    }
}
