use std::convert::TryFrom;

use bytes::{Buf, BufMut, BytesMut};

use crate::errors::Error;

const PROTOCOL_ID: u8 = 0x32;

const ROSCTR_JOB: u8 = 0x01;
const ROSCTR_ACK: u8 = 0x02;
const ROSCTR_ACK_DATA: u8 = 0x03;
pub(crate) const ROSCTR_USERDATA: u8 = 0x07;

/// Advances a PDU reference counter, skipping zero since the PLC treats a
/// reference of 0 as "no reference" in some firmware versions.
pub(crate) fn next_seq(current: &mut u16) -> u16 {
    *current = match *current {
        0xFFFF => 1,
        n => n + 1,
    };
    *current
}

/// S7 message header, covering both the 10-byte request/ack form and the
/// 12-byte ack-data form that carries an error class/code pair.
#[derive(Debug)]
pub(crate) struct S7ProtocolHeader {
    protocol_id: u8,
    rosctr: u8,
    reserved: u16,
    pdu_reference: u16,
    param_length: u16,
    data_length: u16,
    error_class: Option<u8>,
    error_code: Option<u8>,
}

impl S7ProtocolHeader {
    pub(crate) fn len_request() -> usize {
        10
    }

    pub(crate) fn len_response() -> usize {
        12
    }

    pub(crate) fn build_request(
        seq: &mut u16,
        param_length: usize,
        data_length: usize,
    ) -> Result<Self, Error> {
        Ok(Self {
            protocol_id: PROTOCOL_ID,
            rosctr: ROSCTR_JOB,
            reserved: 0,
            pdu_reference: next_seq(seq),
            param_length: u16::try_from(param_length).map_err(|_| Error::DataItemTooLarge)?,
            data_length: u16::try_from(data_length).map_err(|_| Error::DataItemTooLarge)?,
            error_class: None,
            error_code: None,
        })
    }

    pub(crate) fn build_userdata_request(
        seq: &mut u16,
        param_length: usize,
        data_length: usize,
    ) -> Result<Self, Error> {
        Ok(Self {
            protocol_id: PROTOCOL_ID,
            rosctr: ROSCTR_USERDATA,
            reserved: 0,
            pdu_reference: next_seq(seq),
            param_length: u16::try_from(param_length).map_err(|_| Error::DataItemTooLarge)?,
            data_length: u16::try_from(data_length).map_err(|_| Error::DataItemTooLarge)?,
            error_class: None,
            error_code: None,
        })
    }

    pub(crate) fn is_ack(&self) -> Result<&Self, Error> {
        if self.rosctr == ROSCTR_ACK || self.rosctr == ROSCTR_ACK_DATA {
            Ok(self)
        } else {
            Err(Error::RequestNotAcknowledged)
        }
    }

    pub(crate) fn is_ack_with_data(&self) -> Result<&Self, Error> {
        if self.rosctr == ROSCTR_ACK_DATA || self.rosctr == ROSCTR_USERDATA {
            Ok(self)
        } else {
            Err(Error::RequestNotAcknowledged)
        }
    }

    pub(crate) fn is_current_pdu_response(&self, expected: u16) -> Result<&Self, Error> {
        if self.pdu_reference == expected {
            Ok(self)
        } else {
            Err(Error::ResponseDoesNotBelongToCurrentPDU)
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        !matches!(self.error_class, None | Some(0x00))
    }

    pub(crate) fn get_errors(&self) -> (Option<u8>, Option<u8>) {
        (self.error_class, self.error_code)
    }

    pub(crate) fn pdu_reference(&self) -> u16 {
        self.pdu_reference
    }
}

impl TryFrom<&mut BytesMut> for S7ProtocolHeader {
    type Error = Error;

    fn try_from(bytes: &mut BytesMut) -> Result<Self, Self::Error> {
        if bytes.len() < Self::len_request() {
            return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
        }

        let protocol_id = bytes.get_u8();
        if protocol_id != PROTOCOL_ID {
            return Err(Error::InvalidProtocolId(protocol_id));
        }
        let rosctr = bytes.get_u8();
        let reserved = bytes.get_u16();
        let pdu_reference = bytes.get_u16();
        let param_length = bytes.get_u16();
        let data_length = bytes.get_u16();

        let (error_class, error_code) = if rosctr == ROSCTR_ACK_DATA {
            if bytes.len() < 2 {
                return Err(Error::ISOResponse(crate::errors::IsoError::ShortPacket));
            }
            (Some(bytes.get_u8()), Some(bytes.get_u8()))
        } else {
            (None, None)
        };

        Ok(Self {
            protocol_id,
            rosctr,
            reserved,
            pdu_reference,
            param_length,
            data_length,
            error_class,
            error_code,
        })
    }
}

impl From<S7ProtocolHeader> for BytesMut {
    fn from(header: S7ProtocolHeader) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(S7ProtocolHeader::len_request());
        bytes.put_u8(header.protocol_id);
        bytes.put_u8(header.rosctr);
        bytes.put_u16(header.reserved);
        bytes.put_u16(header.pdu_reference);
        bytes.put_u16(header.param_length);
        bytes.put_u16(header.data_length);
        if let (Some(class), Some(code)) = (header.error_class, header.error_code) {
            bytes.put_u8(class);
            bytes.put_u8(code);
        }
        bytes
    }
}
