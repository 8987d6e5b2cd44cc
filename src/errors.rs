//! Types for working with errors produced by s7client.

use std::fmt;
use std::io::{Error as IOError, ErrorKind};

use bb8::RunError;

/// Possible errors returned by `S7Client` or `S7Pool`
#[derive(Debug, PartialEq)]
pub enum Error {
    /// IO error during message exchange with PLC
    IO(ErrorKind),
    /// An error occurred while getting a connection from the pool
    Pool(String),
    /// Error on establishing connection to PLC
    Connection(String),
    /// Timeout during data exchange with PLC
    DataExchangeTimedOut,
    /// Creation of PLC conform message failed
    TryFrom(Vec<u8>, String),
    /// An ISO error occurred during message exchange with the PLC
    ISOResponse(IsoError),
    /// The requested bit is out of range (0 to 7)
    RequestedBitOutOfRange,
    /// PLC did not acknowledge the request
    RequestNotAcknowledged,
    /// PLC reported an error
    S7ProtocolError(S7ProtocolError),
    /// An error was thrown inside a S7 PLC response
    DataItemError(S7DataItemResponseError),
    /// Mismatch in response and request ID
    ResponseDoesNotBelongToCurrentPDU,
    /// Too many items in one request
    TooManyItemsInOneRequest,
    /// A data item in the request is too large
    DataItemTooLarge,
    /// Too much data supplied for one write request.
    TooMuchDataToWrite,
    /// The PLC acknowledged a write but its ack covered fewer items than requested
    PartialDataWritten,
    /// A response header did not carry the S7 protocol ID (0x32)
    InvalidProtocolId(u8),
    /// Too much data requested for one read request.
    ResponseDataWouldBeTooLarge {
        /// Requested data size
        req_size: usize,
        /// Maximum data size the PLC is able to handle in one go
        max_pdu: usize,
    },
    /// The textual operand address could not be parsed
    Address(AddressError),
    /// The DB layout specification could not be parsed
    Layout(LayoutError),
    /// A codec operation was attempted out of the bounds of its buffer
    Domain,
}

impl From<IOError> for Error {
    fn from(e: IOError) -> Self {
        Error::IO(e.kind())
    }
}

impl From<RunError<Error>> for Error {
    fn from(e: RunError<Error>) -> Self {
        Error::Pool(e.to_string())
    }
}

impl From<AddressError> for Error {
    fn from(e: AddressError) -> Self {
        Error::Address(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Error::IO(e) => format!("IO Error: {e}"),
                Error::Pool(e) => format!("Pool Error: {e}"),
                Error::Connection(e) => format!("Connection Error: {e}"),
                Error::DataExchangeTimedOut => "Timeout during data exchange".to_string(),
                Error::TryFrom(_, e) => e.to_string(),
                Error::ISOResponse(e) => format!("ISO Response Error: {e}"),
                Error::RequestedBitOutOfRange =>
                    "The requested bit is out of range [0..7]".to_string(),
                Error::RequestNotAcknowledged =>
                    "The PLC did not respond successfully".to_string(),
                Error::S7ProtocolError(e) => e.to_string(),
                Error::DataItemError(e) => e.to_string(),
                Error::ResponseDoesNotBelongToCurrentPDU =>
                    "Mismatch in response and request ID".to_string(),
                Error::TooManyItemsInOneRequest => "Too many items in one request".to_string(),
                Error::DataItemTooLarge => "The data item in the request is too large".to_string(),
                Error::TooMuchDataToWrite =>
                    "Too much data supplied for one write request".to_string(),
                Error::PartialDataWritten =>
                    "PLC acknowledged fewer items than were written".to_string(),
                Error::InvalidProtocolId(id) => format!("Invalid S7 protocol ID: {id:#04x}"),
                Error::ResponseDataWouldBeTooLarge { req_size, max_pdu } => format!(
                    "Too much data requested for one read request. Response size ({req_size}) is larger than the protocol limit ({max_pdu})"
                ),
                Error::Address(e) => format!("Address Error: {e}"),
                Error::Layout(e) => format!("Layout Error: {e}"),
                Error::Domain => "Value out of bounds of its buffer".to_string(),
            }
        )
    }
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::IO(_) | Error::Connection(_) | Error::DataExchangeTimedOut | Error::ISOResponse(_)
        )
    }
}

/// ISO error during data exchange with PLC
#[derive(Debug, PartialEq)]
pub enum IsoError {
    /// Bad format
    InvalidPDU,
    /// Bad Data size passed to send/recv : buffer is invalid
    InvalidDataSize,
    /// A short packet was received
    ShortPacket,
    /// Too many fragments without EOT were received on one reassembly
    TooManyFragments,
    /// The reassembled payload would exceed the maximum ISO payload size
    PduOverflow,
}

impl fmt::Display for IsoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Self::InvalidPDU => " ISO : Bad PDU format",
                Self::InvalidDataSize => " ISO : Data size passed to send/recv buffer is invalid",
                Self::ShortPacket => " ISO : A short packet received",
                Self::TooManyFragments => " ISO : Too many packets without EoT flag",
                Self::PduOverflow =>
                    " ISO : The sum of fragments data exceeded maximum packet size",
            }
        )
    }
}

/// S7 protocol error
#[derive(Debug, PartialEq)]
pub struct S7ProtocolError {
    /// Error class
    class: &'static str,
    /// Error code
    error: Option<u8>,
}

impl fmt::Display for S7ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut error = vec![format!("S7 Protocol error: {}", &self.class)];
        if let Some(error_code) = self.error {
            error.push(format!("error code: {error_code}"));
        }
        write!(f, "{}", error.join(" - "))
    }
}

impl S7ProtocolError {
    pub(crate) fn from_codes(class: Option<u8>, code: Option<u8>) -> Self {
        Self {
            class: match class {
                Some(class_code) => match class_code {
                    0x00 => "No error",
                    0x81 => "Application relationship error",
                    0x82 => "Object definition error",
                    0x83 => "No resources available error",
                    0x84 => "Error on service processing",
                    0x85 => "Error on supplies",
                    0x87 => "Access error",
                    _ => "Unknown error class",
                },
                None => "No error class given",
            },
            error: code,
        }
    }
}

/// Errors from a data item included inside a S7 PLC response
#[derive(Debug, PartialEq)]
pub enum S7DataItemResponseError {
    /// Reserved
    Reserved,
    /// Hardware fault
    HardwareFault,
    /// Accessing the object is not allowed
    AccessNotAllowed,
    /// Address out of range
    AddressOutOfRange,
    /// Data type is not supported
    DataTypeNotSupported,
    /// Inconsistencies in the data type occurred
    DataTypeInconsistent,
    /// Requested object does not exist
    ObjectDoesNotExist,
    /// Unknown error
    Unknown,
}

impl fmt::Display for S7DataItemResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Reserved => "Reserved",
            Self::HardwareFault => "Hardware fault",
            Self::AccessNotAllowed => "Accessing the object not allowed",
            Self::AddressOutOfRange => "Address out of range",
            Self::DataTypeNotSupported => "Data type not supported",
            Self::DataTypeInconsistent => "Data type inconsistent",
            Self::ObjectDoesNotExist => "Object does not exist",
            Self::Unknown => "Unknown error",
        };
        write!(f, "S7 Data Item response error: {msg}")
    }
}

impl From<u8> for S7DataItemResponseError {
    fn from(code: u8) -> Self {
        match code {
            0x00 => Self::Reserved,
            0x01 => Self::HardwareFault,
            0x03 => Self::AccessNotAllowed,
            0x05 => Self::AddressOutOfRange,
            0x06 => Self::DataTypeNotSupported,
            0x07 => Self::DataTypeInconsistent,
            0x0a => Self::ObjectDoesNotExist,
            _ => Self::Unknown,
        }
    }
}

/// Error parsing a textual operand address (e.g. `DB1.DBX10.5`)
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AddressError {
    /// The address string was empty or only whitespace
    Empty,
    /// The area letter/prefix was not recognized
    UnknownArea(String),
    /// A numeric token could not be parsed
    InvalidNumber(String),
    /// A bit index was outside 0..7
    InvalidBitIndex(u8),
    /// The address did not match any known grammar production
    Malformed(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "address string is empty"),
            Self::UnknownArea(s) => write!(f, "unknown area in address '{s}'"),
            Self::InvalidNumber(s) => write!(f, "invalid numeric token '{s}'"),
            Self::InvalidBitIndex(b) => write!(f, "bit index {b} is out of range [0..7]"),
            Self::Malformed(s) => write!(f, "could not parse address '{s}'"),
        }
    }
}

/// Error parsing a DB-row layout specification
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LayoutError {
    /// A data line did not tokenize into exactly three whitespace-separated tokens
    BadLine(usize),
    /// A BOOL field was declared without a dotted bit index
    MissingBitIndex(usize),
    /// The declared type was not one of BOOL/INT/WORD/DWORD/REAL/STRING\[N\]
    UnknownType(usize, String),
    /// The field name was referenced but never declared in the layout
    UnknownField(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLine(line) => write!(f, "layout line {line} is not `index name TYPE`"),
            Self::MissingBitIndex(line) => {
                write!(f, "layout line {line}: BOOL field needs a `byte.bit` index")
            }
            Self::UnknownType(line, t) => write!(f, "layout line {line}: unknown type '{t}'"),
            Self::UnknownField(name) => write!(f, "field '{name}' is not part of the layout"),
        }
    }
}
