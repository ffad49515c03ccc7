use std::fmt;

use crate::Error;

/// How a device reply should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[repr(u8)]
pub enum FormatOut {
    List = 0,
    Byte = 1,
    #[default]
    String = 2,
    /// Don't request a reply at all.
    NoResponse = 3,
}

impl FormatOut {
    pub(crate) fn expects_reply(&self) -> bool {
        !matches!(self, Self::NoResponse)
    }

    pub(crate) fn decode(&self, data: Vec<u8>) -> Result<Reply, Error> {
        Ok(match self {
            FormatOut::List => Reply::List(data),
            FormatOut::Byte => Reply::Byte(*data.first().ok_or(Error::EmptyResponse)?),
            FormatOut::String => Reply::String(String::from_utf8(data)?),
            FormatOut::NoResponse => Reply::None,
        })
    }
}

/// A decoded device reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    List(Vec<u8>),
    Byte(u8),
    String(String),
    None,
}

impl Reply {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::List(bytes) => write!(f, "{bytes:?}"),
            Reply::Byte(byte) => write!(f, "{byte}"),
            Reply::String(s) => f.write_str(s),
            Reply::None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(FormatOut::List as u8, 0);
        assert_eq!(FormatOut::Byte as u8, 1);
        assert_eq!(FormatOut::String as u8, 2);
        assert_eq!(FormatOut::NoResponse as u8, 3);
    }

    #[test]
    fn decode_string() {
        let reply = FormatOut::String.decode(b"moved".to_vec()).unwrap();
        assert_eq!(reply.as_str(), Some("moved"));
        assert_eq!(reply.to_string(), "moved");
    }

    #[test]
    fn decode_invalid_utf8() {
        let err = FormatOut::String.decode(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::Utf8(..)));
    }

    #[test]
    fn decode_byte_takes_first() {
        assert_eq!(FormatOut::Byte.decode(vec![7, 8]).unwrap(), Reply::Byte(7));
        assert!(matches!(
            FormatOut::Byte.decode(Vec::new()),
            Err(Error::EmptyResponse)
        ));
    }

    #[test]
    fn decode_list_keeps_bytes() {
        let reply = FormatOut::List.decode(vec![1, 2, 3]).unwrap();
        assert_eq!(reply, Reply::List(vec![1, 2, 3]));
        assert_eq!(reply.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn no_response_expects_nothing() {
        assert!(!FormatOut::NoResponse.expects_reply());
        assert!(FormatOut::String.expects_reply());
        assert_eq!(Reply::None.to_string(), "None");
    }
}
