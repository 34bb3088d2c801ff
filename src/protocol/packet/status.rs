use crate::protocol::buffer::Buffer;
use crate::protocol::packet::{DecodeError, Direction, EncodeError, Packet, ProtocolState};

/// Empty-body request for the server list status document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequest;

impl Packet for StatusRequest {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Status;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, _dst: &mut Buffer) -> Result<(), EncodeError> {
        Ok(())
    }

    fn decode_body(_src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}

/// Latency probe; the server echoes the payload back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRequest {
    pub payload: i64,
}

impl Packet for PingRequest {
    const ID: i32 = 0x01;
    const STATE: ProtocolState = ProtocolState::Status;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_i64(self.payload);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            payload: src.read_i64()?,
        })
    }
}

/// JSON status document (MOTD, player counts, favicon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub json_response: String,
}

impl Packet for StatusResponse {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Status;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_utf(&self.json_response)
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            json_response: src.read_utf()?,
        })
    }
}

/// Echo of a [`PingRequest`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingResponse {
    pub payload: i64,
}

impl Packet for PingResponse {
    const ID: i32 = 0x01;
    const STATE: ProtocolState = ProtocolState::Status;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_i64(self.payload);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            payload: src.read_i64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_request_has_empty_body() {
        let mut buf = Buffer::new();
        StatusRequest.encode_body(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(StatusRequest::decode_body(&mut buf).unwrap(), StatusRequest);
    }

    #[test]
    fn ping_pong_roundtrip() {
        let mut buf = Buffer::new();
        PingRequest { payload: i64::MIN }
            .encode_body(&mut buf)
            .unwrap();
        assert_eq!(
            PingRequest::decode_body(&mut buf).unwrap().payload,
            i64::MIN
        );

        let mut buf = Buffer::new();
        PingResponse { payload: 123_456 }
            .encode_body(&mut buf)
            .unwrap();
        assert_eq!(
            PingResponse::decode_body(&mut buf).unwrap().payload,
            123_456
        );
    }

    #[test]
    fn status_response_roundtrip() {
        let packet = StatusResponse {
            json_response: r#"{"version":{"name":"1.19.4","protocol":762}}"#.to_owned(),
        };
        let mut buf = Buffer::new();
        packet.encode_body(&mut buf).unwrap();
        assert_eq!(StatusResponse::decode_body(&mut buf).unwrap(), packet);
    }
}
