use crate::error::event::EventSystemResult;
use omniqueue::Delivery;

/// MessageParser - Trait to parse a raw queue delivery into its typed message
pub trait MessageParser: Send + Sync {
    fn parse_message(message: &Delivery) -> EventSystemResult<Box<Self>>;
}
