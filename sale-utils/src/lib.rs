use concordium_std::{
    collections::BTreeMap, fmt::Debug, schema, AccountAddress, SchemaType, Serial, Write,
};

pub mod error;
pub mod schedule;
pub mod types;

use types::ContractTokenAmount;

/// Tag for the Purchased event.
pub const PURCHASED_EVENT_TAG: u8 = 1u8;
/// Tag for the Claimed event.
pub const CLAIMED_EVENT_TAG: u8 = 2u8;

/// A PurchasedEvent is logged whenever an allocation is recorded,
/// whether registered by the admin or bought during the sale window.
#[derive(Debug, Serial, SchemaType)]
pub struct PurchasedEvent {
    pub purchaser: AccountAddress,
    pub amount: ContractTokenAmount,
}

/// A ClaimedEvent carries the exact amount handed to the token
/// contract, so callers can assert payouts without re-deriving the
/// schedule.
#[derive(Debug, Serial, SchemaType)]
pub struct ClaimedEvent {
    pub purchaser: AccountAddress,
    pub amount: ContractTokenAmount,
}

/// Tagged events to be serialized for the event log.
#[derive(Debug)]
pub enum SaleEvent {
    Purchased(PurchasedEvent),
    Claimed(ClaimedEvent),
}

impl Serial for SaleEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            SaleEvent::Purchased(event) => {
                out.write_u8(PURCHASED_EVENT_TAG)?;
                event.serial(out)
            }
            SaleEvent::Claimed(event) => {
                out.write_u8(CLAIMED_EVENT_TAG)?;
                event.serial(out)
            }
        }
    }
}

impl schema::SchemaType for SaleEvent {
    fn get_type() -> schema::Type {
        let mut event_map = BTreeMap::new();
        event_map.insert(
            PURCHASED_EVENT_TAG,
            (
                "Purchased".to_string(),
                schema::Fields::Named(vec![
                    (String::from("purchaser"), AccountAddress::get_type()),
                    (String::from("amount"), ContractTokenAmount::get_type()),
                ]),
            ),
        );
        event_map.insert(
            CLAIMED_EVENT_TAG,
            (
                "Claimed".to_string(),
                schema::Fields::Named(vec![
                    (String::from("purchaser"), AccountAddress::get_type()),
                    (String::from("amount"), ContractTokenAmount::get_type()),
                ]),
            ),
        );
        schema::Type::TaggedEnum(event_map)
    }
}
