use concordium_cis2::Cis2Error;
use concordium_std::{
    num, CallContractError, LogError, ParseError, Reject, SchemaType, Serialize, UnwrapAbort,
};
use core::num::TryFromIntError;

pub type ContractResult<A> = Result<A, ContractError>;

pub type ContractError = Cis2Error<CustomContractError>;

/// The different errors the sale contracts can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    #[from(ParseError)]
    ParseParams, //1
    OverflowError,       //
    InvokeContractError, //
    AmountTooLarge,      //
    MissingAccount,      //5
    MissingContract,     //
    MissingEntrypoint,   //
    MessageFailed,       //
    Trap,                //
    TransferError,       //10
    ContractPaused,      //
    AccountOnly,         //
    LogFull,             //
    LogMalformed,        //
    InvalidSchedule,     //15
    InvalidAmount,       //
    LengthMismatch,      //
    AlreadyRegistered,   //
    NotWhitelisted,      //
    SaleNotActive,       //20
    AmountOutOfRange,    //
    AlreadyPurchased,    //
    NoClaimableAmount,   //
}

impl From<CustomContractError> for ContractError {
    fn from(c: CustomContractError) -> Self {
        Cis2Error::Custom(c)
    }
}

impl<T> From<CallContractError<T>> for CustomContractError {
    fn from(cce: CallContractError<T>) -> Self {
        match cce {
            CallContractError::AmountTooLarge => Self::AmountTooLarge,
            CallContractError::MissingAccount => Self::MissingAccount,
            CallContractError::MissingContract => Self::MissingContract,
            CallContractError::MissingEntrypoint => Self::MissingEntrypoint,
            CallContractError::MessageFailed => Self::MessageFailed,
            CallContractError::Trap => Self::Trap,
            CallContractError::LogicReject {
                reason: _,
                return_value: _,
            } => Self::InvokeContractError,
        }
    }
}

impl From<LogError> for CustomContractError {
    #[inline(always)]
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

impl From<TryFromIntError> for CustomContractError {
    #[inline(always)]
    fn from(_: TryFromIntError) -> Self {
        Self::OverflowError
    }
}
